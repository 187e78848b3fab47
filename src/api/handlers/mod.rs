//! HTTP request handlers for all endpoints.
//!
//! This module contains Axum route handlers organized by surface:
//!
//! - [`categories`]: category table listing
//! - [`assets`]: image listing, upload, replace and delete (JSON API)
//! - [`forms`]: form endpoints the management pages post to
//! - [`media`]: stored image byte serving
//! - [`pages`]: server-rendered management UI
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Error`] which converts to the
//! appropriate HTTP status code and a user-safe message.

pub mod assets;
pub mod categories;
pub mod forms;
pub mod media;
pub mod pages;
