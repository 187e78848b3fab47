//! API layer for HTTP request handling and data models.
//!
//! This module contains the HTTP surface, organized into:
//!
//! - **[`handlers`]**: Axum route handlers for all endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Categories** (`/api/categories`): the configured category table
//! - **Images** (`/api/images/*`): listing, upload, replace and delete
//! - **Media** (`/img/{category}/{filename}`): stored image bytes
//! - **Pages** (`/add-images`, `/category`): the management UI
//! - **Forms** (`/upload`, `/modify`, `/delete`): endpoints the UI posts to
//!
//! # OpenAPI Documentation
//!
//! The JSON API endpoints are documented with OpenAPI annotations using
//! `utoipa`. Documentation is served at `/docs` when the server is running.

pub mod handlers;
pub mod models;
