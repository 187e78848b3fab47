//! Server-rendered management UI.

use std::sync::OnceLock;

use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
};
use minijinja::{Environment, context};
use serde::Deserialize;

use crate::AppState;
use crate::errors::{Error, Result};

fn templates() -> &'static Environment<'static> {
    static ENV: OnceLock<Environment<'static>> = OnceLock::new();
    ENV.get_or_init(|| {
        let mut env = Environment::new();
        env.add_template("categories.html", include_str!("../templates/categories.html"))
            .expect("categories template is valid");
        env.add_template("gallery.html", include_str!("../templates/gallery.html"))
            .expect("gallery template is valid");
        env
    })
}

fn render(name: &str, ctx: minijinja::Value) -> Result<Html<String>> {
    let template = templates()
        .get_template(name)
        .map_err(|e| Error::Other(anyhow::Error::new(e)))?;
    let html = template
        .render(ctx)
        .map_err(|e| Error::Other(anyhow::Error::new(e)))?;
    Ok(Html(html))
}

pub async fn home() -> Redirect {
    Redirect::to("/add-images")
}

/// Category overview page with links into each gallery.
#[tracing::instrument(skip_all)]
pub async fn categories_page(State(state): State<AppState>) -> Result<Html<String>> {
    let categories: Vec<&str> = state.service.registry().names().collect();
    render("categories.html", context! { categories })
}

#[derive(Debug, Deserialize)]
pub struct CategoryPageQuery {
    pub category: String,
}

/// Gallery page for one category. Images are fetched client-side from the
/// listing API, so the page itself renders even for an empty category.
#[tracing::instrument(skip_all, fields(category = %query.category))]
pub async fn category_page(
    State(state): State<AppState>,
    Query(query): Query<CategoryPageQuery>,
) -> Result<Html<String>> {
    if !state.service.registry().exists(&query.category) {
        return Err(Error::UnknownCategory {
            category: query.category,
        });
    }
    render("gallery.html", context! { category => query.category })
}
