//! Server-side HTML views

use minijinja::{context, path_loader, Environment};
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::domain::Product;

const INDEX_TEMPLATE: &str = "index.html";
const INDEX_HTML: &str = include_str!("../../templates/index.html");

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
}

/// Renders the product listing page
pub struct ViewRenderer {
    env: Environment<'static>,
}

impl ViewRenderer {
    /// Use templates from `dir` when it provides the listing page, the built-in one otherwise
    pub fn new(dir: &Path) -> Result<Self, ViewError> {
        if dir.join(INDEX_TEMPLATE).is_file() {
            let mut env = Environment::new();
            env.set_loader(path_loader(dir));
            info!("Loading views from {}", dir.display());
            return Ok(Self { env });
        }
        Self::embedded()
    }

    /// Renderer using only the compiled-in templates
    pub fn embedded() -> Result<Self, ViewError> {
        let mut env = Environment::new();
        env.add_template(INDEX_TEMPLATE, INDEX_HTML)?;
        Ok(Self { env })
    }

    pub fn render_index(&self, products: &[Product]) -> Result<String, ViewError> {
        let template = self.env.get_template(INDEX_TEMPLATE)?;
        Ok(template.render(context! {
            products => products,
            count => products.len(),
        })?)
    }
}
