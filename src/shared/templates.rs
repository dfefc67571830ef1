//! Email templates rendered with Jinja2 syntax.
//!
//! Templates are embedded at compile time and registered under names ending
//! in `.html`, which turns on HTML auto-escaping for every interpolated value.

use minijinja::{Environment, Value};
use std::sync::OnceLock;
use thiserror::Error;

/// Template for the "new file available" notification
pub const FILE_ACCESS_NOTIFICATION: &str = "file_access_notification.html";

/// Template for the admin mail delivery check
pub const TEST_EMAIL: &str = "test_email.html";

static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

/// Errors that can occur during template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();
    let templates = [
        (
            FILE_ACCESS_NOTIFICATION,
            include_str!("../../templates/email/file_access_notification.html"),
        ),
        (
            TEST_EMAIL,
            include_str!("../../templates/email/test_email.html"),
        ),
    ];
    for (name, source) in templates {
        if let Err(e) = env.add_template(name, source) {
            tracing::warn!("Failed to load template {}: {}", name, e);
        }
    }
    env
}

fn get_environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(init_environment)
}

/// Render a registered template with the given context.
///
/// # Example
/// ```ignore
/// let html = render_template(FILE_ACCESS_NOTIFICATION, minijinja::context! { title => "March" })?;
/// ```
pub fn render_template(template_name: &str, ctx: Value) -> Result<String, TemplateError> {
    let template = get_environment()
        .get_template(template_name)
        .map_err(|_| TemplateError::NotFound(template_name.to_string()))?;

    template
        .render(ctx)
        .map_err(|e| TemplateError::RenderError(e.to_string()))
}
