//! Email templates rendered with minijinja.
//!
//! Templates are compiled into the binary from `templates/email/` and share
//! `base.html.jinja` for layout.

use std::sync::OnceLock;

use minijinja::{Environment, Value};
use thiserror::Error;

static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

const TEMPLATES: &[(&str, &str)] = &[
    (
        "base.html.jinja",
        include_str!("../../../../templates/email/base.html.jinja"),
    ),
    (
        "report_submitted.html.jinja",
        include_str!("../../../../templates/email/report_submitted.html.jinja"),
    ),
    (
        "critical_report.html.jinja",
        include_str!("../../../../templates/email/critical_report.html.jinja"),
    ),
    (
        "status_updated.html.jinja",
        include_str!("../../../../templates/email/status_updated.html.jinja"),
    ),
    (
        "sla_breach.html.jinja",
        include_str!("../../../../templates/email/sla_breach.html.jinja"),
    ),
];

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();
    for (name, source) in TEMPLATES {
        if let Err(e) = env.add_template(name, source) {
            tracing::warn!("Failed to load email template {}: {}", name, e);
        }
    }
    env
}

fn get_environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(init_environment)
}

/// Render the named template with `ctx`
pub fn render(template_name: &str, ctx: Value) -> Result<String, TemplateError> {
    let template = get_environment()
        .get_template(template_name)
        .map_err(|_| TemplateError::NotFound(template_name.to_string()))?;

    template
        .render(ctx)
        .map_err(|e| TemplateError::RenderError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn test_all_templates_load() {
        for (name, _) in TEMPLATES {
            assert!(get_environment().get_template(name).is_ok(), "{}", name);
        }
    }

    #[test]
    fn test_unknown_template() {
        let result = render("nope.html.jinja", context! {});
        assert!(matches!(result, Err(TemplateError::NotFound(_))));
    }

    #[test]
    fn test_inheritance_renders_layout() {
        let html = render(
            "status_updated.html.jinja",
            context! {
                ticket_number => "CE000007",
                reporter_name => "Asha",
                title => "Pothole on 5th Cross",
                previous_status => "submitted",
                status => "in-progress",
                note => "Crew dispatched",
            },
        )
        .unwrap();

        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("Report CE000007 update"));
        assert!(html.contains("Crew dispatched"));
        assert!(!html.contains("Resolution:"));
    }
}
