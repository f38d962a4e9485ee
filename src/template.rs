//! Template interpolation for YAML configs
//!
//! Handles `{{ env.NAME }}` and `{{ vars.name }}` placeholders in handler
//! configurations. Nested access such as `{{ vars.intercom.token }}` is
//! supported for variables.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

/// Regex for matching template variables: {{ root.path }}
static TEMPLATE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_]*)*)\s*\}\}").unwrap()
});

/// Values available to templates
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    /// Environment variables, as an object of strings
    pub env: Value,
    /// User supplied variables
    pub vars: Value,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context holding a snapshot of the process environment
    pub fn from_env() -> Self {
        let env: Map<String, Value> = std::env::vars()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        Self {
            env: Value::Object(env),
            vars: Value::Null,
        }
    }

    #[must_use]
    pub fn with_env(mut self, env: Value) -> Self {
        self.env = env;
        self
    }

    #[must_use]
    pub fn with_vars(mut self, vars: Value) -> Self {
        self.vars = vars;
        self
    }

    /// Look up `env.NAME` or `vars.a.b`; a bare name is looked up in vars
    pub fn get(&self, path: &str) -> Option<&Value> {
        let parts: Vec<&str> = path.split('.').collect();
        match parts.as_slice() {
            ["env", rest @ ..] if !rest.is_empty() => get_nested_value(&self.env, rest),
            ["vars", rest @ ..] if !rest.is_empty() => get_nested_value(&self.vars, rest),
            _ => get_nested_value(&self.vars, &parts),
        }
    }
}

fn get_nested_value<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |current, part| current.as_object()?.get(*part))
}

/// Render a template string; every placeholder must resolve
pub fn render(template: &str, ctx: &TemplateContext) -> Result<String> {
    let mut missing = Vec::new();

    let rendered = TEMPLATE_REGEX.replace_all(template, |cap: &regex::Captures<'_>| {
        let var_path = &cap[1];
        match ctx.get(var_path) {
            Some(value) => value_to_string(value),
            None => {
                missing.push(var_path.to_string());
                String::new()
            }
        }
    });

    if missing.is_empty() {
        Ok(rendered.into_owned())
    } else {
        Err(Error::undefined_var(missing.join(", ")))
    }
}

/// Check if a string contains template variables
pub fn has_templates(s: &str) -> bool {
    TEMPLATE_REGEX.is_match(s)
}

/// Extract all variable names from a template
pub fn extract_variables(template: &str) -> Vec<String> {
    TEMPLATE_REGEX
        .captures_iter(template)
        .map(|cap| cap[1].to_string())
        .collect()
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Render every string inside a JSON value
pub fn render_value(value: &Value, ctx: &TemplateContext) -> Result<Value> {
    match value {
        Value::String(s) if has_templates(s) => Ok(Value::String(render(s, ctx)?)),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| Ok((k.clone(), render_value(v, ctx)?)))
            .collect::<Result<Map<_, _>>>()
            .map(Value::Object),
        Value::Array(items) => items
            .iter()
            .map(|v| render_value(v, ctx))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        _ => Ok(value.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> TemplateContext {
        TemplateContext::new()
            .with_env(json!({"COHERE_API_KEY": "secret"}))
            .with_vars(json!({"intercom": {"token": "tok", "version": 2.11}, "region": "eu"}))
    }

    #[test]
    fn test_render_env_and_vars() {
        let ctx = ctx();
        assert_eq!(render("{{ env.COHERE_API_KEY }}", &ctx).unwrap(), "secret");
        assert_eq!(
            render("Bearer {{vars.intercom.token}}", &ctx).unwrap(),
            "Bearer tok"
        );
        assert_eq!(render("{{ region }}-{{ vars.intercom.version }}", &ctx).unwrap(), "eu-2.11");
        assert_eq!(render("no placeholders", &ctx).unwrap(), "no placeholders");
    }

    #[test]
    fn test_render_undefined_variable() {
        let err = render("{{ env.MISSING }} {{ vars.nope }}", &ctx()).unwrap_err();
        match err {
            Error::UndefinedVariable { variable } => assert_eq!(variable, "env.MISSING, vars.nope"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_render_value_nested() {
        let value = json!({
            "handlers": [{"name": "cohere", "api_key": "{{ env.COHERE_API_KEY }}", "port": 5432}]
        });
        assert_eq!(
            render_value(&value, &ctx()).unwrap(),
            json!({"handlers": [{"name": "cohere", "api_key": "secret", "port": 5432}]})
        );
    }

    #[test]
    fn test_extract_variables() {
        assert!(has_templates("x {{ env.A }}"));
        assert!(!has_templates("{ env.A }"));
        assert_eq!(
            extract_variables("{{ env.A }}/{{vars.b.c}}"),
            vec!["env.A", "vars.b.c"]
        );
    }

    #[test]
    fn test_from_env_snapshot() {
        let ctx = TemplateContext::from_env();
        assert!(ctx.env.is_object());
        assert!(ctx.get("env").is_none());
    }
}
