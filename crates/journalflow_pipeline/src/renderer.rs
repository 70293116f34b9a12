//! Prompt rendering and parameter resolution.

use journalflow_core::{truncate_chars, ActionContext, PromptParameter, PromptTemplate};
use journalflow_error::{PipelineError, PipelineErrorKind};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, BTreeSet};

/// Renders prompt templates by resolving declared parameters against a
/// value source.
///
/// Resolution order per parameter: a supplied value wins, else the declared
/// default, else the parameter is missing (an error when required). Values
/// are stringified and truncated to the parameter's `max_length` before
/// substitution.
///
/// The template is validated up front: every `{placeholder}` must be
/// resolvable, and all missing names are reported together in a single
/// error rather than one at a time.
///
/// # Examples
///
/// ```
/// use journalflow_core::{PromptParameter, PromptTemplate};
/// use journalflow_pipeline::PromptRenderer;
/// use serde_json::json;
/// use std::collections::HashMap;
///
/// let template = PromptTemplate::new(
///     "classify_message".to_string(),
///     "Classify: {text}".to_string(),
///     0.0,
/// );
/// let parameters = vec![PromptParameter::new(
///     "classify_message".to_string(),
///     "text".to_string(),
///     true,
///     None,
///     None,
/// )];
/// let mut values = HashMap::new();
/// values.insert("text".to_string(), json!("hi"));
///
/// let rendered = PromptRenderer.render(&template, &parameters, &values).unwrap();
/// assert_eq!(rendered, "Classify: hi");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptRenderer;

impl PromptRenderer {
    /// Render `template` using `values` as the parameter source.
    ///
    /// # Errors
    ///
    /// Returns `MissingParameters` naming every unresolvable parameter,
    /// both required parameters with no value and no default, and template
    /// placeholders with no resolved value.
    #[tracing::instrument(skip(self, template, parameters, values), fields(prompt_label = %template.prompt_label()))]
    pub fn render(
        &self,
        template: &PromptTemplate,
        parameters: &[PromptParameter],
        values: &ActionContext,
    ) -> Result<String, PipelineError> {
        let mut resolved: BTreeMap<String, String> = BTreeMap::new();
        let mut missing: BTreeSet<String> = BTreeSet::new();

        for parameter in parameters {
            let name = parameter.name();
            let max_length = parameter.effective_max_length();

            if let Some(value) = values.get(name) {
                resolved.insert(name.clone(), truncate_chars(&stringify(value), max_length));
            } else if let Some(default) = parameter.default_value() {
                resolved.insert(name.clone(), truncate_chars(default, max_length));
            } else if *parameter.is_required() {
                missing.insert(name.clone());
            }
            // Optional, no value, no default: absent from substitution.
        }

        let placeholder = regex::Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").map_err(|e| {
            PipelineError::new(PipelineErrorKind::Template(format!(
                "Invalid placeholder regex: {}",
                e
            )))
        })?;

        // Validate every placeholder before substituting anything, so one
        // error names all unresolved keys at once.
        for captures in placeholder.captures_iter(template.template()) {
            let name = &captures[1];
            if !resolved.contains_key(name) {
                missing.insert(name.to_string());
            }
        }

        if !missing.is_empty() {
            return Err(PipelineError::new(PipelineErrorKind::MissingParameters(
                missing.into_iter().collect(),
            )));
        }

        let rendered = placeholder.replace_all(template.template(), |captures: &regex::Captures| {
            resolved[&captures[1]].clone()
        });

        tracing::debug!(
            prompt_label = %template.prompt_label(),
            length = rendered.len(),
            "Rendered prompt"
        );

        Ok(rendered.into_owned())
    }
}

/// Stringify a context value for substitution.
///
/// Strings substitute without surrounding quotes; other JSON values use
/// their compact serialization.
fn stringify(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Null => "null".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn template(text: &str) -> PromptTemplate {
        PromptTemplate::new("test_prompt".to_string(), text.to_string(), 0.0)
    }

    fn parameter(
        name: &str,
        is_required: bool,
        default_value: Option<&str>,
        max_length: Option<usize>,
    ) -> PromptParameter {
        PromptParameter::new(
            "test_prompt".to_string(),
            name.to_string(),
            is_required,
            default_value.map(str::to_string),
            max_length,
        )
    }

    #[test]
    fn supplied_value_wins_over_default() {
        let mut values = ActionContext::new();
        values.insert("tone".to_string(), json!("formal"));

        let rendered = PromptRenderer
            .render(
                &template("Respond in a {tone} tone"),
                &[parameter("tone", false, Some("casual"), None)],
                &values,
            )
            .unwrap();
        assert_eq!(rendered, "Respond in a formal tone");
    }

    #[test]
    fn default_fills_missing_value() {
        let rendered = PromptRenderer
            .render(
                &template("Respond in a {tone} tone"),
                &[parameter("tone", false, Some("casual"), None)],
                &ActionContext::new(),
            )
            .unwrap();
        assert_eq!(rendered, "Respond in a casual tone");
    }

    #[test]
    fn missing_required_parameter_is_named() {
        let err = PromptRenderer
            .render(
                &template("Summarize: {text}"),
                &[parameter("text", true, None, None)],
                &ActionContext::new(),
            )
            .unwrap_err();
        match err.kind {
            PipelineErrorKind::MissingParameters(names) => {
                assert_eq!(names, vec!["text".to_string()]);
            }
            other => panic!("unexpected kind: {other}"),
        }
    }

    #[test]
    fn all_missing_names_reported_at_once() {
        let err = PromptRenderer
            .render(
                &template("{a} and {b} and {c}"),
                &[
                    parameter("a", true, None, None),
                    parameter("b", true, None, None),
                ],
                &ActionContext::new(),
            )
            .unwrap_err();
        match err.kind {
            PipelineErrorKind::MissingParameters(names) => {
                // Declared-but-missing and undeclared placeholders both appear.
                assert_eq!(
                    names,
                    vec!["a".to_string(), "b".to_string(), "c".to_string()]
                );
            }
            other => panic!("unexpected kind: {other}"),
        }
    }

    #[test]
    fn values_truncate_to_exactly_max_length() {
        let mut values = ActionContext::new();
        values.insert("text".to_string(), json!("abcdefghij"));

        let rendered = PromptRenderer
            .render(
                &template("Summarize: {text}"),
                &[parameter("text", true, None, Some(4))],
                &values,
            )
            .unwrap();
        assert_eq!(rendered, "Summarize: abcd");
    }

    #[test]
    fn truncation_applies_to_stringified_value() {
        let mut values = ActionContext::new();
        values.insert("count".to_string(), json!(123456));

        let rendered = PromptRenderer
            .render(
                &template("Count: {count}"),
                &[parameter("count", true, None, Some(3))],
                &values,
            )
            .unwrap();
        assert_eq!(rendered, "Count: 123");
    }

    #[test]
    fn optional_parameter_without_placeholder_is_fine() {
        let rendered = PromptRenderer
            .render(
                &template("No placeholders here"),
                &[parameter("unused", false, None, None)],
                &ActionContext::new(),
            )
            .unwrap();
        assert_eq!(rendered, "No placeholders here");
    }
}
