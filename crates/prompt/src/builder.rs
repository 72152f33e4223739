//! Prompt builder for rendering templates.

use crate::types::{BuiltPrompt, PromptDefinition};
use docqa_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::BTreeMap;

/// Build a prompt from a definition and input variables.
///
/// Every entry of `required_variables` must be present; the template is
/// then rendered in strict mode so a typo in a placeholder fails loudly
/// instead of silently rendering as an empty string.
///
/// # Example
/// ```
/// use docqa_prompt::{build_prompt, grounded_qa};
/// use std::collections::BTreeMap;
///
/// let mut vars = BTreeMap::new();
/// vars.insert("context".to_string(), "[Source: a.txt]\nRust is fast.".to_string());
/// vars.insert("question".to_string(), "Is Rust fast?".to_string());
///
/// let built = build_prompt(&grounded_qa(), vars).unwrap();
/// assert!(built.user.ends_with("Answer:"));
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: BTreeMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!(prompt_id = %definition.id, "Building prompt");

    let missing: Vec<&str> = definition
        .required_variables
        .iter()
        .filter(|name| !variables.contains_key(name.as_str()))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        return Err(AppError::Prompt(format!(
            "Prompt '{}' is missing variables: {}",
            definition.id,
            missing.join(", ")
        )));
    }

    let user = render_template(&definition.template, &variables)?;

    Ok(BuiltPrompt::new(None, user, definition.id.clone(), variables))
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &BTreeMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Documents are plain text; HTML escaping would mangle quotes and ampersands
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.set_strict_mode(true);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(template: &str, required: &[&str]) -> PromptDefinition {
        PromptDefinition {
            id: "test.prompt".to_string(),
            title: "Test".to_string(),
            required_variables: required.iter().map(|s| s.to_string()).collect(),
            template: template.to_string(),
        }
    }

    #[test]
    fn test_render_simple_template() {
        let mut vars = BTreeMap::new();
        vars.insert("question".to_string(), "Hello, world!".to_string());

        let result = render_template("Question: {{question}}", &vars).unwrap();
        assert_eq!(result, "Question: Hello, world!");
    }

    #[test]
    fn test_values_are_not_html_escaped() {
        let mut vars = BTreeMap::new();
        vars.insert("context".to_string(), "Tom & Jerry said \"<hi>\"".to_string());

        let result = render_template("{{context}}", &vars).unwrap();
        assert_eq!(result, "Tom & Jerry said \"<hi>\"");
    }

    #[test]
    fn test_values_are_not_reinterpreted_as_templates() {
        let mut vars = BTreeMap::new();
        vars.insert("context".to_string(), "{{question}}".to_string());
        vars.insert("question".to_string(), "q".to_string());

        let result = render_template("{{context}}", &vars).unwrap();
        assert_eq!(result, "{{question}}");
    }

    #[test]
    fn test_build_prompt_records_metadata() {
        let def = definition("Q: {{question}}", &["question"]);
        let mut vars = BTreeMap::new();
        vars.insert("question".to_string(), "Why?".to_string());

        let built = build_prompt(&def, vars).unwrap();
        assert_eq!(built.user, "Q: Why?");
        assert!(built.system.is_none());
        assert_eq!(built.metadata.source_prompt_id, "test.prompt");
        assert_eq!(
            built.metadata.resolved_variables.get("question").map(String::as_str),
            Some("Why?")
        );
    }

    #[test]
    fn test_build_prompt_missing_required_variable() {
        let def = definition("{{context}} {{question}}", &["context", "question"]);
        let mut vars = BTreeMap::new();
        vars.insert("question".to_string(), "Why?".to_string());

        let err = build_prompt(&def, vars).unwrap_err();
        assert!(err.to_string().contains("context"));
    }

    #[test]
    fn test_strict_mode_rejects_unknown_placeholder() {
        let vars = BTreeMap::new();
        assert!(render_template("Question: {{missing}}", &vars).is_err());
    }
}
