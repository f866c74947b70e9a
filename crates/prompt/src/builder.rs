//! Prompt builder for rendering system and user templates.

use crate::types::{BuiltPrompt, PromptDefinition};
use counsel_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Build a prompt from a definition and input variables.
///
/// Every variable the definition declares must be present; Handlebars would
/// otherwise render a missing one as an empty string and the model would
/// receive a silently truncated prompt.
///
/// # Example
/// ```no_run
/// use counsel_prompt::{build_prompt, builtin_prompt, ids};
/// use std::collections::HashMap;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let def = builtin_prompt(ids::ANALYZE)?;
/// let mut vars = HashMap::new();
/// vars.insert("question".to_string(), "Làm thêm giờ tối đa bao nhiêu?".to_string());
///
/// let built = build_prompt(&def, vars)?;
/// println!("User prompt: {}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let missing: Vec<&str> = definition
        .variables
        .iter()
        .filter(|name| !variables.contains_key(name.as_str()))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        return Err(AppError::Prompt(format!(
            "Prompt {} is missing variables: {}",
            definition.id,
            missing.join(", ")
        )));
    }

    let system = definition
        .system
        .as_deref()
        .map(|template| render_template(template, &variables))
        .transpose()?
        .map(|s| s.trim_end().to_string());

    let user = render_template(&definition.template, &variables)?
        .trim_end()
        .to_string();

    Ok(BuiltPrompt::new(system, user, definition.id.clone(), variables))
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Legal text is plain text, never HTML
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    let rendered = handlebars
        .render("prompt", &variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PromptOutputSpec;

    fn create_test_definition(system: Option<&str>) -> PromptDefinition {
        PromptDefinition {
            id: "test.prompt".to_string(),
            title: "Test".to_string(),
            api_version: "1.0".to_string(),
            created_by: "test".to_string(),
            variables: vec!["question".to_string()],
            system: system.map(str::to_string),
            template: "Câu hỏi: {{question}}\n".to_string(),
            output: PromptOutputSpec::default(),
        }
    }

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_simple_template() {
        let result = render_template("Question: {{prompt}}", &vars(&[("prompt", "Hello")]));
        assert_eq!(result.unwrap(), "Question: Hello");
    }

    #[test]
    fn test_render_does_not_escape() {
        let result = render_template("{{text}}", &vars(&[("text", "a < b & \"c\"")]));
        assert_eq!(result.unwrap(), "a < b & \"c\"");
    }

    #[test]
    fn test_build_prompt_without_system() {
        let def = create_test_definition(None);
        let built = build_prompt(&def, vars(&[("question", "Lương tối thiểu?")])).unwrap();

        assert_eq!(built.user, "Câu hỏi: Lương tối thiểu?");
        assert!(built.system.is_none());
        assert_eq!(built.metadata.source_prompt_id, "test.prompt");
    }

    #[test]
    fn test_build_prompt_renders_system() {
        let def = create_test_definition(Some("Chủ đề: {{question}}\n"));
        let built = build_prompt(&def, vars(&[("question", "nghỉ phép")])).unwrap();

        assert_eq!(built.system.as_deref(), Some("Chủ đề: nghỉ phép"));
    }

    #[test]
    fn test_build_prompt_missing_variable() {
        let def = create_test_definition(None);
        let err = build_prompt(&def, HashMap::new()).unwrap_err();

        match err {
            AppError::Prompt(msg) => assert!(msg.contains("question")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_undeclared_variable_renders_empty() {
        let result = render_template("Question: {{missing}}", &HashMap::new());
        assert_eq!(result.unwrap(), "Question: ");
    }
}
