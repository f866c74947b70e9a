//! Prompt loader for YAML prompt definitions.

use crate::builtin::builtin_prompt;
use crate::types::PromptDefinition;
use counsel_core::{AppError, AppResult};
use std::path::{Path, PathBuf};

/// Directory, relative to the workspace root, holding prompt overrides.
pub const PROMPTS_DIR: &str = ".counsel/prompts";

fn prompt_path(workspace_path: &Path, prompt_id: &str) -> PathBuf {
    workspace_path
        .join(PROMPTS_DIR)
        .join(format!("{}.yml", prompt_id))
}

/// Load a prompt definition by ID from the workspace.
///
/// Looks for `<id>.yml` in `.counsel/prompts/`.
///
/// # Example
/// ```no_run
/// use counsel_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), "counsel.draft")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = prompt_path(workspace_path, prompt_id);

    tracing::debug!("Loading prompt from: {:?}", prompt_file);

    if !prompt_file.exists() {
        return Err(AppError::Prompt(format!(
            "Prompt file not found: {:?}",
            prompt_file
        )));
    }

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition = parse_prompt(&contents, &prompt_file.display().to_string())?;

    if definition.id != prompt_id {
        return Err(AppError::Prompt(format!(
            "Prompt file {:?} declares id '{}', expected '{}'",
            prompt_file, definition.id, prompt_id
        )));
    }

    tracing::info!("Loaded prompt: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// Resolve a prompt: a workspace override wins over the built-in definition.
pub fn resolve_prompt(workspace_path: Option<&Path>, prompt_id: &str) -> AppResult<PromptDefinition> {
    if let Some(workspace) = workspace_path {
        if prompt_path(workspace, prompt_id).exists() {
            return load_prompt(workspace, prompt_id);
        }
    }
    builtin_prompt(prompt_id)
}

/// List all prompt IDs overridden in the workspace.
pub fn list_prompts(workspace_path: &Path) -> AppResult<Vec<String>> {
    let prompts_dir = workspace_path.join(PROMPTS_DIR);

    if !prompts_dir.exists() {
        return Ok(Vec::new());
    }

    let mut prompt_ids = Vec::new();

    for entry in walkdir::WalkDir::new(&prompts_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("yml") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                prompt_ids.push(stem.to_string());
            }
        }
    }

    prompt_ids.sort();
    Ok(prompt_ids)
}

/// Parse and validate YAML prompt text. `origin` names the source in errors.
pub(crate) fn parse_prompt(contents: &str, origin: &str) -> AppResult<PromptDefinition> {
    let definition: PromptDefinition = serde_yaml::from_str(contents)
        .map_err(|e| AppError::Prompt(format!("Failed to parse prompt YAML {}: {}", origin, e)))?;

    validate_prompt(&definition)?;
    Ok(definition)
}

fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    if let Some(name) = def.variables.iter().find(|v| v.trim().is_empty()) {
        return Err(AppError::Prompt(format!(
            "Prompt {} declares an empty variable name: '{}'",
            def.id, name
        )));
    }

    Ok(())
}
