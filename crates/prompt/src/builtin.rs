//! Built-in prompts shipped with the crate.

use crate::loader::{parse_prompt, resolve_prompt};
use crate::types::PromptDefinition;
use counsel_core::{AppError, AppResult};
use std::path::Path;

/// Prompt identifiers used by the pipeline stages.
pub mod ids {
    pub const CONDENSE: &str = "counsel.condense";
    pub const ANALYZE: &str = "counsel.analyze";
    pub const ENTITIES: &str = "counsel.entities";
    pub const DRAFT: &str = "counsel.draft";
    pub const REFINE: &str = "counsel.refine";
}

pub const BUILTIN_PROMPT_IDS: [&str; 5] = [
    ids::CONDENSE,
    ids::ANALYZE,
    ids::ENTITIES,
    ids::DRAFT,
    ids::REFINE,
];

fn builtin_source(prompt_id: &str) -> Option<&'static str> {
    match prompt_id {
        ids::CONDENSE => Some(include_str!("../prompts/counsel.condense.yml")),
        ids::ANALYZE => Some(include_str!("../prompts/counsel.analyze.yml")),
        ids::ENTITIES => Some(include_str!("../prompts/counsel.entities.yml")),
        ids::DRAFT => Some(include_str!("../prompts/counsel.draft.yml")),
        ids::REFINE => Some(include_str!("../prompts/counsel.refine.yml")),
        _ => None,
    }
}

/// Parse a built-in prompt definition.
pub fn builtin_prompt(prompt_id: &str) -> AppResult<PromptDefinition> {
    let source = builtin_source(prompt_id)
        .ok_or_else(|| AppError::Prompt(format!("Unknown prompt: {}", prompt_id)))?;
    parse_prompt(source, &format!("builtin:{}", prompt_id))
}

/// The five prompts the answer pipeline needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct PromptSet {
    pub condense: PromptDefinition,
    pub analyze: PromptDefinition,
    pub entities: PromptDefinition,
    pub draft: PromptDefinition,
    pub refine: PromptDefinition,
}

impl PromptSet {
    /// Built-in prompts only.
    pub fn builtin() -> AppResult<Self> {
        Self::load(None)
    }

    /// Resolve every stage prompt, honoring workspace overrides.
    pub fn load(workspace_path: Option<&Path>) -> AppResult<Self> {
        Ok(Self {
            condense: resolve_prompt(workspace_path, ids::CONDENSE)?,
            analyze: resolve_prompt(workspace_path, ids::ANALYZE)?,
            entities: resolve_prompt(workspace_path, ids::ENTITIES)?,
            draft: resolve_prompt(workspace_path, ids::DRAFT)?,
            refine: resolve_prompt(workspace_path, ids::REFINE)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_prompt;
    use std::collections::HashMap;

    #[test]
    fn test_all_builtins_parse() {
        for id in BUILTIN_PROMPT_IDS {
            let def = builtin_prompt(id).unwrap();
            assert_eq!(def.id, id);
        }
    }

    #[test]
    fn test_unknown_builtin() {
        assert!(matches!(
            builtin_prompt("counsel.unknown"),
            Err(AppError::Prompt(_))
        ));
    }

    #[test]
    fn test_structured_prompts_declare_json() {
        let set = PromptSet::builtin().unwrap();
        assert!(set.analyze.output.is_json());
        assert!(set.entities.output.is_json());
        assert!(!set.draft.output.is_json());
    }

    #[test]
    fn test_draft_renders_context_and_question() {
        let set = PromptSet::builtin().unwrap();
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), "Điều 107".to_string());
        vars.insert("question".to_string(), "Làm thêm giờ?".to_string());

        let built = build_prompt(&set.draft, vars).unwrap();
        assert!(built.user.contains("Điều 107"));
        assert!(built.user.contains("Câu hỏi: Làm thêm giờ?"));
        assert!(built.user.contains("Theo Điều ... của bộ Luật Lao Động"));
    }

    #[test]
    fn test_refine_requires_initial_response() {
        let set = PromptSet::builtin().unwrap();
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "q".to_string());

        assert!(build_prompt(&set.refine, vars).is_err());
    }
}
