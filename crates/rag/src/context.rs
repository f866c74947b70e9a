//! Renders analysis, graph facts and passages into the draft context.

use crate::types::{AssembledContext, EntitySet, QuestionAnalysis};

/// Separator placed between passages.
pub const DOCUMENT_SEPARATOR: &str = "#Document ";

#[derive(Debug, Clone, Copy, Default)]
pub struct ContextAssembler;

impl ContextAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Render the context block. Nothing is truncated.
    pub fn assemble(
        &self,
        question: &str,
        analysis: &QuestionAnalysis,
        structured: &str,
        passages: &[String],
    ) -> AssembledContext {
        let situational = if analysis.is_situational { "Có" } else { "Không" };
        let concepts: EntitySet = analysis.key_legal_concepts.iter().collect();

        let text = format!(
            "Câu hỏi gốc: {question}\n\
             \n\
             Phân tích:\n\
             - Câu hỏi tình huống: {situational}\n\
             - Khái niệm pháp lý liên quan: {concepts}\n\
             \n\
             Dữ liệu có cấu trúc:\n\
             {structured}\n\
             \n\
             Dữ liệu không cấu trúc:\n\
             {unstructured}",
            concepts = concepts.into_vec().join(", "),
            unstructured = passages.join(DOCUMENT_SEPARATOR),
        );

        tracing::debug!(chars = text.chars().count(), "Assembled context");
        AssembledContext::new(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(situational: bool, concepts: &[&str]) -> QuestionAnalysis {
        QuestionAnalysis {
            original_question: "q".to_string(),
            is_situational: situational,
            key_legal_concepts: concepts.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn test_full_template() {
        let context = ContextAssembler::new().assemble(
            "Làm thêm giờ tối đa bao nhiêu?",
            &analysis(false, &["làm thêm giờ", "thời giờ làm việc"]),
            "Điều 107 - QUY_ĐỊNH -> làm thêm giờ",
            &["đoạn 1".to_string(), "đoạn 2".to_string()],
        );

        let expected = "Câu hỏi gốc: Làm thêm giờ tối đa bao nhiêu?\n\
                        \n\
                        Phân tích:\n\
                        - Câu hỏi tình huống: Không\n\
                        - Khái niệm pháp lý liên quan: làm thêm giờ, thời giờ làm việc\n\
                        \n\
                        Dữ liệu có cấu trúc:\n\
                        Điều 107 - QUY_ĐỊNH -> làm thêm giờ\n\
                        \n\
                        Dữ liệu không cấu trúc:\n\
                        đoạn 1#Document đoạn 2";
        assert_eq!(context.as_str(), expected);
    }

    #[test]
    fn test_repeated_concepts_listed_once() {
        let context = ContextAssembler::new().assemble(
            "q",
            &analysis(false, &["tiền lương", "làm thêm giờ", "tiền lương", " làm thêm giờ "]),
            "",
            &[],
        );

        assert!(context
            .as_str()
            .contains("- Khái niệm pháp lý liên quan: tiền lương, làm thêm giờ\n"));
    }

    #[test]
    fn test_situational_and_empty_sections() {
        let context = ContextAssembler::new().assemble("q", &analysis(true, &[]), "", &[]);

        assert!(context.as_str().contains("- Câu hỏi tình huống: Có\n"));
        assert!(context.as_str().contains("- Khái niệm pháp lý liên quan: \n"));
        assert!(context.as_str().ends_with("Dữ liệu không cấu trúc:\n"));
    }
}
