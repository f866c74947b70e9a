//! Domain types shared by the pipeline stages.

use counsel_llm::{ChatMessage, OutputSchema};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashSet;
use std::fmt;

/// One exchange of an earlier conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub human: String,
    pub ai: String,
}

impl ConversationTurn {
    pub fn new(human: impl Into<String>, ai: impl Into<String>) -> Self {
        Self {
            human: human.into(),
            ai: ai.into(),
        }
    }

    /// The turn as a user message followed by an assistant message.
    pub fn to_messages(&self) -> [ChatMessage; 2] {
        [
            ChatMessage::user(self.human.clone()),
            ChatMessage::assistant(self.ai.clone()),
        ]
    }
}

impl<H: Into<String>, A: Into<String>> From<(H, A)> for ConversationTurn {
    fn from((human, ai): (H, A)) -> Self {
        Self::new(human, ai)
    }
}

/// Caller-owned chat history, oldest turn first.
pub type ChatHistory = Vec<ConversationTurn>;

/// Classification of a question, produced by the analyzer.
///
/// Every field is required; a reply that omits one is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAnalysis {
    pub original_question: String,
    pub is_situational: bool,
    pub key_legal_concepts: Vec<String>,
}

impl OutputSchema for QuestionAnalysis {
    const NAME: &'static str = "QuestionAnalysis";

    fn json_schema() -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "original_question": {
                    "type": "string",
                    "description": "Câu hỏi gốc từ người dùng"
                },
                "is_situational": {
                    "type": "boolean",
                    "description": "Đây có phải là câu hỏi tình huống không?"
                },
                "key_legal_concepts": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Các khái niệm pháp lý chính liên quan đến câu hỏi"
                }
            },
            "required": ["original_question", "is_situational", "key_legal_concepts"]
        })
    }
}

/// Entity names extracted from a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entities {
    pub names: Vec<String>,
}

impl OutputSchema for Entities {
    const NAME: &'static str = "Entities";

    fn json_schema() -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "names": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Tất cả các thực thể là người, khái niệm thời gian, tổ chức, \
                                    doanh nghiệp hoặc khái niệm pháp lý xuất hiện trong văn bản"
                }
            },
            "required": ["names"]
        })
    }
}

/// Duplicate-free entity names in first-insertion order.
///
/// Names are trimmed; blank names are ignored.
#[derive(Debug, Clone, Default)]
pub struct EntitySet {
    names: Vec<String>,
    seen: HashSet<String>,
}

impl EntitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a name, returning `false` if it was blank or already present.
    pub fn insert(&mut self, name: impl AsRef<str>) -> bool {
        let name = name.as_ref().trim();
        if name.is_empty() || self.seen.contains(name) {
            return false;
        }
        self.seen.insert(name.to_string());
        self.names.push(name.to_string());
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.seen.contains(name.trim())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.names
    }
}

impl<S: AsRef<str>> Extend<S> for EntitySet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for name in iter {
            self.insert(name);
        }
    }
}

impl<S: AsRef<str>> FromIterator<S> for EntitySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

/// One graph edge next to a matched entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactTriple {
    pub subject: String,
    pub relation: String,
    pub object: String,
}

impl FactTriple {
    pub fn new(
        subject: impl Into<String>,
        relation: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            relation: relation.into(),
            object: object.into(),
        }
    }
}

impl fmt::Display for FactTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} -> {}", self.subject, self.relation, self.object)
    }
}

/// Context block handed to the draft stage. Built fresh for every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledContext(String);

impl AssembledContext {
    pub(crate) fn new(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for AssembledContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use counsel_llm::{parse_structured, ChatRole};

    #[test]
    fn test_entity_set_keeps_first_insertion_order() {
        let set: EntitySet = ["lương", " hợp đồng ", "lương", "", "phạt"]
            .into_iter()
            .collect();

        assert_eq!(set.len(), 3);
        assert_eq!(
            set.into_vec(),
            vec!["lương".to_string(), "hợp đồng".to_string(), "phạt".to_string()]
        );
    }

    #[test]
    fn test_entity_set_insert_reports_duplicates() {
        let mut set = EntitySet::new();
        assert!(set.insert("bảo hiểm"));
        assert!(!set.insert("bảo hiểm "));
        assert!(!set.insert("   "));
        assert!(set.contains("bảo hiểm"));
    }

    #[test]
    fn test_fact_triple_display() {
        let fact = FactTriple::new("Điều 107", "QUY_ĐỊNH", "làm thêm giờ");
        assert_eq!(fact.to_string(), "Điều 107 - QUY_ĐỊNH -> làm thêm giờ");
    }

    #[test]
    fn test_turn_messages_alternate_roles() {
        let turn = ConversationTurn::new("Tôi bị nợ lương", "Bạn có thể khiếu nại.");
        let [user, assistant] = turn.to_messages();
        assert_eq!(user.role, ChatRole::User);
        assert_eq!(assistant.role, ChatRole::Assistant);
        assert_eq!(assistant.content, "Bạn có thể khiếu nại.");
    }

    #[test]
    fn test_turn_from_pair_and_json_array() {
        let turn: ConversationTurn = ("hỏi", "đáp").into();
        assert_eq!(turn.human, "hỏi");

        let parsed: Vec<(String, String)> = serde_json::from_str(r#"[["a","b"]]"#).unwrap();
        let history: ChatHistory = parsed.into_iter().map(ConversationTurn::from).collect();
        assert_eq!(history, vec![ConversationTurn::new("a", "b")]);
    }

    #[test]
    fn test_analysis_requires_every_field() {
        let ok = parse_structured::<QuestionAnalysis>(
            r#"{"original_question":"q","is_situational":true,"key_legal_concepts":["lương"]}"#,
        )
        .unwrap();
        assert!(ok.is_situational);

        let missing = parse_structured::<QuestionAnalysis>(
            r#"{"original_question":"q","is_situational":true}"#,
        );
        assert!(missing.is_err());

        let mistyped = parse_structured::<QuestionAnalysis>(
            r#"{"original_question":"q","is_situational":"yes","key_legal_concepts":[]}"#,
        );
        assert!(mistyped.is_err());
    }

    #[test]
    fn test_entities_schema_names_required_field() {
        let schema = Entities::json_schema();
        assert_eq!(schema["required"][0], "names");
    }
}
