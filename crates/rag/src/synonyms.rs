//! Labor-law synonym table used to widen full-text queries.

/// Built-in phrase table. Keys are lower-case.
const LABOR_SYNONYMS: &[(&str, &[&str])] = &[
    (
        "lao động",
        &["người lao động", "nhân viên", "công nhân", "người làm công"],
    ),
    ("thời giờ", &["thời gian", "giờ", "số giờ"]),
    ("giờ làm", &["giờ", "số giờ"]),
    ("làm việc", &["công việc", "lao động"]),
    ("tối đa", &["nhiều nhất", "cao nhất", "không quá"]),
    ("lương", &["tiền lương", "tiền công", "thù lao"]),
    (
        "không lương",
        &["không trả lương", "không trả công", "miễn phí"],
    ),
    ("vi phạm", &["phạm luật", "trái pháp luật", "trái luật"]),
    (
        "phạt",
        &["xử phạt", "chế tài", "chế tài xử phạt", "hình phạt"],
    ),
    (
        "khiếu nại",
        &["khiếu kiện", "tố cáo", "tố giác", "khởi kiện"],
    ),
];

/// Ordered mapping from a phrase to related phrases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynonymTable {
    entries: Vec<(String, Vec<String>)>,
}

impl Default for SynonymTable {
    fn default() -> Self {
        Self::labor_law()
    }
}

impl SynonymTable {
    /// The built-in Vietnamese labor-law table.
    pub fn labor_law() -> Self {
        Self::from_entries(
            LABOR_SYNONYMS
                .iter()
                .map(|(key, synonyms)| (*key, synonyms.iter().copied())),
        )
    }

    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn from_entries<K, I, S>(entries: impl IntoIterator<Item = (K, I)>) -> Self
    where
        K: AsRef<str>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(key, synonyms)| {
                    (
                        key.as_ref().to_lowercase(),
                        synonyms.into_iter().map(Into::into).collect(),
                    )
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Synonyms of every key that contains `token` or is contained in it.
    ///
    /// Matching is plain substring containment on the lower-cased token, in
    /// both directions, so short keys such as "phạt" also match longer words.
    pub fn expand(&self, token: &str) -> Vec<&str> {
        let token = token.to_lowercase();
        if token.is_empty() {
            return Vec::new();
        }

        self.entries
            .iter()
            .filter(|(key, _)| key.contains(&token) || token.contains(key.as_str()))
            .flat_map(|(_, synonyms)| synonyms.iter().map(String::as_str))
            .collect()
    }
}
