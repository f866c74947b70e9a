//! Fuzzy full-text query construction for the entity index.

use crate::synonyms::SynonymTable;
use std::collections::HashSet;

/// Characters with special meaning in Lucene query syntax.
const LUCENE_SPECIAL_CHARS: &[char] = &[
    '+', '-', '&', '|', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', '*', '?', ':', '\\',
];

/// Edit distance tolerated per term.
const FUZZY_SUFFIX: &str = "~2";

/// Replace every Lucene special character with a space.
pub fn remove_lucene_chars(input: &str) -> String {
    input
        .chars()
        .map(|c| if LUCENE_SPECIAL_CHARS.contains(&c) { ' ' } else { c })
        .collect()
}

/// Builds `term~2 OR term~2 ...` queries, widening each word with synonyms.
#[derive(Debug, Clone, Default)]
pub struct FullTextQueryBuilder {
    synonyms: SynonymTable,
}

impl FullTextQueryBuilder {
    pub fn new(synonyms: SynonymTable) -> Self {
        Self { synonyms }
    }

    /// Build the query for `input`.
    ///
    /// Terms appear in first-seen order without duplicates. Input without
    /// any word yields an empty string, which callers treat as "no search".
    pub fn build(&self, input: &str) -> String {
        let cleaned = remove_lucene_chars(input);

        let mut seen = HashSet::new();
        let mut terms: Vec<String> = Vec::new();

        for token in cleaned.split_whitespace() {
            for term in std::iter::once(token).chain(self.synonyms.expand(token)) {
                if seen.insert(term.to_string()) {
                    terms.push(format!("{}{}", term, FUZZY_SUFFIX));
                }
            }
        }

        terms.join(" OR ")
    }
}

/// Build a query with the built-in labor-law synonyms.
pub fn generate_full_text_query(input: &str) -> String {
    FullTextQueryBuilder::default().build(input)
}
