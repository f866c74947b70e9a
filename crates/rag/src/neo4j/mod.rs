//! Neo4j-backed graph and vector stores over the HTTP transaction API.

pub mod client;
pub mod graph;
pub mod vector;

pub use client::Neo4jClient;
pub use graph::Neo4jGraphStore;
pub use vector::Neo4jVectorStore;

/// Backtick-quote a label or index name for interpolation into Cypher.
pub(crate) fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("__Entity__"), "`__Entity__`");
        assert_eq!(quote_identifier("a`b"), "`a``b`");
    }
}
