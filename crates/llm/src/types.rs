//! Provider identifiers.

/// Provider type enum for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    Gemini,
    Ollama,
}

impl ProviderType {
    /// Parse provider type from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Some(Self::Gemini),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }

    /// Get the canonical provider name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Ollama => "ollama",
        }
    }

    /// Embedding model used when none is configured.
    pub fn default_embedding_model(&self) -> &'static str {
        match self {
            Self::Gemini => "models/embedding-001",
            Self::Ollama => "nomic-embed-text",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_type_parsing() {
        assert_eq!(ProviderType::parse("gemini"), Some(ProviderType::Gemini));
        assert_eq!(ProviderType::parse("Google"), Some(ProviderType::Gemini));
        assert_eq!(ProviderType::parse("ollama"), Some(ProviderType::Ollama));
        assert_eq!(ProviderType::parse("unknown"), None);
    }

    #[test]
    fn test_round_trip_names() {
        for provider in [ProviderType::Gemini, ProviderType::Ollama] {
            assert_eq!(ProviderType::parse(provider.as_str()), Some(provider));
        }
    }
}
