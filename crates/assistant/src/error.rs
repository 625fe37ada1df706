//! Error types for the assistant.
//!
//! Startup failures ([`RagError::Configuration`], [`RagError::Index`]) are
//! fatal. Generation failures are turned into fallback answers by the
//! orchestrator and never reach callers of `Assistant::answer*`.

use juridoc_core::IndexError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RagError {
    /// Missing or invalid configuration detected at startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error("embedding error: {0}")]
    Embedding(String),

    #[error("generation unavailable: {0}")]
    GenerationUnavailable(#[from] GenerationFailure),
}

/// Why a generator call did not produce an answer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationFailure {
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("response contained no candidate text")]
    EmptyResponse,
}

impl GenerationFailure {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationFailure::Http { .. } => "http",
            GenerationFailure::Connection(_) => "connection",
            GenerationFailure::Timeout(_) => "timeout",
            GenerationFailure::Request(_) => "request",
            GenerationFailure::Malformed(_) => "malformed",
            GenerationFailure::EmptyResponse => "empty",
        }
    }

    /// Answer text shown to the user in place of a generated answer.
    pub fn fallback_message(&self) -> String {
        match self {
            GenerationFailure::Http { status, .. } => format!(
                "Une erreur s'est produite lors de la communication avec l'API Gemini. Erreur HTTP: {status}"
            ),
            GenerationFailure::Connection(e) => {
                format!("Problème de connexion à l'API Gemini: {e}")
            }
            GenerationFailure::Timeout(e) => {
                format!("Délai d'attente dépassé lors de la connexion à l'API Gemini: {e}")
            }
            GenerationFailure::Request(e) => {
                format!("Une erreur s'est produite avec l'API Gemini: {e}")
            }
            GenerationFailure::Malformed(e) => {
                format!("Erreur lors du traitement de la réponse de l'API Gemini: {e}")
            }
            GenerationFailure::EmptyResponse => {
                "Je suis désolé, je n'ai pas pu générer une réponse. Veuillez réessayer.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for GenerationFailure {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GenerationFailure::Timeout(e.to_string())
        } else if e.is_connect() {
            GenerationFailure::Connection(e.to_string())
        } else if e.is_decode() {
            GenerationFailure::Malformed(e.to_string())
        } else if let Some(status) = e.status() {
            GenerationFailure::Http {
                status: status.as_u16(),
                body: String::new(),
            }
        } else {
            GenerationFailure::Request(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_messages_are_french() {
        let http = GenerationFailure::Http {
            status: 503,
            body: "overloaded".into(),
        };
        assert!(http.fallback_message().ends_with("Erreur HTTP: 503"));
        assert!(GenerationFailure::Timeout("60s".into())
            .fallback_message()
            .starts_with("Délai d'attente dépassé"));
        assert_eq!(
            GenerationFailure::EmptyResponse.fallback_message(),
            "Je suis désolé, je n'ai pas pu générer une réponse. Veuillez réessayer."
        );
    }

    #[test]
    fn test_kinds() {
        assert_eq!(GenerationFailure::EmptyResponse.kind(), "empty");
        assert_eq!(GenerationFailure::Malformed("x".into()).kind(), "malformed");
    }

    #[test]
    fn test_index_error_converts() {
        let err: RagError = IndexError::Invalid("dimension 0".into()).into();
        assert!(matches!(err, RagError::Index(_)));
        assert_eq!(err.to_string(), "invalid artifact: dimension 0");
    }
}
