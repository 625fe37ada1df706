//! Text generation backends.
//!
//! A [`Generator`] answers a [`Prompt`] either in one call or as a finite,
//! non-restartable stream of text chunks.

/// Gemini REST client.
pub mod gemini;

use crate::error::GenerationFailure;
use async_trait::async_trait;
use futures::stream::BoxStream;
use juridoc_core::Prompt;

pub use gemini::{GeminiConfig, GeminiGenerator};

/// Incremental answer chunks. Ends after the last chunk or the first error.
pub type TokenStream = BoxStream<'static, Result<String, GenerationFailure>>;

#[async_trait]
pub trait Generator: Send + Sync {
    /// Complete answer text.
    async fn generate(&self, prompt: &Prompt) -> Result<String, GenerationFailure>;

    /// Answer text as it is produced.
    async fn generate_stream(&self, prompt: &Prompt) -> Result<TokenStream, GenerationFailure>;
}
