//! Process settings and startup wiring.
//!
//! Every option can come from the command line or the environment. Startup
//! fails fast: the generator credential is checked before any artifact is
//! loaded, and a missing or inconsistent index aborts the process.

use crate::embedding::{EmbedderConfig, HttpEmbedder};
use crate::error::RagError;
use crate::generation::{GeminiConfig, GeminiGenerator};
use crate::pipeline::Assistant;
use crate::ranker::SemanticRanker;
use clap::Parser;
use juridoc_core::{
    config, Corpus, DenseIndex, HybridConfig, LexicalRanker, QueryClassifier, RoutingConfig,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "juridoc",
    version,
    about = "Grounded answers to French-language questions on Moroccan law"
)]
pub struct Settings {
    /// Question to answer. Reads one question per line from stdin when omitted.
    pub question: Option<String>,

    /// Stream the answer as it is generated
    #[arg(long)]
    pub stream: bool,

    /// Print JSON (one object, or one event per line with --stream)
    #[arg(long)]
    pub json: bool,

    /// Emit logs as JSON on stderr
    #[arg(long, env = "JURIDOC_LOG_JSON")]
    pub log_json: bool,

    /// Corpus file: JSON array of {id, text, metadata}
    #[arg(long, env = "JURIDOC_CORPUS", default_value = "knowledge_base/corpus.json")]
    pub corpus: PathBuf,

    /// BM25+ index snapshot
    #[arg(long, env = "JURIDOC_LEXICAL_INDEX", default_value = "knowledge_base/lexical.idx")]
    pub lexical_index: PathBuf,

    /// Dense vector index snapshot
    #[arg(long, env = "JURIDOC_DENSE_INDEX", default_value = "knowledge_base/dense.idx")]
    pub dense_index: PathBuf,

    /// Fusion settings (rrf_k, top_k, per_retriever_k). Defaults apply when absent.
    #[arg(long, env = "JURIDOC_HYBRID_CONFIG", default_value = "hybrid_config.json")]
    pub hybrid_config: PathBuf,

    /// Override the routing phrase lists
    #[arg(long, env = "JURIDOC_ROUTING_CONFIG")]
    pub routing_config: Option<PathBuf>,

    /// Override the number of documents cited per answer
    #[arg(long)]
    pub top_k: Option<usize>,

    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    #[arg(long, env = "GEMINI_MODEL", default_value = config::DEFAULT_GENERATION_MODEL)]
    pub gemini_model: String,

    #[arg(long, env = "GEMINI_BASE_URL", default_value = config::DEFAULT_GEMINI_BASE_URL)]
    pub gemini_base_url: String,

    /// OpenAI-compatible embeddings endpoint
    #[arg(
        long,
        env = "JURIDOC_EMBEDDING_URL",
        default_value = "http://127.0.0.1:8080/v1/embeddings"
    )]
    pub embedding_url: String,

    #[arg(long, env = "JURIDOC_EMBEDDING_MODEL", default_value = config::DEFAULT_EMBEDDING_MODEL)]
    pub embedding_model: String,

    #[arg(long, env = "JURIDOC_EMBEDDING_API_KEY", hide_env_values = true)]
    pub embedding_api_key: Option<String>,

    /// Prefix prepended to queries before embedding
    #[arg(long, env = "JURIDOC_QUERY_INSTRUCTION", default_value = config::DEFAULT_QUERY_INSTRUCTION)]
    pub query_instruction: String,

    /// HTTP timeout for generator and embedder calls, in seconds
    #[arg(long, default_value_t = config::REQUEST_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

impl Settings {
    pub fn gemini_config(&self) -> Result<GeminiConfig, RagError> {
        let api_key = self
            .gemini_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                RagError::Configuration(
                    "Gemini API key is required (set GEMINI_API_KEY or --gemini-api-key)"
                        .to_string(),
                )
            })?;
        Ok(GeminiConfig {
            api_key: api_key.to_string(),
            model: self.gemini_model.clone(),
            base_url: self.gemini_base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        })
    }

    pub fn embedder_config(&self) -> EmbedderConfig {
        EmbedderConfig {
            url: self.embedding_url.clone(),
            model: self.embedding_model.clone(),
            query_instruction: self.query_instruction.clone(),
            api_key: self.embedding_api_key.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    /// Fusion settings from the config file, with the CLI `--top-k` applied.
    pub fn hybrid_config(&self) -> Result<HybridConfig, RagError> {
        let mut hybrid = HybridConfig::load(&self.hybrid_config).map_err(RagError::Configuration)?;
        if let Some(top_k) = self.top_k {
            hybrid.top_k = top_k;
            hybrid.validate().map_err(RagError::Configuration)?;
        }
        Ok(hybrid)
    }

    pub fn routing(&self) -> Result<RoutingConfig, RagError> {
        match &self.routing_config {
            Some(path) => RoutingConfig::load(path).map_err(RagError::Configuration),
            None => Ok(RoutingConfig::default()),
        }
    }
}

/// Loads every artifact and connects the clients described by `settings`.
pub async fn build_assistant(settings: &Settings) -> Result<Assistant, RagError> {
    let generator = GeminiGenerator::new(settings.gemini_config()?)?;
    let hybrid = settings.hybrid_config()?;
    let classifier = QueryClassifier::new(&settings.routing()?);

    let corpus = Corpus::load(&settings.corpus)?;
    let lexical = LexicalRanker::load(&settings.lexical_index)?;
    tracing::info!("Loaded lexical index with {} documents", lexical.len());
    let dense = DenseIndex::load(&settings.dense_index)?;
    tracing::info!(
        "Loaded dense index with {} vectors ({}, dim {})",
        dense.len(),
        dense.model(),
        dense.dimension()
    );

    let embedder = HttpEmbedder::new(settings.embedder_config())?;
    let semantic = SemanticRanker::new(dense, Arc::new(embedder)).await?;

    let assistant = Assistant::new(Arc::new(corpus), Arc::new(generator))
        .with_classifier(classifier)
        .with_config(hybrid)
        .with_ranker(Arc::new(lexical))
        .with_ranker(Arc::new(semantic));
    let config = assistant.config();
    tracing::info!(
        rrf_k = config.rrf_k,
        top_k = config.top_k,
        per_retriever_k = config.per_retriever_k,
        "Assistant ready"
    );
    Ok(assistant)
}
