//! The orchestrator.
//!
//! Routes each query, runs every ranker concurrently for legal questions,
//! fuses their rankings with RRF, assembles the grounded prompt and hands it
//! to the generator. Generation failures become fallback answers.

use crate::error::GenerationFailure;
use crate::generation::{Generator, TokenStream};
use crate::metrics;
use crate::ranker::Ranker;
use futures::future::join_all;
use futures::stream::BoxStream;
use futures::StreamExt;
use juridoc_core::context::{self, AssembledContext};
use juridoc_core::response::format_response;
use juridoc_core::{
    rrf_fuse, ArticleCitation, CorpusStore, HybridConfig, Prompt, QueryClassifier, Route,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Batch returns one [`Answer`]; stream returns [`AnswerEvent`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AnswerMode {
    #[default]
    Batch,
    Stream,
}

/// A finished answer with the citations it was grounded on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub route: Route,
    pub response: String,
    pub articles: Vec<ArticleCitation>,
}

/// One step of a streamed answer: `articles`, then `token`*, then `complete`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnswerEvent {
    Articles { articles: Vec<ArticleCitation> },
    Token { token: String },
    Complete { response: String },
}

pub type EventStream = BoxStream<'static, AnswerEvent>;

pub enum AnswerOutput {
    Complete(Answer),
    Stream(EventStream),
}

struct Prepared {
    route: Route,
    prompt: Prompt,
    articles: Vec<ArticleCitation>,
}

/// Cheap to clone; clones share the loaded indexes, corpus and clients.
#[derive(Clone)]
pub struct Assistant {
    classifier: Arc<QueryClassifier>,
    rankers: Vec<Arc<dyn Ranker>>,
    corpus: Arc<dyn CorpusStore>,
    generator: Arc<dyn Generator>,
    config: HybridConfig,
}

impl Assistant {
    /// An assistant with the default routing lists, default fusion settings
    /// and no rankers yet.
    pub fn new(corpus: Arc<dyn CorpusStore>, generator: Arc<dyn Generator>) -> Self {
        Self {
            classifier: Arc::new(QueryClassifier::default()),
            rankers: Vec::new(),
            corpus,
            generator,
            config: HybridConfig::default(),
        }
    }

    /// Adds a ranking source. Ranker order fixes the fusion tie-break.
    pub fn with_ranker(mut self, ranker: Arc<dyn Ranker>) -> Self {
        self.rankers.push(ranker);
        self
    }

    pub fn with_classifier(mut self, classifier: QueryClassifier) -> Self {
        self.classifier = Arc::new(classifier);
        self
    }

    pub fn with_config(mut self, config: HybridConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &HybridConfig {
        &self.config
    }

    /// Hybrid retrieval: all rankers in parallel, RRF, then context assembly.
    ///
    /// A failing ranker contributes nothing to this request.
    pub async fn retrieve(&self, query: &str) -> AssembledContext {
        let start = Instant::now();
        let per_ranker = self.config.per_retriever_k;

        let rankings = join_all(self.rankers.iter().map(|ranker| async move {
            match ranker.retrieve(query, per_ranker).await {
                Ok(hits) => {
                    metrics::record_ranker_hits(ranker.name(), hits.len());
                    hits
                }
                Err(e) => {
                    tracing::warn!(ranker = ranker.name(), error = %e, "Ranker failed, continuing without it");
                    metrics::record_ranker_failure(ranker.name());
                    Vec::new()
                }
            }
        }))
        .await;

        let fused = rrf_fuse(&rankings, self.config.rrf_k, self.config.top_k);
        let assembled = context::assemble(&fused, self.corpus.as_ref());
        metrics::record_corpus_misses(assembled.misses);
        metrics::record_retrieval(start.elapsed());
        tracing::debug!(
            rankers = self.rankers.len(),
            fused = fused.len(),
            misses = assembled.misses,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Retrieved context"
        );
        assembled
    }

    async fn prepare(&self, query: &str) -> Prepared {
        let route = self.classifier.route(query);
        metrics::record_query(route);
        tracing::debug!(route = route.as_str(), "Routed query");
        match route {
            Route::Conversational => Prepared {
                route,
                prompt: Prompt::conversational(query),
                articles: Vec::new(),
            },
            Route::Legal => {
                let assembled = self.retrieve(query).await;
                Prepared {
                    route,
                    prompt: Prompt::legal(query, &assembled.context),
                    articles: context::citations(&assembled.documents),
                }
            }
        }
    }

    /// Answers `query` in the requested mode.
    pub async fn answer(&self, query: &str, mode: AnswerMode) -> AnswerOutput {
        match mode {
            AnswerMode::Batch => AnswerOutput::Complete(self.answer_batch(query).await),
            AnswerMode::Stream => AnswerOutput::Stream(self.answer_stream(query).await),
        }
    }

    pub async fn answer_batch(&self, query: &str) -> Answer {
        let prepared = self.prepare(query).await;
        let start = Instant::now();
        let response = match self.generator.generate(&prepared.prompt).await {
            Ok(raw) => format_response(&raw),
            Err(failure) => {
                report_failure(&failure);
                failure.fallback_message()
            }
        };
        metrics::record_generation("batch", start.elapsed());
        Answer {
            route: prepared.route,
            response,
            articles: prepared.articles,
        }
    }

    /// Streams the answer. Citations are emitted as soon as retrieval is
    /// done; the generator stream is opened only after they are yielded.
    pub async fn answer_stream(&self, query: &str) -> EventStream {
        let prepared = self.prepare(query).await;
        let state = StreamState {
            articles: Some(prepared.articles),
            pending: Some((Arc::clone(&self.generator), prepared.prompt)),
            tokens: None,
            collected: String::new(),
            failure: None,
            start: Instant::now(),
            done: false,
        };
        futures::stream::unfold(state, |mut st| async move {
            if let Some(articles) = st.articles.take() {
                return Some((AnswerEvent::Articles { articles }, st));
            }
            if st.done {
                return None;
            }
            if let Some((generator, prompt)) = st.pending.take() {
                st.start = Instant::now();
                match generator.generate_stream(&prompt).await {
                    Ok(tokens) => st.tokens = Some(tokens),
                    Err(failure) => st.failure = Some(failure),
                }
            }
            if let Some(tokens) = st.tokens.as_mut() {
                match tokens.next().await {
                    Some(Ok(token)) => {
                        st.collected.push_str(&token);
                        return Some((AnswerEvent::Token { token }, st));
                    }
                    Some(Err(failure)) => st.failure = Some(failure),
                    None => {}
                }
            }
            st.tokens = None;
            st.done = true;
            let response = st.finish();
            Some((AnswerEvent::Complete { response }, st))
        })
        .boxed()
    }
}

struct StreamState {
    articles: Option<Vec<ArticleCitation>>,
    /// Generator and prompt, until the token stream is opened.
    pending: Option<(Arc<dyn Generator>, Prompt)>,
    tokens: Option<TokenStream>,
    collected: String,
    failure: Option<GenerationFailure>,
    start: Instant,
    done: bool,
}

impl StreamState {
    /// Final answer text: the cleaned stream, with the fallback appended on failure.
    fn finish(&mut self) -> String {
        metrics::record_generation("stream", self.start.elapsed());
        let failure = match self.failure.take() {
            Some(failure) => failure,
            None if self.collected.is_empty() => GenerationFailure::EmptyResponse,
            None => return format_response(&self.collected),
        };
        report_failure(&failure);
        let fallback = failure.fallback_message();
        if self.collected.is_empty() {
            fallback
        } else {
            format!("{}\n\n{}", format_response(&self.collected), fallback)
        }
    }
}

fn report_failure(failure: &GenerationFailure) {
    tracing::error!(kind = failure.kind(), error = %failure, "Generation failed, returning fallback answer");
    metrics::record_generation_failure(failure.kind());
}
