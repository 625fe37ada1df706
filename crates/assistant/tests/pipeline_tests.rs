use async_trait::async_trait;
use futures::StreamExt;
use juridoc_assistant::embedding::Embedder;
use juridoc_assistant::generation::{Generator, TokenStream};
use juridoc_assistant::pipeline::EventStream;
use juridoc_assistant::ranker::{Ranker, SemanticRanker};
use juridoc_assistant::{AnswerEvent, AnswerMode, AnswerOutput, Assistant, GenerationFailure, RagError};
use juridoc_core::prompt::{GENERAL_SYSTEM_PROMPT, LEGAL_SYSTEM_PROMPT};
use juridoc_core::{
    Corpus, DenseIndex, DistanceMetric, Document, HybridConfig, LexicalRanker, Metadata,
    MetadataValue, Prompt, RankedHit, Route,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const MODEL: &str = "intfloat/multilingual-e5-large";
const AXES: [&str; 4] = ["divorce", "pension", "vol", "licenciement"];

fn meta(pairs: &[(&str, &str)]) -> Metadata {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), MetadataValue::from(*v)))
        .collect()
}

fn documents() -> Vec<Document> {
    vec![
        Document::new(
            "cf-53",
            "Le divorce est prononcé par le tribunal à la demande de l'un des époux.",
            meta(&[("code", "code_de_la_famille"), ("article_number", "53")]),
        ),
        Document::new(
            "cf-84",
            "La pension alimentaire due aux enfants est fixée par le tribunal.",
            meta(&[("code_display", "Code de la Famille"), ("article_number", "84")]),
        ),
        Document::new(
            "cp-505",
            "Le vol est puni de l'emprisonnement d'un à cinq ans.",
            meta(&[("code_display", "Code Pénal"), ("article_number", "505")]),
        ),
        Document::new(
            "ct-41",
            "Le licenciement abusif ouvre droit à une indemnité pour le salarié.",
            meta(&[("code", "code_du_travail"), ("article_id", "41")]),
        ),
    ]
}

/// One axis per legal topic plus a constant bias so no vector is zero.
fn embed(text: &str) -> Vec<f32> {
    let lower = text.to_lowercase();
    let mut v: Vec<f32> = AXES
        .iter()
        .map(|axis| if lower.contains(axis) { 1.0 } else { 0.0 })
        .collect();
    v.push(0.1);
    v
}

struct KeywordEmbedder {
    model: String,
    dimension_override: Option<usize>,
}

impl KeywordEmbedder {
    fn new() -> Self {
        Self {
            model: MODEL.to_string(),
            dimension_override: None,
        }
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, RagError> {
        let mut v = embed(query);
        if let Some(dim) = self.dimension_override {
            v.resize(dim, 0.0);
        }
        Ok(v)
    }
}

#[derive(Default)]
struct ScriptedGenerator {
    chunks: Vec<String>,
    stream_error: Option<GenerationFailure>,
    failure: Option<GenerationFailure>,
    open_delay: Option<Duration>,
    prompts: Mutex<Vec<Prompt>>,
}

impl ScriptedGenerator {
    fn replying(chunks: &[&str]) -> Self {
        Self {
            chunks: chunks.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    fn failing(failure: GenerationFailure) -> Self {
        Self {
            failure: Some(failure),
            ..Default::default()
        }
    }

    fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, prompt: &Prompt) -> Result<String, GenerationFailure> {
        self.prompts.lock().unwrap().push(prompt.clone());
        match &self.failure {
            Some(f) => Err(f.clone()),
            None => Ok(self.chunks.concat()),
        }
    }

    async fn generate_stream(&self, prompt: &Prompt) -> Result<TokenStream, GenerationFailure> {
        self.prompts.lock().unwrap().push(prompt.clone());
        if let Some(delay) = self.open_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(f) = &self.failure {
            return Err(f.clone());
        }
        let mut items: Vec<Result<String, GenerationFailure>> =
            self.chunks.iter().cloned().map(Ok).collect();
        if let Some(e) = &self.stream_error {
            items.push(Err(e.clone()));
        }
        Ok(futures::stream::iter(items).boxed())
    }
}

struct CountingRanker {
    inner: Arc<dyn Ranker>,
    calls: AtomicUsize,
}

#[async_trait]
impl Ranker for CountingRanker {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<RankedHit>, RagError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.retrieve(query, top_k).await
    }
}

struct BrokenRanker;

#[async_trait]
impl Ranker for BrokenRanker {
    fn name(&self) -> &str {
        "broken"
    }

    async fn retrieve(&self, _query: &str, _top_k: usize) -> Result<Vec<RankedHit>, RagError> {
        Err(RagError::Embedding("embedder went away".into()))
    }
}

struct FixedRanker(Vec<RankedHit>);

#[async_trait]
impl Ranker for FixedRanker {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn retrieve(&self, _query: &str, top_k: usize) -> Result<Vec<RankedHit>, RagError> {
        Ok(self.0.iter().take(top_k).cloned().collect())
    }
}

fn lexical() -> LexicalRanker {
    LexicalRanker::fit(documents().into_iter().map(|d| (d.id, d.text)))
}

fn dense() -> DenseIndex {
    let mut index = DenseIndex::new(MODEL, AXES.len() + 1, DistanceMetric::Cosine).unwrap();
    for doc in documents() {
        index.add(doc.id.clone(), &embed(&doc.text)).unwrap();
    }
    index
}

async fn semantic() -> SemanticRanker {
    SemanticRanker::new(dense(), Arc::new(KeywordEmbedder::new()))
        .await
        .unwrap()
}

fn corpus() -> Arc<Corpus> {
    Arc::new(Corpus::from_documents(documents()))
}

async fn assistant(generator: Arc<ScriptedGenerator>) -> Assistant {
    Assistant::new(corpus(), generator)
        .with_ranker(Arc::new(lexical()))
        .with_ranker(Arc::new(semantic().await))
}

async fn collect(events: EventStream) -> Vec<AnswerEvent> {
    events.collect().await
}

const DIVORCE: &str = "quelles sont les conditions du divorce au maroc";

#[tokio::test]
async fn conversational_query_skips_retrieval() {
    let generator = Arc::new(ScriptedGenerator::replying(&["Bonjour ! Comment puis-je vous aider ?"]));
    let lexical = Arc::new(CountingRanker {
        inner: Arc::new(lexical()),
        calls: AtomicUsize::new(0),
    });
    let assistant = Assistant::new(corpus(), generator.clone()).with_ranker(lexical.clone());

    let answer = assistant.answer_batch("Bonjour").await;
    assert_eq!(answer.route, Route::Conversational);
    assert!(answer.articles.is_empty());
    assert_eq!(answer.response, "Bonjour ! Comment puis-je vous aider ?");
    assert_eq!(lexical.calls.load(Ordering::SeqCst), 0);

    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0].system, GENERAL_SYSTEM_PROMPT);
    assert_eq!(prompts[0].user, "Bonjour");
    assert_eq!(prompts[0].sampling.max_output_tokens, 300);
}

#[tokio::test]
async fn legal_query_is_grounded_and_cited() {
    let generator = Arc::new(ScriptedGenerator::replying(&[
        "assistant: Voici:\n- a\n- b\nFin",
    ]));
    let assistant = assistant(generator.clone()).await;

    let answer = assistant.answer_batch(DIVORCE).await;
    assert_eq!(answer.route, Route::Legal);
    assert_eq!(answer.response, "Voici:\n\n- a\n- b\n\nFin");
    assert_eq!(answer.articles.len(), 3);
    assert_eq!(answer.articles[0].article_number.as_deref(), Some("53"));
    assert_eq!(answer.articles[0].code.as_deref(), Some("Code De La Famille"));
    assert!(answer.articles[0].text.starts_with("Le divorce"));

    let prompts = generator.prompts();
    assert_eq!(prompts[0].system, LEGAL_SYSTEM_PROMPT);
    assert_eq!(prompts[0].sampling.max_output_tokens, 800);
    assert!(prompts[0]
        .user
        .starts_with(&format!("# Question: {DIVORCE}\n\n# Contexte juridique pertinent:\n[Document 1] Code De La Famille - Article 53\n")));
}

#[tokio::test]
async fn both_rankers_agree_on_top_document() {
    let assistant = assistant(Arc::new(ScriptedGenerator::replying(&["ok"]))).await;
    let lexical_hits = lexical().retrieve("licenciement abusif", 5);
    let dense_hits = Ranker::retrieve(&semantic().await, "licenciement abusif", 5)
        .await
        .unwrap();
    assert_eq!(lexical_hits[0].doc_id, "ct-41");
    assert_eq!(dense_hits[0].doc_id, "ct-41");

    let assembled = assistant.retrieve("licenciement abusif").await;
    assert_eq!(assembled.documents[0].id, "ct-41");
    assert!((assembled.documents[0].score - 2.0 / 21.0).abs() < 1e-6);
    assert!(assembled
        .context
        .starts_with("[Document 1] Code Du Travail - Article 41\n"));
}

#[tokio::test]
async fn streaming_emits_articles_tokens_complete() {
    let generator = Arc::new(ScriptedGenerator::replying(&["Réponse: Le ", "divorce ", "est judiciaire."]));
    let assistant = assistant(generator).await;

    let events = collect(assistant.answer_stream(DIVORCE).await).await;
    assert!(matches!(&events[0], AnswerEvent::Articles { articles } if articles.len() == 3));
    let tokens: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            AnswerEvent::Token { token } => Some(token.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(tokens, vec!["Réponse: Le ", "divorce ", "est judiciaire."]);
    assert_eq!(
        events.last(),
        Some(&AnswerEvent::Complete {
            response: "Le divorce est judiciaire.".into()
        })
    );
    assert_eq!(events.len(), 5);
}

#[tokio::test]
async fn answer_dispatches_on_mode() {
    let assistant = assistant(Arc::new(ScriptedGenerator::replying(&["Merci."]))).await;
    match assistant.answer("merci", AnswerMode::Batch).await {
        AnswerOutput::Complete(answer) => assert_eq!(answer.response, "Merci."),
        AnswerOutput::Stream(_) => panic!("expected a complete answer"),
    }
    match assistant.answer("merci", AnswerMode::Stream).await {
        AnswerOutput::Stream(events) => {
            let events = collect(events).await;
            assert_eq!(events[0], AnswerEvent::Articles { articles: vec![] });
            assert_eq!(events.len(), 3);
        }
        AnswerOutput::Complete(_) => panic!("expected a stream"),
    }
}

#[tokio::test]
async fn generation_failure_returns_fallback_with_citations() {
    let failure = GenerationFailure::Http {
        status: 503,
        body: "overloaded".into(),
    };
    let assistant = assistant(Arc::new(ScriptedGenerator::failing(failure.clone()))).await;

    let answer = assistant.answer_batch(DIVORCE).await;
    assert_eq!(answer.response, failure.fallback_message());
    assert_eq!(answer.articles.len(), 3);

    let events = collect(assistant.answer_stream(DIVORCE).await).await;
    assert_eq!(events.len(), 2);
    assert!(matches!(&events[0], AnswerEvent::Articles { articles } if articles.len() == 3));
    assert_eq!(
        events[1],
        AnswerEvent::Complete {
            response: failure.fallback_message()
        }
    );
}

#[tokio::test]
async fn articles_are_emitted_before_generator_opens() {
    let failure = GenerationFailure::Timeout("deadline".into());
    let generator = Arc::new(ScriptedGenerator {
        failure: Some(failure.clone()),
        open_delay: Some(Duration::from_millis(1500)),
        ..Default::default()
    });
    let assistant = assistant(generator.clone()).await;

    let start = Instant::now();
    let mut events = assistant.answer_stream(DIVORCE).await;
    let first = events.next().await;
    assert!(
        start.elapsed() < Duration::from_millis(750),
        "articles took {:?}",
        start.elapsed()
    );
    assert!(matches!(first, Some(AnswerEvent::Articles { articles }) if articles.len() == 3));
    assert!(generator.prompts().is_empty());

    let rest = collect(events).await;
    assert_eq!(
        rest,
        vec![AnswerEvent::Complete {
            response: failure.fallback_message()
        }]
    );
    assert_eq!(generator.prompts().len(), 1);
}

#[tokio::test]
async fn mid_stream_failure_keeps_partial_text() {
    let generator = Arc::new(ScriptedGenerator {
        chunks: vec!["Le divorce ".into()],
        stream_error: Some(GenerationFailure::Timeout("deadline".into())),
        ..Default::default()
    });
    let assistant = assistant(generator).await;

    let events = collect(assistant.answer_stream(DIVORCE).await).await;
    match events.last() {
        Some(AnswerEvent::Complete { response }) => {
            assert!(response.starts_with("Le divorce\n\nDélai d'attente dépassé"));
        }
        other => panic!("unexpected last event {other:?}"),
    }
}

#[tokio::test]
async fn failed_ranker_degrades_to_remaining_sources() {
    let generator = Arc::new(ScriptedGenerator::replying(&["ok"]));
    let assistant = Assistant::new(corpus(), generator)
        .with_ranker(Arc::new(BrokenRanker))
        .with_ranker(Arc::new(lexical()));

    let answer = assistant.answer_batch(DIVORCE).await;
    assert_eq!(answer.response, "ok");
    assert_eq!(answer.articles[0].article_number.as_deref(), Some("53"));
}

#[tokio::test]
async fn unknown_ids_degrade_to_placeholders() {
    let generator = Arc::new(ScriptedGenerator::replying(&["ok"]));
    let assistant = Assistant::new(corpus(), generator.clone())
        .with_ranker(Arc::new(FixedRanker(vec![RankedHit::new("ghost", 9.0)])));

    let answer = assistant.answer_batch(DIVORCE).await;
    assert_eq!(answer.articles.len(), 1);
    assert_eq!(answer.articles[0].text, "");
    assert_eq!(answer.articles[0].article_number, None);
    assert!(generator.prompts()[0]
        .user
        .contains("[Document 1] Unknown Reference\n"));
}

#[tokio::test]
async fn no_hits_still_produces_grounded_prompt() {
    let generator = Arc::new(ScriptedGenerator::replying(&["Je n'ai pas assez d'informations."]));
    let assistant = Assistant::new(corpus(), generator.clone());

    let answer = assistant.answer_batch(DIVORCE).await;
    assert!(answer.articles.is_empty());
    let prompt = &generator.prompts()[0];
    assert_eq!(prompt.system, LEGAL_SYSTEM_PROMPT);
    assert!(prompt.user.contains("# Contexte juridique pertinent:\n\n\nIMPORTANT:"));
}

#[tokio::test]
async fn top_k_and_rrf_k_come_from_config() {
    let generator = Arc::new(ScriptedGenerator::replying(&["ok"]));
    let assistant = assistant(generator).await.with_config(HybridConfig {
        rrf_k: 60,
        top_k: 1,
        per_retriever_k: 10,
    });
    let assembled = assistant.retrieve(DIVORCE).await;
    assert_eq!(assembled.documents.len(), 1);
    assert!((assembled.documents[0].score - 2.0 / 61.0).abs() < 1e-6);
}

#[tokio::test]
async fn concurrent_queries_share_indexes() {
    let assistant = assistant(Arc::new(ScriptedGenerator::replying(&["ok"]))).await;
    let other = assistant.clone();
    let (a, b) = tokio::join!(
        assistant.answer_batch(DIVORCE),
        other.answer_batch("quelle peine pour un vol ?")
    );
    assert_eq!(a.articles[0].article_number.as_deref(), Some("53"));
    assert_eq!(b.articles[0].article_number.as_deref(), Some("505"));
}

#[tokio::test]
async fn semantic_ranker_rejects_model_mismatch() {
    let embedder = KeywordEmbedder {
        model: "sentence-transformers/all-MiniLM-L6-v2".into(),
        dimension_override: None,
    };
    let err = SemanticRanker::new(dense(), Arc::new(embedder)).await.unwrap_err();
    assert!(matches!(err, RagError::Configuration(_)));
}

#[tokio::test]
async fn semantic_ranker_rejects_dimension_mismatch() {
    let embedder = KeywordEmbedder {
        model: MODEL.into(),
        dimension_override: Some(1024),
    };
    let err = SemanticRanker::new(dense(), Arc::new(embedder)).await.unwrap_err();
    assert!(err.to_string().contains("dimension mismatch"));
}

#[tokio::test]
async fn snapshots_round_trip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let lexical_path = dir.path().join("lexical.idx");
    let dense_path = dir.path().join("dense.idx");
    lexical().save(&lexical_path).unwrap();
    dense().save(&dense_path).unwrap();

    let loaded = LexicalRanker::load(&lexical_path).unwrap();
    assert_eq!(loaded.retrieve(DIVORCE, 5), lexical().retrieve(DIVORCE, 5));

    let semantic = SemanticRanker::new(
        DenseIndex::load(&dense_path).unwrap(),
        Arc::new(KeywordEmbedder::new()),
    )
    .await
    .unwrap();
    let hits = Ranker::retrieve(&semantic, "pension des enfants", 2).await.unwrap();
    assert_eq!(hits[0].doc_id, "cf-84");
}
