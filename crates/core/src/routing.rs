//! Query routing: decides whether a query needs legal grounding.
//!
//! Matching is plain substring containment on the lowercased, trimmed query.
//! The conversational list is checked first and short-circuits, so a greeting
//! inside an otherwise legal sentence still routes the turn as conversational.
//! Substring matching can fire inside unrelated words ("hi" in "architecture");
//! that precision limit is part of the routing contract.

use serde::{Deserialize, Serialize};
use std::path::Path;

const CONVERSATIONAL_PHRASES: &[&str] = &[
    "bonjour",
    "hello",
    "salut",
    "hi",
    "hey",
    "comment ça va",
    "how are you",
    "merci",
    "thank you",
    "thanks",
    "au revoir",
    "goodbye",
    "bye",
    "aide",
    "help",
    "aider",
    "que peux-tu faire",
    "what can you do",
    "qui es-tu",
    "who are you",
];

const LEGAL_KEYWORDS: &[&str] = &[
    // General
    "droit",
    "loi",
    "juridique",
    "légal",
    "illégal",
    "code",
    "article",
    "texte de loi",
    "disposition",
    "texte législatif",
    // Family law
    "mariage",
    "divorce",
    "garde",
    "enfant",
    "pension",
    "naissance",
    "filiation",
    "adoption",
    "kafala",
    "polygamie",
    "mahr",
    "idda",
    "talaq",
    "khula",
    // Criminal law
    "crime",
    "délit",
    "infraction",
    "sanction",
    "peine",
    "tribunal",
    "plainte",
    "détention",
    "amende",
    "prison",
    "viol",
    "vol",
    "agression",
    "condamnation",
    "punition",
    // Civil and commercial
    "contrat",
    "bail",
    "location",
    "propriété",
    "succession",
    "héritage",
    "cession",
    "entreprise",
    "commerce",
    "registre",
    "immatriculation",
    "dépôt",
    // Labor
    "travail",
    "licenciement",
    "salaire",
    "congé",
    "indemnité",
    "employeur",
    "employé",
    // Procedure
    "procédure",
    "recours",
    "appel",
    "jugement",
    "audience",
    "justice",
    "avocat",
    "juridiction",
    "ministère public",
    // Romanized Arabic
    "moudawana",
    "talak",
    "mouda",
    "zawaj",
    "maher",
    "mirath",
    "faskh",
    "mahkama",
    "zakat",
    "nikah",
    "iddah",
    "shahada",
];

/// The two phrase lists driving [`QueryClassifier`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Greetings, thanks, farewells and meta questions. Any match means no retrieval.
    pub conversational_phrases: Vec<String>,
    /// Legal vocabulary. Any match (after the conversational check) means retrieval.
    pub legal_keywords: Vec<String>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            conversational_phrases: CONVERSATIONAL_PHRASES.iter().map(|s| s.to_string()).collect(),
            legal_keywords: LEGAL_KEYWORDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl RoutingConfig {
    /// Reads phrase lists from a JSON file. Omitted lists keep their defaults.
    pub fn load(path: &Path) -> Result<Self, String> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read routing config {:?}: {}", path, e))?;
        let config: RoutingConfig = serde_json::from_str(&raw)
            .map_err(|e| format!("invalid routing config {:?}: {}", path, e))?;
        if config.legal_keywords.iter().any(|k| k.trim().is_empty())
            || config.conversational_phrases.iter().any(|p| p.trim().is_empty())
        {
            return Err(format!("routing config {:?} contains an empty phrase", path));
        }
        Ok(config)
    }
}

/// Which path a query takes through the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    /// Answer directly with the short conversational profile.
    Conversational,
    /// Retrieve, ground and answer with the legal profile.
    Legal,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Conversational => "conversational",
            Route::Legal => "legal",
        }
    }
}

/// Cheap keyword gate in front of retrieval.
#[derive(Debug, Clone)]
pub struct QueryClassifier {
    conversational: Vec<String>,
    legal: Vec<String>,
}

impl Default for QueryClassifier {
    fn default() -> Self {
        Self::new(&RoutingConfig::default())
    }
}

impl QueryClassifier {
    pub fn new(config: &RoutingConfig) -> Self {
        Self {
            conversational: config
                .conversational_phrases
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
            legal: config.legal_keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// True when the query should be answered from retrieved legal context.
    ///
    /// Queries matching neither list default to conversational.
    pub fn needs_context(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if self.conversational.iter().any(|p| query.contains(p.as_str())) {
            return false;
        }
        self.legal.iter().any(|k| query.contains(k.as_str()))
    }

    pub fn route(&self, query: &str) -> Route {
        if self.needs_context(query) {
            Route::Legal
        } else {
            Route::Conversational
        }
    }
}
