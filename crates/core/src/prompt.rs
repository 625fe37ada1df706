//! System prompts, user content templates and sampling profiles.

use crate::config::{
    CONVERSATIONAL_MAX_TOKENS, CONVERSATIONAL_TEMPERATURE, LEGAL_MAX_TOKENS, LEGAL_TEMPERATURE,
    SAMPLING_TOP_K, SAMPLING_TOP_P,
};
use crate::routing::Route;
use serde::{Deserialize, Serialize};

/// Sentence the generator must use when the context does not support an answer.
pub const REFUSAL_SENTENCE: &str = "D'après le contexte fourni, je n'ai pas assez d'informations pour répondre complètement à cette question";

/// System prompt for grounded legal turns.
pub const LEGAL_SYSTEM_PROMPT: &str = concat!(
    "Vous êtes LegalAssistant, un conseiller juridique professionnel spécialisé en droit marocain.\n\n",
    "IMPORTANT: Vous devez UNIQUEMENT utiliser le contexte juridique fourni dans cette conversation. ",
    "N'utilisez aucune connaissance externe.\n\n",
    "Lors de la réponse aux questions:\n",
    "- Basez vos réponses EXCLUSIVEMENT sur le contexte juridique fourni\n",
    "- Si le contexte ne contient pas d'informations pertinentes, indiquez clairement ",
    "'D'après le contexte fourni, je n'ai pas assez d'informations pour répondre complètement à cette question'\n",
    "- Ne faites jamais d'hypothèses ou n'utilisez pas de connaissances en dehors du contexte fourni\n",
    "- Citez les articles spécifiques mentionnés dans le contexte par nom de code et numéro d'article\n",
    "- Soyez concis et direct, en évitant les élaborations inutiles\n",
    "- Utilisez un langage clair que les non-juristes peuvent comprendre\n",
    "- Structurez les réponses complexes avec des points numérotés pour plus de clarté\n",
    "- Maintenez un ton professionnel et serviable tout au long\n\n",
    "Votre objectif est de fournir des informations juridiques précises basées UNIQUEMENT sur le contexte fourni."
);

/// System prompt for conversational turns.
pub const GENERAL_SYSTEM_PROMPT: &str = concat!(
    "Vous êtes LegalAssistant, un conseiller juridique professionnel spécialisé en droit marocain. ",
    "Répondez de manière professionnelle et concise."
);

const GROUNDING_REMINDER: &str = concat!(
    "IMPORTANT: Répondez UNIQUEMENT en utilisant le contexte juridique fourni ci-dessus. ",
    "N'utilisez aucune autre connaissance. Si le contexte ne contient pas d'informations pertinentes, ",
    "indiquez que vous n'avez pas assez d'informations pour répondre complètement."
);

/// Decoding parameters passed to the generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl SamplingConfig {
    /// Short budget for non-grounded turns.
    pub const fn conversational() -> Self {
        Self {
            temperature: CONVERSATIONAL_TEMPERATURE,
            top_p: SAMPLING_TOP_P,
            top_k: SAMPLING_TOP_K,
            max_output_tokens: CONVERSATIONAL_MAX_TOKENS,
        }
    }

    /// Larger budget for grounded legal turns.
    pub const fn legal() -> Self {
        Self {
            temperature: LEGAL_TEMPERATURE,
            top_p: SAMPLING_TOP_P,
            top_k: SAMPLING_TOP_K,
            max_output_tokens: LEGAL_MAX_TOKENS,
        }
    }

    pub const fn for_route(route: Route) -> Self {
        match route {
            Route::Conversational => Self::conversational(),
            Route::Legal => Self::legal(),
        }
    }
}

/// A complete generator input: system prompt, user turn and sampling.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
    pub sampling: SamplingConfig,
}

impl Prompt {
    /// Conversational turn: the raw query under the general system prompt.
    pub fn conversational(query: &str) -> Self {
        Self {
            system: GENERAL_SYSTEM_PROMPT.to_string(),
            user: query.to_string(),
            sampling: SamplingConfig::conversational(),
        }
    }

    /// Grounded turn: question plus formatted context under the legal system prompt.
    pub fn legal(query: &str, context: &str) -> Self {
        Self {
            system: LEGAL_SYSTEM_PROMPT.to_string(),
            user: legal_user_content(query, context),
            sampling: SamplingConfig::legal(),
        }
    }
}

/// User turn for grounded answers.
pub fn legal_user_content(query: &str, context: &str) -> String {
    format!(
        "# Question: {query}\n\n# Contexte juridique pertinent:\n{context}\n\n{GROUNDING_REMINDER}"
    )
}
