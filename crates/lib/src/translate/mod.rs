//! Text translation: the [`Translator`] capability and the per-conversation [`LanguageContext`].
//!
//! Every human-readable field goes through [`LanguageContext::translate`], which skips the
//! external call entirely when the customer's language is unset or matches the bot's.

mod aws;

pub use aws::AwsTranslateClient;

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("translate request failed: {0}")]
    Request(String),
    #[error("translate api error: {0}")]
    Api(String),
    #[error("translate client config: {0}")]
    Config(String),
}

/// One translation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslateRequest<'a> {
    pub source: &'a str,
    pub target: &'a str,
    pub terminology: Option<&'a str>,
    pub text: &'a str,
}

/// External translation capability. One instance is shared for the process lifetime.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate_text(&self, request: &TranslateRequest<'_>) -> Result<String, TranslateError>;
}

/// Source/target languages for one conversation plus the optional terminology set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageContext {
    pub source: String,
    pub target: String,
    pub terminology: Option<String>,
}

impl LanguageContext {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        terminology: Option<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into().trim().to_string(),
            terminology,
        }
    }

    /// True when translation is a pass-through (target unset or same as source).
    pub fn is_identity(&self) -> bool {
        self.target.is_empty() || self.target == self.source
    }

    /// Translate `text` into the target language, or return it unchanged without any external call.
    pub async fn translate(
        &self,
        translator: &dyn Translator,
        text: &str,
    ) -> Result<String, TranslateError> {
        if self.is_identity() || text.trim().is_empty() {
            return Ok(text.to_string());
        }
        let request = TranslateRequest {
            source: &self.source,
            target: &self.target,
            terminology: self.terminology.as_deref(),
            text,
        };
        translator.translate_text(&request).await
    }
}
