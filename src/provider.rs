//! AI provider seam and model-name routing.
//!
//! HTTP drivers live outside this crate. The orchestrator only sees the
//! [`AiProvider`] trait and resolves a driver through [`ProviderRegistry`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiRequest {
    pub prompt: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Upper bound the driver must enforce on the whole call.
    pub timeout: Duration,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiResponse {
    pub text: String,
    /// Provider payload as received, kept for debugging.
    #[serde(default)]
    pub raw: serde_json::Value,
    #[serde(default)]
    pub usage: TokenUsage,
    pub model: String,
}

/// A blocking text-generation backend.
pub trait AiProvider: Send + Sync {
    fn generate(&self, request: &AiRequest) -> Result<AiResponse, ProviderError>;
}

impl<T: AiProvider + ?Sized> AiProvider for Arc<T> {
    fn generate(&self, request: &AiRequest) -> Result<AiResponse, ProviderError> {
        (**self).generate(request)
    }
}

impl<T: AiProvider + ?Sized> AiProvider for Box<T> {
    fn generate(&self, request: &AiRequest) -> Result<AiResponse, ProviderError> {
        (**self).generate(request)
    }
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFamily {
    OpenAiResponses,
    Claude,
    Gemini,
    LegacyChat,
    Unsupported,
}

impl ModelFamily {
    /// Prefix rules: `gpt-*`, `o1`/`o1-*` and `o3`/`o3-*` go to the Responses driver,
    /// `claude-*` and `gemini-*` to their own drivers. Anything else is legacy
    /// chat when allowed, unsupported otherwise.
    pub fn resolve(model: &str, allow_legacy: bool) -> Self {
        let name = model.trim().to_ascii_lowercase();
        if name.is_empty() {
            return ModelFamily::Unsupported;
        }
        let reasoning = ["o1", "o3"]
            .iter()
            .any(|p| name.strip_prefix(p).is_some_and(|rest| rest.is_empty() || rest.starts_with('-')));
        if name.starts_with("gpt-") || reasoning {
            ModelFamily::OpenAiResponses
        } else if name.starts_with("claude-") {
            ModelFamily::Claude
        } else if name.starts_with("gemini-") {
            ModelFamily::Gemini
        } else if allow_legacy {
            ModelFamily::LegacyChat
        } else {
            ModelFamily::Unsupported
        }
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ModelFamily::OpenAiResponses => "openai_responses",
            ModelFamily::Claude => "claude",
            ModelFamily::Gemini => "gemini",
            ModelFamily::LegacyChat => "legacy_chat",
            ModelFamily::Unsupported => "unsupported",
        };
        f.write_str(s)
    }
}

type DriverFactory = Box<dyn Fn(&str) -> Box<dyn AiProvider> + Send + Sync>;

/// Driver constructors keyed by model family, filled once at startup.
#[derive(Default)]
pub struct ProviderRegistry {
    factories: HashMap<ModelFamily, DriverFactory>,
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut families: Vec<String> = self.factories.keys().map(|k| k.to_string()).collect();
        families.sort();
        f.debug_struct("ProviderRegistry")
            .field("families", &families)
            .finish()
    }
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the constructor for a family; it receives the model name.
    /// Registering `Unsupported` is ignored.
    pub fn register<F>(mut self, family: ModelFamily, factory: F) -> Self
    where
        F: Fn(&str) -> Box<dyn AiProvider> + Send + Sync + 'static,
    {
        if family != ModelFamily::Unsupported {
            self.factories.insert(family, Box::new(factory));
        }
        self
    }

    pub fn families(&self) -> impl Iterator<Item = ModelFamily> + '_ {
        self.factories.keys().copied()
    }

    /// Constructs the driver for `model`. `allow_legacy` comes from the
    /// settings snapshot of the request being served.
    pub fn resolve(&self, model: &str, allow_legacy: bool) -> Result<Box<dyn AiProvider>, ProviderError> {
        let family = ModelFamily::resolve(model, allow_legacy);
        self.factories
            .get(&family)
            .map(|factory| factory(model))
            .ok_or_else(|| ProviderError::UnsupportedModel(model.to_string()))
    }
}
