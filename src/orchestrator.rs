//! Article generation pipeline.
//!
//! `collecting_data -> building_prompt -> optimizing_prompt -> calling_ai ->
//! validating_content -> persisting -> done`, with `failed` reachable from any
//! step. Every failure leaves the pipeline as a [`GenerationOutcome::Failure`]
//! carrying a stable [`ErrorCode`]; nothing is thrown across the boundary.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::analyzer::{AnalysisContext, AnalysisResult, Analyzer};
use crate::collaborators::{
    ArticleStore, ContentValidator, DataCollector, PostDraft, PostId, PostSaveHook, PromptEngine,
    ValidationContext, AXIS_META_KEYS, META_C_SCORE, META_HOTEL_NAME, META_H_SCORE,
    META_HQC_SCORE, META_LOCATION, META_Q_SCORE,
};
use crate::config::Settings;
use crate::error::{ConfigError, ErrorCode, GenerationError};
use crate::learning::LearningModule;
use crate::optimizer::{OptimizeOptions, Pattern, PromptOptimizer};
use crate::prompt::TemplatePromptEngine;
use crate::provider::{AiProvider, AiRequest, ProviderRegistry};
use crate::types::GenerationOptions;

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationState {
    CollectingData,
    BuildingPrompt,
    OptimizingPrompt,
    CallingAi,
    ValidatingContent,
    Persisting,
    Done,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub hotel_name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub options: GenerationOptions,
}

impl GenerationRequest {
    pub fn new(hotel_name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            hotel_name: hotel_name.into(),
            location: location.into(),
            options: GenerationOptions::default(),
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedArticle {
    pub success: bool,
    pub post_id: PostId,
    /// Post-generation total score on 0..=100.
    pub hqc_score: f64,
    pub article: String,
    pub analysis: AnalysisResult,
    pub patterns_applied: Vec<Pattern>,
    /// Number of AI calls made, regenerations included.
    pub attempts: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationFailure {
    pub success: bool,
    pub error_code: ErrorCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Step that was running when the pipeline failed. Pre-checks, the
    /// source-data gate and model resolution all run under `collecting_data`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<GenerationState>,
}

/// Serializes as `{"success": true, ...}` or `{"success": false, "error_code": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GenerationOutcome {
    Success(GeneratedArticle),
    Failure(GenerationFailure),
}

impl GenerationOutcome {
    fn failure(error_code: ErrorCode, message: impl Into<String>, stage: Option<GenerationState>) -> Self {
        GenerationOutcome::Failure(GenerationFailure {
            success: false,
            error_code,
            message: Some(message.into()),
            stage,
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, GenerationOutcome::Success(_))
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            GenerationOutcome::Success(_) => None,
            GenerationOutcome::Failure(f) => Some(f.error_code),
        }
    }

    pub fn post_id(&self) -> Option<PostId> {
        match self {
            GenerationOutcome::Success(a) => Some(a.post_id),
            GenerationOutcome::Failure(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Wires collaborators once at startup.
pub struct OrchestratorBuilder {
    settings: Settings,
    collector: Option<Arc<dyn DataCollector>>,
    store: Option<Arc<dyn ArticleStore>>,
    prompt_engine: Arc<dyn PromptEngine>,
    validator: Option<Arc<dyn ContentValidator>>,
    providers: ProviderRegistry,
    hooks: Vec<Arc<dyn PostSaveHook>>,
}

impl OrchestratorBuilder {
    pub fn collector(mut self, collector: Arc<dyn DataCollector>) -> Self {
        self.collector = Some(collector);
        self
    }

    pub fn store(mut self, store: Arc<dyn ArticleStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn prompt_engine(mut self, engine: Arc<dyn PromptEngine>) -> Self {
        self.prompt_engine = engine;
        self
    }

    pub fn validator(mut self, validator: Arc<dyn ContentValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn providers(mut self, providers: ProviderRegistry) -> Self {
        self.providers = providers;
        self
    }

    pub fn hook(mut self, hook: Arc<dyn PostSaveHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn build(self) -> Result<Orchestrator, ConfigError> {
        self.settings.validate()?;
        let collector = self
            .collector
            .ok_or_else(|| ConfigError::Invalid("a data collector is required".to_string()))?;
        let store = self
            .store
            .ok_or_else(|| ConfigError::Invalid("an article store is required".to_string()))?;
        let learning = LearningModule::new(self.settings.learning_window);
        Ok(Orchestrator {
            settings: self.settings,
            optimizer: PromptOptimizer::new(),
            collector,
            store,
            prompt_engine: self.prompt_engine,
            validator: self.validator,
            providers: self.providers,
            hooks: self.hooks,
            learning: Mutex::new(learning),
            in_progress: AtomicBool::new(false),
        })
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

pub struct Orchestrator {
    settings: Settings,
    optimizer: PromptOptimizer,
    collector: Arc<dyn DataCollector>,
    store: Arc<dyn ArticleStore>,
    prompt_engine: Arc<dyn PromptEngine>,
    validator: Option<Arc<dyn ContentValidator>>,
    providers: ProviderRegistry,
    hooks: Vec<Arc<dyn PostSaveHook>>,
    learning: Mutex<LearningModule>,
    in_progress: AtomicBool,
}

/// Clears the in-flight flag on drop, panics included.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn enter(stage: &mut GenerationState, next: GenerationState) {
    debug!(from = ?*stage, to = ?next, "Generation state");
    *stage = next;
}

impl Orchestrator {
    pub fn builder(settings: Settings) -> OrchestratorBuilder {
        OrchestratorBuilder {
            settings,
            collector: None,
            store: None,
            prompt_engine: Arc::new(TemplatePromptEngine),
            validator: None,
            providers: ProviderRegistry::new(),
            hooks: Vec::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_generating(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Copy of the learning history, `None` if its lock is poisoned.
    pub fn learning(&self) -> Option<LearningModule> {
        self.learning.lock().ok().map(|l| l.clone())
    }

    pub fn generate_article(&self, request: &GenerationRequest) -> GenerationOutcome {
        self.generate_with_settings(request, &self.settings)
    }

    /// Runs the pipeline against a settings snapshot (queued jobs carry their
    /// own). A call made while another generation is in flight on this
    /// instance does nothing and reports `already_running`.
    pub fn generate_with_settings(&self, request: &GenerationRequest, settings: &Settings) -> GenerationOutcome {
        let Some(_guard) = self.try_begin() else {
            warn!(hotel = %request.hotel_name, "Generation already in progress, ignoring nested request");
            return GenerationOutcome::failure(
                ErrorCode::AlreadyRunning,
                GenerationError::AlreadyRunning.to_string(),
                None,
            );
        };

        info!(hotel = %request.hotel_name, location = %request.location, "Starting article generation");
        let mut stage = GenerationState::CollectingData;
        let run = panic::catch_unwind(AssertUnwindSafe(|| self.run(request, settings, &mut stage)));

        match run {
            Ok(Ok(article)) => {
                info!(
                    hotel = %request.hotel_name,
                    post_id = article.post_id,
                    hqc_score = article.hqc_score,
                    attempts = article.attempts,
                    "Article generated"
                );
                GenerationOutcome::Success(article)
            }
            Ok(Err(err)) => {
                warn!(hotel = %request.hotel_name, stage = ?stage, code = %err.code(), error = %err, "Article generation failed");
                GenerationOutcome::failure(err.code(), err.to_string(), Some(stage))
            }
            Err(payload) => {
                error!(
                    hotel = %request.hotel_name,
                    stage = ?stage,
                    panic = %panic_message(payload.as_ref()),
                    "Article generation panicked"
                );
                GenerationOutcome::failure(
                    ErrorCode::Exception,
                    "internal error during article generation",
                    Some(stage),
                )
            }
        }
    }

    fn try_begin(&self) -> Option<InFlight<'_>> {
        self.in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(&self.in_progress))
    }

    fn run(
        &self,
        request: &GenerationRequest,
        settings: &Settings,
        stage: &mut GenerationState,
    ) -> Result<GeneratedArticle, GenerationError> {
        let hotel_name = request.hotel_name.trim();
        let location = request.location.trim();
        let options = &request.options;

        // 1. Pre-checks and data collection
        if hotel_name.is_empty() {
            return Err(GenerationError::Generation("hotel name is empty".to_string()));
        }
        if settings.require_location && location.is_empty() {
            return Err(GenerationError::LocationRequired);
        }
        if !options.allow_duplicate {
            if let Some(post_id) = self.store.find_post_by_hotel(hotel_name) {
                return Err(GenerationError::DuplicateFound {
                    hotel: hotel_name.to_string(),
                    post_id,
                });
            }
        }
        let hotel = self
            .collector
            .collect_hotel_data(hotel_name, location)
            .ok_or_else(|| GenerationError::CollectionFailed(hotel_name.to_string()))?;

        // 2. Source-data gate, before any provider work
        if settings.hqc_enabled && !options.skip_hqc_check {
            match hotel.hqc_score {
                Some(score) if !score.is_finite() => {
                    warn!(hotel = %hotel_name, score, "Source data score is not finite, treating as unscored");
                }
                Some(score) => {
                    if !(0.0..=1.0).contains(&score) {
                        warn!(hotel = %hotel_name, score, "Source data score outside 0..=1");
                    }
                    let threshold = settings.hqc_threshold_fraction();
                    if score < threshold {
                        return Err(GenerationError::LowHqcScore { score, threshold });
                    }
                }
                None => {}
            }
        }

        // 3. Driver resolution fails fast on unknown models, before any prompt
        // work, so `unsupported_model` reports the `collecting_data` stage.
        let model = options
            .ai_model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(settings.default_model.as_str())
            .to_string();
        let provider = self.providers.resolve(&model, settings.allow_legacy_models)?;

        enter(stage, GenerationState::BuildingPrompt);
        let base_prompt = self.prompt_engine.build_prompt(&hotel, options);

        enter(stage, GenerationState::OptimizingPrompt);
        let (prompt, patterns_applied) = self.optimize_prompt(&base_prompt, hotel_name, options, settings);

        enter(stage, GenerationState::CallingAi);
        let mut ai_request = AiRequest {
            prompt,
            model,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            timeout: settings.request_timeout(),
        };
        let mut article = call_ai(&*provider, &ai_request)?;
        let mut attempts = 1u32;

        enter(stage, GenerationState::ValidatingContent);
        if let Some(validator) = &self.validator {
            let ctx = ValidationContext {
                hotel_name: hotel_name.to_string(),
                min_length: options.depth.target_chars() / 2,
            };
            for attempt in 1..=settings.max_regeneration_attempts {
                let verdict = validator.validate(&article, &ctx);
                if !verdict.requires_regeneration() {
                    break;
                }
                debug!(attempt, issues = ?verdict.issues, "Content requires regeneration");
                ai_request.prompt = format!("{}\n\n{}", ai_request.prompt, verdict.improvement_prompt());
                attempts += 1;
                match call_ai(&*provider, &ai_request) {
                    Ok(text) => article = text,
                    Err(err) => {
                        warn!(attempt, error = %err, "Regeneration failed, keeping previous draft");
                        break;
                    }
                }
            }
        }

        let analyzer = Analyzer::from_settings(settings);
        let analysis_ctx = AnalysisContext::for_hotel(hotel_name);
        let analysis = analyzer.analyze(&article, &analysis_ctx);

        enter(stage, GenerationState::Persisting);
        let post_id = self.store.insert_post(&PostDraft {
            title: format!("{hotel_name} stay review"),
            content: article.clone(),
            status: options.post_status.unwrap_or(settings.default_post_status),
        })?;
        // Identity keys first: the duplicate check depends on them.
        self.store.set_meta(post_id, META_HOTEL_NAME, json!(hotel_name))?;
        self.store.set_meta(post_id, META_LOCATION, json!(location))?;
        self.write_scores(post_id, &analysis);

        for hook in &self.hooks {
            hook.after_save(post_id, self);
        }

        let analysis = self
            .repair_scores(post_id, &analyzer, &analysis_ctx)
            .unwrap_or(analysis);

        if settings.learning_enabled {
            match self.learning.lock() {
                Ok(mut learning) => learning.record(hotel_name, &analysis),
                Err(_) => warn!("Learning history lock poisoned, skipping record"),
            }
        }

        enter(stage, GenerationState::Done);
        Ok(GeneratedArticle {
            success: true,
            post_id,
            hqc_score: analysis.total_score,
            article,
            analysis,
            patterns_applied,
            attempts,
        })
    }

    fn optimize_prompt(
        &self,
        base_prompt: &str,
        hotel_name: &str,
        options: &GenerationOptions,
        settings: &Settings,
    ) -> (String, Vec<Pattern>) {
        if options.is_regeneration() {
            let result = self.optimizer.optimize(
                base_prompt,
                hotel_name,
                &OptimizeOptions {
                    weak_points: options.weak_points.clone(),
                    boost_level: options.boost_level,
                    force_patterns: options.force_patterns.clone(),
                },
            );
            return (result.prompt, result.patterns_applied);
        }

        if settings.learning_enabled {
            let suggested = self
                .learning
                .lock()
                .map(|l| l.suggested_patterns())
                .unwrap_or_default();
            let result = if suggested.is_empty() {
                self.optimizer.optimize_for_80(base_prompt, hotel_name)
            } else {
                self.optimizer.optimize(
                    base_prompt,
                    hotel_name,
                    &OptimizeOptions {
                        weak_points: Vec::new(),
                        boost_level: options.boost_level,
                        force_patterns: suggested,
                    },
                )
            };
            return (result.prompt, result.patterns_applied);
        }

        (base_prompt.to_string(), Vec::new())
    }

    /// Writes every score key. A failed write is logged and left for
    /// [`Self::repair_scores`] to pick up.
    fn write_scores(&self, post_id: PostId, analysis: &AnalysisResult) {
        let scores = [
            (META_HQC_SCORE, analysis.total_score),
            (META_H_SCORE, analysis.h_score),
            (META_Q_SCORE, analysis.q_score),
            (META_C_SCORE, analysis.c_score),
        ];
        for (key, value) in scores {
            if let Err(err) = self.store.set_meta(post_id, key, json!(value)) {
                warn!(post_id, key, error = %err, "Score write failed");
            }
        }
    }

    /// Re-analyzes the persisted content when any score key is missing after
    /// the save, and rewrites every score key from it.
    fn repair_scores(
        &self,
        post_id: PostId,
        analyzer: &Analyzer,
        ctx: &AnalysisContext,
    ) -> Option<AnalysisResult> {
        let missing: Vec<&str> = std::iter::once(META_HQC_SCORE)
            .chain(AXIS_META_KEYS)
            .filter(|key| self.store.get_meta(post_id, key).is_none())
            .collect();
        if missing.is_empty() {
            return None;
        }

        warn!(post_id, missing = ?missing, "Scores missing after save, re-analyzing stored content");
        let Some(content) = self.store.post_content(post_id) else {
            warn!(post_id, "Stored content not found, cannot repair scores");
            return None;
        };
        let analysis = analyzer.analyze(&content, ctx);
        self.write_scores(post_id, &analysis);
        Some(analysis)
    }
}

fn call_ai(provider: &dyn AiProvider, request: &AiRequest) -> Result<String, GenerationError> {
    let response = provider.generate(request)?;
    if response.text.trim().is_empty() {
        return Err(GenerationError::Generation(format!(
            "model {} returned no text",
            response.model
        )));
    }
    Ok(response.text)
}
