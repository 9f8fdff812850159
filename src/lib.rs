//! HQC (Human / Quality / Content) scoring and generation engine for hotel
//! review articles.
//!
//! [`analyze`] scores an article on three weighted axes, [`weak_points`]
//! classifies the under-performing sub-categories, [`optimizer`] turns them
//! into prompt reinforcements, and [`Orchestrator`] drives a full generation
//! through pluggable collaborators.

pub mod analyzer;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod learning;
pub mod optimizer;
pub mod orchestrator;
pub mod prompt;
pub mod provider;
pub mod queue;
pub mod types;
pub mod validator;
pub mod weak_points;

pub use analyzer::{analyze, AnalysisContext, AnalysisResult, Analyzer};
pub use config::{AxisWeights, Settings, WeightPreset};
pub use error::{ErrorCode, GenerationError};
pub use optimizer::{BoostLevel, OptimizationResult, OptimizeOptions, Pattern, PromptOptimizer};
pub use orchestrator::{GenerationOutcome, GenerationRequest, Orchestrator};
pub use queue::GenerationQueue;
pub use types::{Axis, Category, GenerationOptions, HotelData, WeakPoint};
