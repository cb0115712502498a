/*
[INPUT]:  Public API exports for edutask-runner crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod config;
pub mod consumer;
pub mod curriculum;
pub mod debate;
pub mod engagement;
pub mod error;
pub mod flow;
pub mod quiz;
pub mod store;

// Re-export main types for convenience
pub use config::RunnerConfig;
pub use consumer::{StateError, TaskView, ViewEvent, ViewPhase};
pub use curriculum::CurriculumService;
pub use debate::{DebateOutcome, DebateService, DebateTurn};
pub use engagement::EngagementService;
pub use error::{ServiceError, ServiceResult, StoreError};
pub use flow::TaskFlow;
pub use quiz::{NewQuestion, NewQuiz, QuizService};
pub use store::{JsonFileStore, MemoryStore, Store};
