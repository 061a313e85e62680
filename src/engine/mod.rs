pub mod aggregator;
pub mod case_trigger;
pub mod collusion;
pub mod orchestrator;
pub mod proctoring;

pub use aggregator::{RiskAssessment, RiskWeights};
pub use collusion::{CollusionDetector, CollusionPolicy};
pub use orchestrator::{EngineProviders, IntegrityEngine};
pub use proctoring::{ProctoringAnalyzer, ProctoringPolicy};
