pub mod models;
pub mod types;

pub use models::{
    AiContentResult, CaseEvidence, CohortSubmission, CollusionPair, CollusionReport,
    CreateViolationRequest, FlaggedSection, IntegrityCheckResult, IntegrityChecks,
    PlagiarismReport, ProctoringFlag, ProctoringSession, SimilarSubmission, StyleDeviationResult,
    SubmissionCheckInput, SuspiciousGroup, ViolationCase, WritingStyle,
};
pub use types::{
    AiRecommendation, DetectionMethod, FlagSeverity, ProctoringFlagType, RiskLevel, SessionPhase,
    ViolationSeverity, ViolationType,
};
