use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use validator::Validate;

use crate::domain::types::{
    AiRecommendation, DetectionMethod, FlagSeverity, ProctoringFlagType, RiskLevel, SessionPhase,
    ViolationSeverity, ViolationType,
};

/// One check request. Created per call, never mutated.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmissionCheckInput {
    #[validate(length(min = 1))]
    pub submission_id: String,
    #[validate(length(min = 1))]
    pub student_id: String,
    #[validate(length(min = 1))]
    pub content: String,
    pub course_id: Option<String>,
    pub assignment_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarSubmission {
    pub submission_id: String,
    pub student_id: String,
    /// Pairwise similarity in [0, 1].
    pub similarity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlagiarismReport {
    pub check_id: String,
    pub submission_id: String,
    pub student_id: String,
    /// Third-party provider score in [0, 100]; absent when the provider had
    /// no external corpus coverage for this submission.
    pub external_similarity_score: Option<f64>,
    /// Internal-corpus similarity in [0, 1].
    pub internal_similarity_score: f64,
    pub similar_submissions: Vec<SimilarSubmission>,
    pub overall_risk_level: RiskLevel,
    pub flagged: bool,
    pub flag_reasons: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub checked_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlaggedSection {
    pub text: String,
    pub start_index: usize,
    pub end_index: usize,
    pub ai_probability: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiContentResult {
    /// Probability the submission is generated text, in [0, 1].
    pub ai_probability: f64,
    pub confidence: f64,
    pub flagged_sections: Vec<FlaggedSection>,
    pub recommendation: AiRecommendation,
}

/// A student's historical writing-style fingerprint. The payload shape is
/// owned by the detector service; the engine only carries it between the
/// baseline lookup and the style comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WritingStyle {
    pub student_id: String,
    pub fingerprint: serde_json::Value,
    pub sample_count: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleDeviationResult {
    /// Non-negative drift measure against the baseline; larger is further
    /// from the student's established style.
    pub deviation_score: f64,
    pub flagged: bool,
    pub significant_deviations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrityChecks {
    pub plagiarism: PlagiarismReport,
    pub ai_content: AiContentResult,
    pub style_deviation: Option<StyleDeviationResult>,
}

/// Terminal artifact of a single-submission check. Never mutated after
/// creation, only referenced by downstream case creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrityCheckResult {
    pub submission_id: String,
    pub student_id: String,
    pub overall_risk_level: RiskLevel,
    /// Composite trustworthiness in [0, 100]; higher is cleaner.
    pub integrity_score: f64,
    pub flagged: bool,
    pub checks: IntegrityChecks,
    pub recommendations: Vec<String>,
    pub requires_human_review: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub checked_at: OffsetDateTime,
}

/// One member of a cohort handed to collusion detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortSubmission {
    pub submission_id: String,
    pub student_id: String,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollusionPair {
    pub submission1_id: String,
    pub submission2_id: String,
    pub student1_id: String,
    pub student2_id: String,
    pub similarity_score: f64,
    pub structural_similarity: f64,
    pub timing_proximity_minutes: i64,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuspiciousGroup {
    pub submission_ids: Vec<String>,
    pub student_ids: Vec<String>,
    pub average_similarity: f64,
    pub submission_time_span_minutes: i64,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollusionReport {
    pub assignment_id: String,
    pub course_id: String,
    pub collusion_pairs: Vec<CollusionPair>,
    pub suspicious_groups: Vec<SuspiciousGroup>,
    pub overall_risk: RiskLevel,
}

/// Append-only behavioral observation attached to a live session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProctoringFlag {
    pub id: String,
    pub session_id: String,
    pub flag_type: ProctoringFlagType,
    pub severity: FlagSeverity,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub ai_confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProctoringSession {
    pub id: String,
    pub student_id: String,
    pub exam_id: String,
    pub phase: SessionPhase,
    pub id_verified: bool,
    pub environment_verified: bool,
    pub flags: Vec<ProctoringFlag>,
    pub flag_count: u32,
    pub integrity_score: f64,
    pub risk_level: RiskLevel,
    pub requires_review: bool,
    pub recommendations: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub ended_at: Option<OffsetDateTime>,
    pub duration_minutes: Option<i64>,
}

/// Evidence payload for a violation case. A tagged union so reviewer tooling
/// can pattern-match exhaustively instead of poking at an untyped map; the
/// submission variants embed both detection results verbatim so a reviewer
/// never re-runs detection to see why the case was opened.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CaseEvidence {
    Plagiarism { plagiarism: PlagiarismReport, ai_content: AiContentResult },
    AiMisuse { plagiarism: PlagiarismReport, ai_content: AiContentResult },
    Collusion { pair: CollusionPair },
}

/// What the engine asks the case store to persist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateViolationRequest {
    pub student_id: String,
    pub violation_type: ViolationType,
    pub severity: ViolationSeverity,
    pub course_id: Option<String>,
    pub assignment_id: Option<String>,
    pub description: String,
    pub evidence: CaseEvidence,
    pub detection_method: DetectionMethod,
    pub reported_by: String,
}

/// Durable record returned by the case store. Created exactly once per
/// triggering check; human review mutates status elsewhere, out of scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolationCase {
    pub id: String,
    pub student_id: String,
    pub violation_type: ViolationType,
    pub severity: ViolationSeverity,
    pub course_id: Option<String>,
    pub assignment_id: Option<String>,
    pub description: String,
    pub evidence: CaseEvidence,
    pub detection_method: DetectionMethod,
    pub reported_by: String,
    #[serde(with = "time::serde::rfc3339")]
    pub reported_at: OffsetDateTime,
}
