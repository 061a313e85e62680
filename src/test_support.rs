use std::collections::HashMap;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime, Time};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{
    AiContentResult, AiRecommendation, CohortSubmission, CollusionPair, CreateViolationRequest,
    IntegrityCheckResult, IntegrityChecks, PlagiarismReport, RiskLevel, StyleDeviationResult,
    SubmissionCheckInput, ViolationCase, WritingStyle,
};
use crate::engine::aggregator::{aggregate, RiskWeights};
use crate::providers::{
    CaseStore, GenerativeTextDetector, PlagiarismCheckRequest, PlagiarismMatcher,
    SimilarityAnalyzer, StyleProfiler,
};

pub(crate) fn base_time() -> OffsetDateTime {
    let date = Date::from_calendar_date(2025, time::Month::March, 10).expect("date");
    PrimitiveDateTime::new(date, Time::from_hms(9, 0, 0).expect("time")).assume_utc()
}

pub(crate) fn plagiarism_report(
    external: Option<f64>,
    internal: f64,
    risk_level: RiskLevel,
    flagged: bool,
) -> PlagiarismReport {
    PlagiarismReport {
        check_id: "check-1".to_string(),
        submission_id: "sub-1".to_string(),
        student_id: "student-1".to_string(),
        external_similarity_score: external,
        internal_similarity_score: internal,
        similar_submissions: Vec::new(),
        overall_risk_level: risk_level,
        flagged,
        flag_reasons: if flagged {
            vec!["similarity_threshold_exceeded".to_string()]
        } else {
            Vec::new()
        },
        checked_at: base_time(),
    }
}

pub(crate) fn ai_result(probability: f64, recommendation: AiRecommendation) -> AiContentResult {
    AiContentResult {
        ai_probability: probability,
        confidence: 0.9,
        flagged_sections: Vec::new(),
        recommendation,
    }
}

pub(crate) fn style_deviation(score: f64, flagged: bool) -> StyleDeviationResult {
    StyleDeviationResult {
        deviation_score: score,
        flagged,
        significant_deviations: if flagged {
            vec!["sentence_length".to_string(), "vocabulary_richness".to_string()]
        } else {
            Vec::new()
        },
    }
}

pub(crate) fn writing_style(student_id: &str) -> WritingStyle {
    WritingStyle {
        student_id: student_id.to_string(),
        fingerprint: serde_json::json!({ "avg_sentence_length": 17.2, "lexical_density": 0.48 }),
        sample_count: 4,
        updated_at: base_time(),
    }
}

/// Builds a check result consistent with the aggregator's own decision.
pub(crate) fn check_result(
    plagiarism: PlagiarismReport,
    ai_content: AiContentResult,
    style: Option<StyleDeviationResult>,
) -> IntegrityCheckResult {
    let assessment = aggregate(&plagiarism, &ai_content, style.as_ref(), &RiskWeights::default());
    IntegrityCheckResult {
        submission_id: plagiarism.submission_id.clone(),
        student_id: plagiarism.student_id.clone(),
        overall_risk_level: assessment.risk_level,
        integrity_score: assessment.integrity_score,
        flagged: assessment.flagged,
        checks: IntegrityChecks { plagiarism, ai_content, style_deviation: style },
        recommendations: assessment.recommendations,
        requires_human_review: assessment.requires_human_review,
        checked_at: base_time(),
    }
}

pub(crate) fn check_input(submission_id: &str, student_id: &str) -> SubmissionCheckInput {
    SubmissionCheckInput {
        submission_id: submission_id.to_string(),
        student_id: student_id.to_string(),
        content: "In this essay I will argue that...".to_string(),
        course_id: Some("course-1".to_string()),
        assignment_id: Some("assign-1".to_string()),
    }
}

pub(crate) fn cohort_submission(
    submission_id: &str,
    student_id: &str,
    content: &str,
    minutes_after_base: i64,
) -> CohortSubmission {
    CohortSubmission {
        submission_id: submission_id.to_string(),
        student_id: student_id.to_string(),
        content: content.to_string(),
        submitted_at: base_time() + Duration::minutes(minutes_after_base),
    }
}

pub(crate) fn collusion_pair(
    submission1_id: &str,
    submission2_id: &str,
    student1_id: &str,
    student2_id: &str,
    similarity: f64,
    timing_minutes: i64,
    risk_level: RiskLevel,
) -> CollusionPair {
    CollusionPair {
        submission1_id: submission1_id.to_string(),
        submission2_id: submission2_id.to_string(),
        student1_id: student1_id.to_string(),
        student2_id: student2_id.to_string(),
        similarity_score: similarity,
        structural_similarity: 0.0,
        timing_proximity_minutes: timing_minutes,
        risk_level,
    }
}

fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Similarity fake keyed on unordered content pairs, so scores are symmetric
/// by construction. Unscripted pairs score 0.
#[derive(Debug, Default, Clone)]
pub(crate) struct ScriptedSimilarity {
    content: HashMap<(String, String), f64>,
    structural: HashMap<(String, String), f64>,
}

impl ScriptedSimilarity {
    pub(crate) fn set_content(&mut self, a: &str, b: &str, score: f64) {
        self.content.insert(pair_key(a, b), score);
    }

    #[allow(dead_code)]
    pub(crate) fn set_structural(&mut self, a: &str, b: &str, score: f64) {
        self.structural.insert(pair_key(a, b), score);
    }
}

#[async_trait]
impl SimilarityAnalyzer for ScriptedSimilarity {
    async fn content_similarity(&self, a: &str, b: &str) -> Result<f64> {
        Ok(self.content.get(&pair_key(a, b)).copied().unwrap_or(0.0))
    }

    async fn structural_similarity(&self, a: &str, b: &str) -> Result<f64> {
        Ok(self.structural.get(&pair_key(a, b)).copied().unwrap_or(0.0))
    }
}

pub(crate) struct ScriptedPlagiarismMatcher {
    report: PlagiarismReport,
    pub(crate) fail: bool,
}

impl ScriptedPlagiarismMatcher {
    pub(crate) fn new(report: PlagiarismReport) -> Self {
        Self { report, fail: false }
    }
}

#[async_trait]
impl PlagiarismMatcher for ScriptedPlagiarismMatcher {
    async fn check(&self, request: PlagiarismCheckRequest<'_>) -> Result<PlagiarismReport> {
        if self.fail {
            return Err(anyhow!("plagiarism matcher unavailable"));
        }
        let mut report = self.report.clone();
        report.submission_id = request.submission_id.to_string();
        report.student_id = request.student_id.to_string();
        Ok(report)
    }
}

pub(crate) struct ScriptedDetector {
    result: AiContentResult,
    baseline: Option<WritingStyle>,
    pub(crate) fail_detect: bool,
    pub(crate) fail_baseline_lookup: bool,
    pub(crate) fail_baseline_update: bool,
    updates: Mutex<Vec<String>>,
}

impl ScriptedDetector {
    pub(crate) fn new(result: AiContentResult) -> Self {
        Self {
            result,
            baseline: None,
            fail_detect: false,
            fail_baseline_lookup: false,
            fail_baseline_update: false,
            updates: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_baseline(mut self, baseline: WritingStyle) -> Self {
        self.baseline = Some(baseline);
        self
    }

    pub(crate) async fn recorded_updates(&self) -> Vec<String> {
        self.updates.lock().await.clone()
    }
}

#[async_trait]
impl GenerativeTextDetector for ScriptedDetector {
    async fn detect(&self, _content: &str, _student_id: &str) -> Result<AiContentResult> {
        if self.fail_detect {
            return Err(anyhow!("AI detector unavailable"));
        }
        Ok(self.result.clone())
    }

    async fn get_baseline(&self, _student_id: &str) -> Result<Option<WritingStyle>> {
        if self.fail_baseline_lookup {
            return Err(anyhow!("baseline store unavailable"));
        }
        Ok(self.baseline.clone())
    }

    async fn update_baseline(&self, _student_id: &str, content: &str) -> Result<()> {
        if self.fail_baseline_update {
            return Err(anyhow!("baseline store unavailable"));
        }
        self.updates.lock().await.push(content.to_string());
        Ok(())
    }
}

pub(crate) struct ScriptedProfiler {
    result: Option<StyleDeviationResult>,
    calls: Mutex<usize>,
}

impl ScriptedProfiler {
    pub(crate) fn new(result: Option<StyleDeviationResult>) -> Self {
        Self { result, calls: Mutex::new(0) }
    }

    pub(crate) async fn call_count(&self) -> usize {
        *self.calls.lock().await
    }
}

#[async_trait]
impl StyleProfiler for ScriptedProfiler {
    async fn compare(
        &self,
        _content: &str,
        _baseline: &WritingStyle,
    ) -> Result<StyleDeviationResult> {
        *self.calls.lock().await += 1;
        self.result.clone().ok_or_else(|| anyhow!("style profiler not scripted"))
    }
}

pub(crate) struct RecordingCaseStore {
    requests: Mutex<Vec<CreateViolationRequest>>,
    pub(crate) fail: bool,
}

impl RecordingCaseStore {
    pub(crate) fn new() -> Self {
        Self { requests: Mutex::new(Vec::new()), fail: false }
    }

    pub(crate) async fn recorded(&self) -> Vec<CreateViolationRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl CaseStore for RecordingCaseStore {
    async fn create_violation(&self, request: CreateViolationRequest) -> Result<ViolationCase> {
        if self.fail {
            return Err(anyhow!("case store unavailable"));
        }
        let case = ViolationCase {
            id: Uuid::new_v4().to_string(),
            student_id: request.student_id.clone(),
            violation_type: request.violation_type,
            severity: request.severity,
            course_id: request.course_id.clone(),
            assignment_id: request.assignment_id.clone(),
            description: request.description.clone(),
            evidence: request.evidence.clone(),
            detection_method: request.detection_method,
            reported_by: request.reported_by.clone(),
            reported_at: base_time(),
        };
        self.requests.lock().await.push(request);
        Ok(case)
    }
}
