use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use validator::Validate;

use crate::core::config::Settings;
use crate::core::time::now_utc;
use crate::domain::{
    CohortSubmission, CollusionReport, FlagSeverity, IntegrityCheckResult, IntegrityChecks,
    ProctoringFlag, ProctoringFlagType, ProctoringSession, RiskLevel, SubmissionCheckInput,
};
use crate::engine::aggregator::{aggregate, RiskWeights};
use crate::engine::case_trigger;
use crate::engine::collusion::{CollusionDetector, CollusionPolicy};
use crate::engine::proctoring::{ProctoringAnalyzer, ProctoringPolicy};
use crate::providers::{
    CaseStore, GenerativeTextDetector, HttpCaseStore, HttpGenerativeTextDetector,
    HttpPlagiarismMatcher, HttpSimilarityAnalyzer, HttpStyleProfiler, PlagiarismCheckRequest,
    PlagiarismMatcher, SimilarityAnalyzer, StyleProfiler,
};

/// Collaborators the engine fans out to. Swappable so the API layer (or a
/// test) can wire in alternative implementations.
pub struct EngineProviders {
    pub plagiarism: Arc<dyn PlagiarismMatcher>,
    pub detector: Arc<dyn GenerativeTextDetector>,
    pub profiler: Arc<dyn StyleProfiler>,
    pub similarity: Arc<dyn SimilarityAnalyzer>,
    pub case_store: Arc<dyn CaseStore>,
}

/// Top-level coordinator. The only component with side effects beyond
/// computation: it may emit violation cases and push baseline updates.
#[derive(Clone)]
pub struct IntegrityEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    plagiarism: Arc<dyn PlagiarismMatcher>,
    detector: Arc<dyn GenerativeTextDetector>,
    profiler: Arc<dyn StyleProfiler>,
    case_store: Arc<dyn CaseStore>,
    weights: RiskWeights,
    collusion: CollusionDetector,
    proctoring: ProctoringAnalyzer,
}

impl IntegrityEngine {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let providers = EngineProviders {
            plagiarism: Arc::new(HttpPlagiarismMatcher::from_settings(settings)?),
            detector: Arc::new(HttpGenerativeTextDetector::from_settings(settings)?),
            profiler: Arc::new(HttpStyleProfiler::from_settings(settings)?),
            similarity: Arc::new(HttpSimilarityAnalyzer::from_settings(settings)?),
            case_store: Arc::new(HttpCaseStore::from_settings(settings)?),
        };

        Ok(Self::new(
            providers,
            RiskWeights::from(settings.integrity()),
            CollusionPolicy::from(settings.collusion()),
            ProctoringPolicy::from(settings.proctoring()),
        ))
    }

    pub fn new(
        providers: EngineProviders,
        weights: RiskWeights,
        collusion_policy: CollusionPolicy,
        proctoring_policy: ProctoringPolicy,
    ) -> Self {
        let collusion = CollusionDetector::new(Arc::clone(&providers.similarity), collusion_policy);
        Self {
            inner: Arc::new(EngineInner {
                plagiarism: providers.plagiarism,
                detector: providers.detector,
                profiler: providers.profiler,
                case_store: providers.case_store,
                weights,
                collusion,
                proctoring: ProctoringAnalyzer::new(proctoring_policy),
            }),
        }
    }

    /// Runs the full single-submission check: concurrent signal fan-out,
    /// aggregation, optional case creation, baseline update. Callers get a
    /// complete result or an error, never a silently partial result.
    pub async fn check_submission_integrity(
        &self,
        input: SubmissionCheckInput,
    ) -> Result<IntegrityCheckResult> {
        input.validate().context("Invalid submission check input")?;

        let timer = Instant::now();
        tracing::info!(
            submission_id = %input.submission_id,
            student_id = %input.student_id,
            "Integrity check started"
        );

        // Missing baseline is the normal case for new students; a failed
        // lookup degrades the same way instead of failing the check.
        let baseline = match self.inner.detector.get_baseline(&input.student_id).await {
            Ok(baseline) => baseline,
            Err(err) => {
                tracing::warn!(
                    student_id = %input.student_id,
                    error = %err,
                    "Baseline lookup failed; omitting style deviation"
                );
                None
            }
        };

        let plagiarism_request = PlagiarismCheckRequest {
            submission_id: &input.submission_id,
            student_id: &input.student_id,
            content: &input.content,
            content_type: "text",
            course_id: input.course_id.as_deref(),
            assignment_id: input.assignment_id.as_deref(),
        };
        let style_future = async {
            match &baseline {
                Some(baseline) => {
                    self.inner.profiler.compare(&input.content, baseline).await.map(Some)
                }
                None => Ok(None),
            }
        };

        // Fan-out/fan-in: all providers run concurrently and the first hard
        // failure aborts the join, so a mandatory signal can never be
        // silently dropped.
        let (plagiarism, ai_content, style_deviation) = tokio::try_join!(
            self.inner.plagiarism.check(plagiarism_request),
            self.inner.detector.detect(&input.content, &input.student_id),
            style_future,
        )?;

        let assessment =
            aggregate(&plagiarism, &ai_content, style_deviation.as_ref(), &self.inner.weights);

        let result = IntegrityCheckResult {
            submission_id: input.submission_id.clone(),
            student_id: input.student_id.clone(),
            overall_risk_level: assessment.risk_level,
            integrity_score: assessment.integrity_score,
            flagged: assessment.flagged,
            checks: IntegrityChecks { plagiarism, ai_content, style_deviation },
            recommendations: assessment.recommendations,
            requires_human_review: assessment.requires_human_review,
            checked_at: now_utc(),
        };

        if result.flagged && result.requires_human_review {
            self.open_case_for_check(
                &result,
                input.course_id.as_deref(),
                input.assignment_id.as_deref(),
            )
            .await;
        }

        // Baselines drift forward even for clean submissions; a failed
        // update never affects the returned result.
        if let Err(err) =
            self.inner.detector.update_baseline(&input.student_id, &input.content).await
        {
            tracing::warn!(
                student_id = %input.student_id,
                error = %err,
                "Failed to update writing baseline"
            );
        }

        metrics::counter!(
            "integrity_checks_total",
            "risk_level" => result.overall_risk_level.as_str()
        )
        .increment(1);
        metrics::histogram!("check_duration_seconds").record(timer.elapsed().as_secs_f64());

        tracing::info!(
            submission_id = %result.submission_id,
            risk_level = result.overall_risk_level.as_str(),
            integrity_score = result.integrity_score,
            flagged = result.flagged,
            "Integrity check completed"
        );

        Ok(result)
    }

    /// Case creation is fire-and-forget relative to the check result: the
    /// detection outcome is more valuable delivered with a missing case than
    /// lost to a storage hiccup.
    async fn open_case_for_check(
        &self,
        result: &IntegrityCheckResult,
        course_id: Option<&str>,
        assignment_id: Option<&str>,
    ) {
        let Some(request) = case_trigger::maybe_case_request(result, course_id, assignment_id)
        else {
            return;
        };

        let violation_type = request.violation_type;
        match self.inner.case_store.create_violation(request).await {
            Ok(case) => {
                tracing::info!(
                    case_id = %case.id,
                    submission_id = %result.submission_id,
                    violation_type = ?violation_type,
                    "Violation case opened"
                );
                metrics::counter!(
                    "violation_cases_total",
                    "violation_type" => violation_type.as_str()
                )
                .increment(1);
            }
            Err(err) => {
                tracing::error!(
                    submission_id = %result.submission_id,
                    error = %err,
                    "Failed to create violation case; returning check result anyway"
                );
                metrics::counter!("case_creation_failures_total").increment(1);
            }
        }
    }

    /// Runs collusion detection over a cohort and opens two cases (one per
    /// student) for every high-or-critical pair.
    pub async fn check_collusion(
        &self,
        assignment_id: &str,
        course_id: &str,
        submissions: &[CohortSubmission],
    ) -> Result<CollusionReport> {
        let report = self.inner.collusion.detect(assignment_id, course_id, submissions).await?;

        for pair in &report.collusion_pairs {
            if pair.risk_level < RiskLevel::High {
                continue;
            }
            metrics::counter!(
                "collusion_pairs_total",
                "risk_level" => pair.risk_level.as_str()
            )
            .increment(1);

            for request in case_trigger::collusion_case_requests(pair, course_id, assignment_id) {
                let student_id = request.student_id.clone();
                match self.inner.case_store.create_violation(request).await {
                    Ok(case) => {
                        tracing::info!(
                            case_id = %case.id,
                            student_id = %student_id,
                            assignment_id,
                            "Collusion case opened"
                        );
                        metrics::counter!("violation_cases_total", "violation_type" => "collusion")
                            .increment(1);
                    }
                    Err(err) => {
                        tracing::error!(
                            student_id = %student_id,
                            assignment_id,
                            error = %err,
                            "Failed to create collusion case"
                        );
                        metrics::counter!("case_creation_failures_total").increment(1);
                    }
                }
            }
        }

        tracing::info!(
            assignment_id,
            course_id,
            pairs = report.collusion_pairs.len(),
            groups = report.suspicious_groups.len(),
            overall_risk = report.overall_risk.as_str(),
            "Collusion check completed"
        );

        Ok(report)
    }

    // Proctoring lifecycle, delegated to the analyzer that owns the sessions.

    pub async fn create_proctoring_session(
        &self,
        student_id: &str,
        exam_id: &str,
    ) -> ProctoringSession {
        self.inner.proctoring.create_session(student_id, exam_id).await
    }

    pub async fn add_proctoring_flag(
        &self,
        session_id: &str,
        flag_type: ProctoringFlagType,
        severity: FlagSeverity,
        description: &str,
        ai_confidence: f64,
    ) -> Result<ProctoringFlag> {
        self.inner
            .proctoring
            .add_flag(session_id, flag_type, severity, description, ai_confidence)
            .await
    }

    pub async fn end_proctoring_session(&self, session_id: &str) -> Result<ProctoringSession> {
        self.inner.proctoring.end_session(session_id).await
    }

    pub fn proctoring(&self) -> &ProctoringAnalyzer {
        &self.inner.proctoring
    }
}
