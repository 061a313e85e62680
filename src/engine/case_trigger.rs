use crate::domain::{
    AiRecommendation, CaseEvidence, CollusionPair, CreateViolationRequest, DetectionMethod,
    IntegrityCheckResult, RiskLevel, ViolationSeverity, ViolationType,
};

/// System identity stamped on every auto-created case.
pub(crate) const REPORTED_BY: &str = "veritas-engine";

/// Decides whether a check outcome opens a violation case and with what
/// classification. Pure; the orchestrator performs the single side effect.
///
/// Plagiarism takes precedence over AI misuse as the more evidentiary
/// signal. A style-only flag opens no case: baseline drift alone is a soft
/// signal that stays in the check result for human review.
pub fn maybe_case_request(
    result: &IntegrityCheckResult,
    course_id: Option<&str>,
    assignment_id: Option<&str>,
) -> Option<CreateViolationRequest> {
    if !(result.flagged && result.requires_human_review) {
        return None;
    }

    let plagiarism_flagged = result.checks.plagiarism.flagged;
    let ai_flagged = result.checks.ai_content.recommendation == AiRecommendation::Flag;

    let severity = severity_for(result.overall_risk_level);
    let (violation_type, evidence, description) = if plagiarism_flagged {
        (
            ViolationType::Plagiarism,
            CaseEvidence::Plagiarism {
                plagiarism: result.checks.plagiarism.clone(),
                ai_content: result.checks.ai_content.clone(),
            },
            format!(
                "Automated integrity check flagged submission {} for plagiarism",
                result.submission_id
            ),
        )
    } else if ai_flagged {
        (
            ViolationType::AiMisuse,
            CaseEvidence::AiMisuse {
                plagiarism: result.checks.plagiarism.clone(),
                ai_content: result.checks.ai_content.clone(),
            },
            format!(
                "Automated integrity check flagged submission {} for AI-generated content",
                result.submission_id
            ),
        )
    } else {
        return None;
    };

    Some(CreateViolationRequest {
        student_id: result.student_id.clone(),
        violation_type,
        severity,
        course_id: course_id.map(str::to_string),
        assignment_id: assignment_id.map(str::to_string),
        description,
        evidence,
        detection_method: DetectionMethod::AutomatedIntegrityCheck,
        reported_by: REPORTED_BY.to_string(),
    })
}

/// Two independently actionable case requests for one high-or-critical
/// collusion pair, one per student, both referencing the same pair.
pub fn collusion_case_requests(
    pair: &CollusionPair,
    course_id: &str,
    assignment_id: &str,
) -> [CreateViolationRequest; 2] {
    let severity = severity_for(pair.risk_level);
    let build = |student_id: &str, own_submission: &str, other_submission: &str| {
        CreateViolationRequest {
            student_id: student_id.to_string(),
            violation_type: ViolationType::Collusion,
            severity,
            course_id: Some(course_id.to_string()),
            assignment_id: Some(assignment_id.to_string()),
            description: format!(
                "Collusion suspected between submissions {own_submission} and {other_submission} \
                 (similarity {:.2}, {} minutes apart)",
                pair.similarity_score, pair.timing_proximity_minutes
            ),
            evidence: CaseEvidence::Collusion { pair: pair.clone() },
            detection_method: DetectionMethod::CollusionAnalysis,
            reported_by: REPORTED_BY.to_string(),
        }
    };

    [
        build(&pair.student1_id, &pair.submission1_id, &pair.submission2_id),
        build(&pair.student2_id, &pair.submission2_id, &pair.submission1_id),
    ]
}

fn severity_for(risk_level: RiskLevel) -> ViolationSeverity {
    if risk_level == RiskLevel::Critical {
        ViolationSeverity::Severe
    } else {
        ViolationSeverity::Major
    }
}
