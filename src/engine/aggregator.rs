use serde::Serialize;

use crate::core::config::IntegritySettings;
use crate::domain::{
    AiContentResult, AiRecommendation, PlagiarismReport, RiskLevel, StyleDeviationResult,
};

/// Deduction weights for the three signals. Calibration defaults carried
/// over from the original decision policy; injected, never hard-coded at the
/// call sites.
#[derive(Debug, Clone, Copy)]
pub struct RiskWeights {
    pub plagiarism: f64,
    pub ai: f64,
    pub style: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self { plagiarism: 0.35, ai: 0.30, style: 0.15 }
    }
}

impl From<&IntegritySettings> for RiskWeights {
    fn from(settings: &IntegritySettings) -> Self {
        Self {
            plagiarism: settings.plagiarism_weight,
            ai: settings.ai_weight,
            style: settings.style_weight,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RiskAssessment {
    pub integrity_score: f64,
    pub risk_level: RiskLevel,
    pub flagged: bool,
    pub requires_human_review: bool,
    pub recommendations: Vec<String>,
}

/// Combines one submission's signal outputs into the overall decision.
/// Pure: the same inputs always produce the same assessment.
///
/// The risk level is the maximum over per-signal levels rather than a score
/// cutoff, so one severe signal is never diluted by otherwise-clean ones.
pub fn aggregate(
    plagiarism: &PlagiarismReport,
    ai_content: &AiContentResult,
    style_deviation: Option<&StyleDeviationResult>,
    weights: &RiskWeights,
) -> RiskAssessment {
    let mut score = 100.0;

    // External and internal similarity measure different corpora; both deduct.
    if let Some(external) = plagiarism.external_similarity_score {
        score -= external * weights.plagiarism;
    }
    score -= plagiarism.internal_similarity_score * 100.0 * weights.plagiarism;
    score -= ai_content.ai_probability * 100.0 * weights.ai;
    if let Some(style) = style_deviation {
        score -= style.deviation_score * 10.0 * weights.style;
    }
    let integrity_score = score.clamp(0.0, 100.0);

    let style_flagged = style_deviation.is_some_and(|style| style.flagged);

    let mut risk_level =
        plagiarism.overall_risk_level.max(ai_content.recommendation.risk_level());
    if style_flagged {
        risk_level = risk_level.max(RiskLevel::Medium);
    }

    let flagged = plagiarism.flagged
        || ai_content.recommendation == AiRecommendation::Flag
        || style_flagged;
    let requires_human_review = risk_level.requires_review() || flagged;

    let recommendations =
        build_recommendations(plagiarism, ai_content, style_flagged, risk_level);

    RiskAssessment { integrity_score, risk_level, flagged, requires_human_review, recommendations }
}

fn build_recommendations(
    plagiarism: &PlagiarismReport,
    ai_content: &AiContentResult,
    style_flagged: bool,
    risk_level: RiskLevel,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if plagiarism.flagged {
        push_unique(
            &mut recommendations,
            "Plagiarism detected: review the matched sources against the submission",
        );
    }
    match ai_content.recommendation {
        AiRecommendation::Flag => push_unique(
            &mut recommendations,
            "AI-generated content suspected: discuss the submission with the student",
        ),
        AiRecommendation::Review => push_unique(
            &mut recommendations,
            "Elevated AI-content probability: spot-check the flagged sections",
        ),
        AiRecommendation::Clear => {}
    }
    if style_flagged {
        push_unique(
            &mut recommendations,
            "Writing style deviates from the student's baseline: compare with earlier work",
        );
    }
    if risk_level.requires_review() {
        push_unique(&mut recommendations, "Immediate faculty review required");
    }

    recommendations
}

fn push_unique(recommendations: &mut Vec<String>, text: &str) {
    if !recommendations.iter().any(|existing| existing == text) {
        recommendations.push(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ai_result, plagiarism_report, style_deviation};

    #[test]
    fn clean_submission_scores_near_100() {
        let plagiarism = plagiarism_report(Some(0.0), 0.0, RiskLevel::Low, false);
        let ai = ai_result(0.02, AiRecommendation::Clear);

        let assessment = aggregate(&plagiarism, &ai, None, &RiskWeights::default());

        assert!(!assessment.flagged);
        assert_eq!(assessment.risk_level, RiskLevel::Low);
        assert!(!assessment.requires_human_review);
        assert!(assessment.integrity_score > 99.0);
        assert!(assessment.integrity_score <= 100.0);
    }

    #[test]
    fn plagiarism_driven_flag() {
        let plagiarism = plagiarism_report(Some(90.0), 0.1, RiskLevel::High, true);
        let ai = ai_result(0.05, AiRecommendation::Clear);

        let assessment = aggregate(&plagiarism, &ai, None, &RiskWeights::default());

        assert!(assessment.flagged);
        assert_eq!(assessment.risk_level, RiskLevel::High);
        assert!(assessment.requires_human_review);
        // 100 - 90*0.35 - 0.1*100*0.35 - 0.05*100*0.30 = 63.5
        assert!((assessment.integrity_score - 63.5).abs() < 1e-9);
    }

    #[test]
    fn score_is_clamped_to_bounds() {
        let plagiarism = plagiarism_report(Some(100.0), 1.0, RiskLevel::Critical, true);
        let ai = ai_result(1.0, AiRecommendation::Flag);
        let style = style_deviation(50.0, true);

        let assessment = aggregate(&plagiarism, &ai, Some(&style), &RiskWeights::default());

        assert_eq!(assessment.integrity_score, 0.0);
        assert_eq!(assessment.risk_level, RiskLevel::Critical);
    }

    #[test]
    fn single_severe_signal_is_not_diluted() {
        let plagiarism = plagiarism_report(Some(0.0), 0.0, RiskLevel::Low, false);
        let ai = ai_result(0.95, AiRecommendation::Flag);

        let assessment = aggregate(&plagiarism, &ai, None, &RiskWeights::default());

        assert_eq!(assessment.risk_level, RiskLevel::High);
        assert!(assessment.flagged);
        assert!(assessment.requires_human_review);
    }

    #[test]
    fn flagged_style_deviation_forces_at_least_medium() {
        let plagiarism = plagiarism_report(Some(0.0), 0.0, RiskLevel::Low, false);
        let ai = ai_result(0.02, AiRecommendation::Clear);
        let style = style_deviation(3.0, true);

        let assessment = aggregate(&plagiarism, &ai, Some(&style), &RiskWeights::default());

        assert_eq!(assessment.risk_level, RiskLevel::Medium);
        assert!(assessment.flagged);
        assert!(assessment.requires_human_review);
    }

    #[test]
    fn lowering_a_signal_never_raises_risk() {
        let plagiarism = plagiarism_report(Some(40.0), 0.2, RiskLevel::Medium, false);
        let severe = aggregate(
            &plagiarism,
            &ai_result(0.9, AiRecommendation::Flag),
            None,
            &RiskWeights::default(),
        );
        let milder = aggregate(
            &plagiarism,
            &ai_result(0.4, AiRecommendation::Review),
            None,
            &RiskWeights::default(),
        );

        assert!(milder.risk_level <= severe.risk_level);
        assert!(milder.integrity_score >= severe.integrity_score);
    }

    #[test]
    fn review_recommendation_appears_once() {
        let plagiarism = plagiarism_report(Some(95.0), 0.8, RiskLevel::Critical, true);
        let ai = ai_result(0.97, AiRecommendation::Flag);
        let style = style_deviation(6.0, true);

        let assessment = aggregate(&plagiarism, &ai, Some(&style), &RiskWeights::default());

        let review_entries = assessment
            .recommendations
            .iter()
            .filter(|entry| entry.as_str() == "Immediate faculty review required")
            .count();
        assert_eq!(review_entries, 1);
    }

    #[test]
    fn weights_are_tunable() {
        let plagiarism = plagiarism_report(Some(50.0), 0.0, RiskLevel::Medium, false);
        let ai = ai_result(0.0, AiRecommendation::Clear);

        let zeroed = RiskWeights { plagiarism: 0.0, ai: 0.0, style: 0.0 };
        let assessment = aggregate(&plagiarism, &ai, None, &zeroed);

        assert_eq!(assessment.integrity_score, 100.0);
    }
}
