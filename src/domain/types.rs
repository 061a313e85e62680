use serde::{Deserialize, Serialize};

/// Ordered severity scale for every integrity decision. Combination rules
/// always resolve to the maximum contributing level, so the derived `Ord`
/// (declaration order) is load-bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub(crate) fn requires_review(self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagSeverity {
    Minor,
    Major,
    Severe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiRecommendation {
    Clear,
    Review,
    Flag,
}

impl AiRecommendation {
    /// Per-signal risk contribution of the generative-text detector.
    pub(crate) fn risk_level(self) -> RiskLevel {
        match self {
            Self::Clear => RiskLevel::Low,
            Self::Review => RiskLevel::Medium,
            Self::Flag => RiskLevel::High,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationType {
    Plagiarism,
    AiMisuse,
    Collusion,
}

impl ViolationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plagiarism => "plagiarism",
            Self::AiMisuse => "ai_misuse",
            Self::Collusion => "collusion",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationSeverity {
    Minor,
    Major,
    Severe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    AutomatedIntegrityCheck,
    CollusionAnalysis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProctoringFlagType {
    LookingAway,
    MultipleFaces,
    NoFaceDetected,
    PhoneDetected,
    MultipleDevices,
    SuspiciousBehavior,
    EnvironmentChange,
    BackgroundAudio,
}

impl ProctoringFlagType {
    /// Fixed iteration order so session recommendations come out deterministic.
    pub(crate) const ALL: [Self; 8] = [
        Self::LookingAway,
        Self::MultipleFaces,
        Self::NoFaceDetected,
        Self::PhoneDetected,
        Self::MultipleDevices,
        Self::SuspiciousBehavior,
        Self::EnvironmentChange,
        Self::BackgroundAudio,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Active,
    Ended,
    Analyzed,
}
