use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Settings {
    pub(super) runtime: RuntimeSettings,
    pub(super) telemetry: TelemetrySettings,
    pub(super) plagiarism: PlagiarismProviderSettings,
    pub(super) ai_detection: AiDetectionSettings,
    pub(super) style_profiler: StyleProfilerSettings,
    pub(super) similarity: SimilaritySettings,
    pub(super) case_store: CaseStoreSettings,
    pub(super) integrity: IntegritySettings,
    pub(super) collusion: CollusionSettings,
    pub(super) proctoring: ProctoringSettings,
}

#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    pub environment: Environment,
    pub strict_config: bool,
}

#[derive(Debug, Clone)]
pub struct TelemetrySettings {
    pub log_level: String,
    pub json: bool,
    pub prometheus_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct PlagiarismProviderSettings {
    pub base_url: String,
    pub api_key: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
}

#[derive(Debug, Clone)]
pub struct AiDetectionSettings {
    pub base_url: String,
    pub api_key: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
}

#[derive(Debug, Clone)]
pub struct StyleProfilerSettings {
    pub base_url: String,
    pub api_key: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct SimilaritySettings {
    pub base_url: String,
    pub api_key: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct CaseStoreSettings {
    pub base_url: String,
    pub api_key: String,
    pub timeout_seconds: u64,
}

/// Risk Aggregator weights. Calibration defaults, not proven constants.
#[derive(Debug, Clone)]
pub struct IntegritySettings {
    pub plagiarism_weight: f64,
    pub ai_weight: f64,
    pub style_weight: f64,
}

/// Pair-classification thresholds for collusion detection. Must stay
/// monotonic: medium <= high <= critical.
#[derive(Debug, Clone)]
pub struct CollusionSettings {
    pub medium_similarity: f64,
    pub high_similarity: f64,
    pub critical_similarity: f64,
    pub critical_window_minutes: i64,
}

/// Proctoring deduction constants and review thresholds. Deductions must be
/// ascending minor <= major <= severe.
#[derive(Debug, Clone)]
pub struct ProctoringSettings {
    pub minor_deduction: f64,
    pub major_deduction: f64,
    pub severe_deduction: f64,
    pub max_flags: u32,
    pub review_flag_threshold: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Staging,
    Test,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Staging => "staging",
            Self::Test => "test",
        }
    }

    pub(super) fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
    #[error("missing required secret for {0}")]
    MissingSecret(&'static str),
}
