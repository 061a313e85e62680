mod parsing;
mod settings;
mod types;

pub use types::{
    AiDetectionSettings, CaseStoreSettings, CollusionSettings, ConfigError, Environment,
    IntegritySettings, PlagiarismProviderSettings, ProctoringSettings, RuntimeSettings, Settings,
    SimilaritySettings, StyleProfilerSettings, TelemetrySettings,
};
