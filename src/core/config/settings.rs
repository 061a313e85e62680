use super::parsing::{
    env_optional, env_or_default, parse_bool, parse_environment, parse_f64, parse_i64, parse_u32,
    parse_u64,
};
use super::types::{
    AiDetectionSettings, CaseStoreSettings, CollusionSettings, ConfigError, IntegritySettings,
    PlagiarismProviderSettings, ProctoringSettings, RuntimeSettings, Settings, SimilaritySettings,
    StyleProfilerSettings, TelemetrySettings,
};

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            parse_environment(env_optional("VERITAS_ENV").or_else(|| env_optional("ENVIRONMENT")));
        let strict_config =
            env_optional("VERITAS_STRICT_CONFIG").map(|value| parse_bool(&value)).unwrap_or(false)
                || environment.is_production();

        let log_level = env_or_default("VERITAS_LOG_LEVEL", "info");
        let json = env_optional("VERITAS_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);
        let prometheus_enabled =
            env_optional("PROMETHEUS_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);

        let plagiarism = PlagiarismProviderSettings {
            base_url: env_or_default("PLAGIARISM_BASE_URL", ""),
            api_key: env_or_default("PLAGIARISM_API_KEY", ""),
            timeout_seconds: parse_u64(
                "PLAGIARISM_TIMEOUT_SECONDS",
                env_or_default("PLAGIARISM_TIMEOUT_SECONDS", "60"),
            )?,
            max_retries: parse_u32(
                "PLAGIARISM_MAX_RETRIES",
                env_or_default("PLAGIARISM_MAX_RETRIES", "3"),
            )?,
        };

        let ai_detection = AiDetectionSettings {
            base_url: env_or_default("AI_DETECTOR_BASE_URL", ""),
            api_key: env_or_default("AI_DETECTOR_API_KEY", ""),
            timeout_seconds: parse_u64(
                "AI_DETECTOR_TIMEOUT_SECONDS",
                env_or_default("AI_DETECTOR_TIMEOUT_SECONDS", "60"),
            )?,
            max_retries: parse_u32(
                "AI_DETECTOR_MAX_RETRIES",
                env_or_default("AI_DETECTOR_MAX_RETRIES", "3"),
            )?,
        };

        let style_profiler = StyleProfilerSettings {
            base_url: env_or_default("STYLE_PROFILER_BASE_URL", ""),
            api_key: env_or_default("STYLE_PROFILER_API_KEY", ""),
            timeout_seconds: parse_u64(
                "STYLE_PROFILER_TIMEOUT_SECONDS",
                env_or_default("STYLE_PROFILER_TIMEOUT_SECONDS", "30"),
            )?,
        };

        let similarity = SimilaritySettings {
            base_url: env_or_default("SIMILARITY_BASE_URL", ""),
            api_key: env_or_default("SIMILARITY_API_KEY", ""),
            timeout_seconds: parse_u64(
                "SIMILARITY_TIMEOUT_SECONDS",
                env_or_default("SIMILARITY_TIMEOUT_SECONDS", "30"),
            )?,
        };

        let case_store = CaseStoreSettings {
            base_url: env_or_default("CASE_STORE_BASE_URL", ""),
            api_key: env_or_default("CASE_STORE_API_KEY", ""),
            timeout_seconds: parse_u64(
                "CASE_STORE_TIMEOUT_SECONDS",
                env_or_default("CASE_STORE_TIMEOUT_SECONDS", "30"),
            )?,
        };

        let integrity = IntegritySettings {
            plagiarism_weight: parse_f64(
                "INTEGRITY_PLAGIARISM_WEIGHT",
                env_or_default("INTEGRITY_PLAGIARISM_WEIGHT", "0.35"),
            )?,
            ai_weight: parse_f64(
                "INTEGRITY_AI_WEIGHT",
                env_or_default("INTEGRITY_AI_WEIGHT", "0.30"),
            )?,
            style_weight: parse_f64(
                "INTEGRITY_STYLE_WEIGHT",
                env_or_default("INTEGRITY_STYLE_WEIGHT", "0.15"),
            )?,
        };

        let collusion = CollusionSettings {
            medium_similarity: parse_f64(
                "COLLUSION_MEDIUM_SIMILARITY",
                env_or_default("COLLUSION_MEDIUM_SIMILARITY", "0.65"),
            )?,
            high_similarity: parse_f64(
                "COLLUSION_HIGH_SIMILARITY",
                env_or_default("COLLUSION_HIGH_SIMILARITY", "0.80"),
            )?,
            critical_similarity: parse_f64(
                "COLLUSION_CRITICAL_SIMILARITY",
                env_or_default("COLLUSION_CRITICAL_SIMILARITY", "0.90"),
            )?,
            critical_window_minutes: parse_i64(
                "COLLUSION_CRITICAL_WINDOW_MINUTES",
                env_or_default("COLLUSION_CRITICAL_WINDOW_MINUTES", "30"),
            )?,
        };

        let proctoring = ProctoringSettings {
            minor_deduction: parse_f64(
                "PROCTORING_MINOR_DEDUCTION",
                env_or_default("PROCTORING_MINOR_DEDUCTION", "2"),
            )?,
            major_deduction: parse_f64(
                "PROCTORING_MAJOR_DEDUCTION",
                env_or_default("PROCTORING_MAJOR_DEDUCTION", "5"),
            )?,
            severe_deduction: parse_f64(
                "PROCTORING_SEVERE_DEDUCTION",
                env_or_default("PROCTORING_SEVERE_DEDUCTION", "10"),
            )?,
            max_flags: parse_u32(
                "PROCTORING_MAX_FLAGS",
                env_or_default("PROCTORING_MAX_FLAGS", "5"),
            )?,
            review_flag_threshold: parse_u32(
                "PROCTORING_REVIEW_FLAG_THRESHOLD",
                env_or_default("PROCTORING_REVIEW_FLAG_THRESHOLD", "3"),
            )?,
        };

        let settings = Self {
            runtime: RuntimeSettings { environment, strict_config },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
            plagiarism,
            ai_detection,
            style_profiler,
            similarity,
            case_store,
            integrity,
            collusion,
            proctoring,
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    pub fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub fn plagiarism(&self) -> &PlagiarismProviderSettings {
        &self.plagiarism
    }

    pub fn ai_detection(&self) -> &AiDetectionSettings {
        &self.ai_detection
    }

    pub fn style_profiler(&self) -> &StyleProfilerSettings {
        &self.style_profiler
    }

    pub fn similarity(&self) -> &SimilaritySettings {
        &self.similarity
    }

    pub fn case_store(&self) -> &CaseStoreSettings {
        &self.case_store
    }

    pub fn integrity(&self) -> &IntegritySettings {
        &self.integrity
    }

    pub fn collusion(&self) -> &CollusionSettings {
        &self.collusion
    }

    pub fn proctoring(&self) -> &ProctoringSettings {
        &self.proctoring
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (field, weight) in [
            ("INTEGRITY_PLAGIARISM_WEIGHT", self.integrity.plagiarism_weight),
            ("INTEGRITY_AI_WEIGHT", self.integrity.ai_weight),
            ("INTEGRITY_STYLE_WEIGHT", self.integrity.style_weight),
        ] {
            if !(0.0..=1.0).contains(&weight) {
                return Err(ConfigError::InvalidValue { field, value: weight.to_string() });
            }
        }

        let collusion = &self.collusion;
        let ordered = 0.0 < collusion.medium_similarity
            && collusion.medium_similarity <= collusion.high_similarity
            && collusion.high_similarity <= collusion.critical_similarity
            && collusion.critical_similarity <= 1.0;
        if !ordered {
            return Err(ConfigError::InvalidValue {
                field: "COLLUSION_*_SIMILARITY",
                value: format!(
                    "{}/{}/{}",
                    collusion.medium_similarity,
                    collusion.high_similarity,
                    collusion.critical_similarity
                ),
            });
        }
        if collusion.critical_window_minutes <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "COLLUSION_CRITICAL_WINDOW_MINUTES",
                value: collusion.critical_window_minutes.to_string(),
            });
        }

        let proctoring = &self.proctoring;
        let ascending = 0.0 <= proctoring.minor_deduction
            && proctoring.minor_deduction <= proctoring.major_deduction
            && proctoring.major_deduction <= proctoring.severe_deduction;
        if !ascending {
            return Err(ConfigError::InvalidValue {
                field: "PROCTORING_*_DEDUCTION",
                value: format!(
                    "{}/{}/{}",
                    proctoring.minor_deduction,
                    proctoring.major_deduction,
                    proctoring.severe_deduction
                ),
            });
        }
        if proctoring.max_flags == 0 {
            return Err(ConfigError::InvalidValue {
                field: "PROCTORING_MAX_FLAGS",
                value: "0".to_string(),
            });
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if self.plagiarism.base_url.is_empty() || self.plagiarism.api_key.is_empty() {
            return Err(ConfigError::MissingSecret("PLAGIARISM_BASE_URL/PLAGIARISM_API_KEY"));
        }
        if self.ai_detection.base_url.is_empty() || self.ai_detection.api_key.is_empty() {
            return Err(ConfigError::MissingSecret("AI_DETECTOR_BASE_URL/AI_DETECTOR_API_KEY"));
        }
        if self.style_profiler.base_url.is_empty() || self.style_profiler.api_key.is_empty() {
            return Err(ConfigError::MissingSecret(
                "STYLE_PROFILER_BASE_URL/STYLE_PROFILER_API_KEY",
            ));
        }
        if self.similarity.base_url.is_empty() || self.similarity.api_key.is_empty() {
            return Err(ConfigError::MissingSecret("SIMILARITY_BASE_URL/SIMILARITY_API_KEY"));
        }
        if self.case_store.base_url.is_empty() || self.case_store.api_key.is_empty() {
            return Err(ConfigError::MissingSecret("CASE_STORE_BASE_URL/CASE_STORE_API_KEY"));
        }

        Ok(())
    }
}
