use std::collections::HashMap;

use anyhow::{anyhow, Result};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::config::ProctoringSettings;
use crate::core::time::now_utc;
use crate::domain::{
    FlagSeverity, ProctoringFlag, ProctoringFlagType, ProctoringSession, RiskLevel, SessionPhase,
};

/// Deduction constants and review thresholds for session analysis.
#[derive(Debug, Clone, Copy)]
pub struct ProctoringPolicy {
    pub minor_deduction: f64,
    pub major_deduction: f64,
    pub severe_deduction: f64,
    pub max_flags: u32,
    pub review_flag_threshold: u32,
}

impl Default for ProctoringPolicy {
    fn default() -> Self {
        Self {
            minor_deduction: 2.0,
            major_deduction: 5.0,
            severe_deduction: 10.0,
            max_flags: 5,
            review_flag_threshold: 3,
        }
    }
}

impl From<&ProctoringSettings> for ProctoringPolicy {
    fn from(settings: &ProctoringSettings) -> Self {
        Self {
            minor_deduction: settings.minor_deduction,
            major_deduction: settings.major_deduction,
            severe_deduction: settings.severe_deduction,
            max_flags: settings.max_flags,
            review_flag_threshold: settings.review_flag_threshold,
        }
    }
}

impl ProctoringPolicy {
    fn severity_deduction(&self, severity: FlagSeverity) -> f64 {
        match severity {
            FlagSeverity::Minor => self.minor_deduction,
            FlagSeverity::Major => self.major_deduction,
            FlagSeverity::Severe => self.severe_deduction,
        }
    }
}

/// Owns every live proctoring session for the duration of the exam. Flags
/// may be appended concurrently while a session is live; analysis only runs
/// after `end_session`, never concurrently with flag insertion.
pub struct ProctoringAnalyzer {
    sessions: RwLock<HashMap<String, ProctoringSession>>,
    policy: ProctoringPolicy,
}

impl ProctoringAnalyzer {
    pub fn new(policy: ProctoringPolicy) -> Self {
        Self { sessions: RwLock::new(HashMap::new()), policy }
    }

    pub async fn create_session(&self, student_id: &str, exam_id: &str) -> ProctoringSession {
        let session = ProctoringSession {
            id: Uuid::new_v4().to_string(),
            student_id: student_id.to_string(),
            exam_id: exam_id.to_string(),
            phase: SessionPhase::Active,
            id_verified: false,
            environment_verified: false,
            flags: Vec::new(),
            flag_count: 0,
            integrity_score: 100.0,
            risk_level: RiskLevel::Low,
            requires_review: false,
            recommendations: Vec::new(),
            started_at: now_utc(),
            ended_at: None,
            duration_minutes: None,
        };

        tracing::info!(session_id = %session.id, student_id, exam_id, "Proctoring session created");
        self.sessions.write().await.insert(session.id.clone(), session.clone());
        session
    }

    pub async fn verify_identity(&self, session_id: &str, verified: bool) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        let session = live_session(&mut sessions, session_id)?;
        session.id_verified = verified;
        Ok(())
    }

    pub async fn verify_environment(&self, session_id: &str, verified: bool) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        let session = live_session(&mut sessions, session_id)?;
        session.environment_verified = verified;
        Ok(())
    }

    /// Appends one behavioral flag. Flags are append-only and only accepted
    /// while the session is live.
    pub async fn add_flag(
        &self,
        session_id: &str,
        flag_type: ProctoringFlagType,
        severity: FlagSeverity,
        description: &str,
        ai_confidence: f64,
    ) -> Result<ProctoringFlag> {
        let mut sessions = self.sessions.write().await;
        let session = live_session(&mut sessions, session_id)?;

        let flag = ProctoringFlag {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            flag_type,
            severity,
            description: description.to_string(),
            timestamp: now_utc(),
            ai_confidence: ai_confidence.clamp(0.0, 1.0),
        };
        session.flags.push(flag.clone());
        session.flag_count = session.flags.len() as u32;

        tracing::info!(
            session_id,
            flag_type = ?flag_type,
            severity = ?severity,
            flag_count = session.flag_count,
            "Proctoring flag recorded"
        );

        Ok(flag)
    }

    /// Terminal transition: records the end time, computes the duration and
    /// runs analysis. A second call is an error.
    pub async fn end_session(&self, session_id: &str) -> Result<ProctoringSession> {
        let mut sessions = self.sessions.write().await;
        let session = known_session(&mut sessions, session_id)?;
        if session.phase != SessionPhase::Active {
            return Err(anyhow!("Proctoring session already ended: {session_id}"));
        }

        let ended_at = now_utc();
        session.ended_at = Some(ended_at);
        session.duration_minutes = Some((ended_at - session.started_at).whole_minutes());
        session.phase = SessionPhase::Ended;
        analyze(session, &self.policy);

        tracing::info!(
            session_id,
            integrity_score = session.integrity_score,
            risk_level = session.risk_level.as_str(),
            flag_count = session.flag_count,
            "Proctoring session analyzed"
        );
        metrics::counter!(
            "proctoring_sessions_total",
            "risk_level" => session.risk_level.as_str()
        )
        .increment(1);

        Ok(session.clone())
    }

    /// Recomputes the analysis from the recorded flag set. Idempotent: the
    /// same flags always yield the same score. Only valid after the session
    /// has ended.
    pub async fn analyze_session(&self, session_id: &str) -> Result<ProctoringSession> {
        let mut sessions = self.sessions.write().await;
        let session = known_session(&mut sessions, session_id)?;
        if session.phase == SessionPhase::Active {
            return Err(anyhow!("Proctoring session still live: {session_id}"));
        }

        analyze(session, &self.policy);
        Ok(session.clone())
    }

    pub async fn get_session(&self, session_id: &str) -> Result<ProctoringSession> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| anyhow!("Unknown proctoring session: {session_id}"))
    }

    pub async fn sessions_requiring_review(&self) -> Vec<ProctoringSession> {
        let sessions = self.sessions.read().await;
        let mut flagged: Vec<ProctoringSession> = sessions
            .values()
            .filter(|session| session.phase == SessionPhase::Analyzed && session.requires_review)
            .cloned()
            .collect();
        flagged.sort_by(|a, b| a.started_at.cmp(&b.started_at));
        flagged
    }
}

fn known_session<'a>(
    sessions: &'a mut HashMap<String, ProctoringSession>,
    session_id: &str,
) -> Result<&'a mut ProctoringSession> {
    sessions
        .get_mut(session_id)
        .ok_or_else(|| anyhow!("Unknown proctoring session: {session_id}"))
}

fn live_session<'a>(
    sessions: &'a mut HashMap<String, ProctoringSession>,
    session_id: &str,
) -> Result<&'a mut ProctoringSession> {
    let session = known_session(sessions, session_id)?;
    if session.phase != SessionPhase::Active {
        return Err(anyhow!("Proctoring session no longer live: {session_id}"));
    }
    Ok(session)
}

/// Pure scoring over the flag set; repeated runs yield identical results.
fn analyze(session: &mut ProctoringSession, policy: &ProctoringPolicy) {
    let mut deduction: f64 =
        session.flags.iter().map(|flag| policy.severity_deduction(flag.severity)).sum();

    let count_of = |flag_type: ProctoringFlagType| -> usize {
        session.flags.iter().filter(|flag| flag.flag_type == flag_type).count()
    };

    deduction += 2.0 * count_of(ProctoringFlagType::SuspiciousBehavior) as f64;
    if count_of(ProctoringFlagType::MultipleDevices) > 0 {
        deduction += 10.0;
    }
    deduction += 3.0 * count_of(ProctoringFlagType::EnvironmentChange) as f64;

    let score = (100.0 - deduction).max(0.0);
    let flag_count = session.flags.len() as u32;

    let risk_level = if score < 50.0 || flag_count >= policy.max_flags {
        RiskLevel::Critical
    } else if score < 70.0 || flag_count >= 3 {
        RiskLevel::High
    } else if score < 85.0 || flag_count >= 1 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    session.integrity_score = score;
    session.flag_count = flag_count;
    session.risk_level = risk_level;
    session.requires_review =
        risk_level.requires_review() || flag_count >= policy.review_flag_threshold;
    session.recommendations = recommendations_for(session);
    session.phase = SessionPhase::Analyzed;
}

/// Fixed per-flag-type lookup, emitted in a deterministic order.
fn recommendations_for(session: &ProctoringSession) -> Vec<String> {
    let mut recommendations = Vec::new();

    for flag_type in ProctoringFlagType::ALL {
        if !session.flags.iter().any(|flag| flag.flag_type == flag_type) {
            continue;
        }
        let text = match flag_type {
            ProctoringFlagType::LookingAway => {
                "Review video segments where the student looks away from the screen"
            }
            ProctoringFlagType::MultipleFaces => "Review video for additional people in the frame",
            ProctoringFlagType::NoFaceDetected => {
                "Review intervals with no face visible on camera"
            }
            ProctoringFlagType::PhoneDetected => "Review segments where a phone is visible",
            ProctoringFlagType::MultipleDevices => {
                "Inspect the session for use of a second device"
            }
            ProctoringFlagType::SuspiciousBehavior => {
                "Review flagged behavioral anomalies against the recording"
            }
            ProctoringFlagType::EnvironmentChange => {
                "Review environment changes during the exam"
            }
            ProctoringFlagType::BackgroundAudio => {
                "Review audio segments with background voices"
            }
        };
        recommendations.push(text.to_string());
    }

    if !session.id_verified {
        recommendations.push("Identity was not verified before the exam".to_string());
    }
    if !session.environment_verified {
        recommendations.push("Environment scan was not completed".to_string());
    }

    recommendations
}
