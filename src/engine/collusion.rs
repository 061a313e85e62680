use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::task::JoinSet;

use crate::core::config::CollusionSettings;
use crate::core::time::minutes_between;
use crate::domain::{CohortSubmission, CollusionPair, CollusionReport, RiskLevel, SuspiciousGroup};
use crate::providers::SimilarityAnalyzer;

/// Pair-classification thresholds. Monotonic by construction: higher
/// similarity or closer timing never yields a lower level.
#[derive(Debug, Clone, Copy)]
pub struct CollusionPolicy {
    pub medium_similarity: f64,
    pub high_similarity: f64,
    pub critical_similarity: f64,
    pub critical_window_minutes: i64,
}

impl Default for CollusionPolicy {
    fn default() -> Self {
        Self {
            medium_similarity: 0.65,
            high_similarity: 0.80,
            critical_similarity: 0.90,
            critical_window_minutes: 30,
        }
    }
}

impl From<&CollusionSettings> for CollusionPolicy {
    fn from(settings: &CollusionSettings) -> Self {
        Self {
            medium_similarity: settings.medium_similarity,
            high_similarity: settings.high_similarity,
            critical_similarity: settings.critical_similarity,
            critical_window_minutes: settings.critical_window_minutes,
        }
    }
}

impl CollusionPolicy {
    /// Classifies one pair from its effective similarity and timing gap.
    /// Timing only ever escalates; a critical-similarity pair outside the
    /// window still classifies as high.
    pub(crate) fn classify_pair(&self, similarity: f64, timing_minutes: i64) -> RiskLevel {
        if similarity >= self.critical_similarity && timing_minutes <= self.critical_window_minutes
        {
            RiskLevel::Critical
        } else if similarity >= self.high_similarity {
            RiskLevel::High
        } else if similarity >= self.medium_similarity {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

pub struct CollusionDetector {
    similarity: Arc<dyn SimilarityAnalyzer>,
    policy: CollusionPolicy,
}

impl CollusionDetector {
    pub fn new(similarity: Arc<dyn SimilarityAnalyzer>, policy: CollusionPolicy) -> Self {
        Self { similarity, policy }
    }

    /// Scores every unordered pair in the cohort and derives suspicious
    /// groups by transitive closure over high-or-above pairs. Fewer than two
    /// submissions is a no-op, not an error.
    pub async fn detect(
        &self,
        assignment_id: &str,
        course_id: &str,
        submissions: &[CohortSubmission],
    ) -> Result<CollusionReport> {
        if submissions.len() < 2 {
            return Ok(CollusionReport {
                assignment_id: assignment_id.to_string(),
                course_id: course_id.to_string(),
                collusion_pairs: Vec::new(),
                suspicious_groups: Vec::new(),
                overall_risk: RiskLevel::Low,
            });
        }

        // Pairs are independent; score them in parallel. Group formation
        // below waits for every pairwise result.
        let mut join_set = JoinSet::new();
        for i in 0..submissions.len() {
            for j in (i + 1)..submissions.len() {
                let analyzer = Arc::clone(&self.similarity);
                let a = submissions[i].content.clone();
                let b = submissions[j].content.clone();
                join_set.spawn(async move {
                    let content = analyzer.content_similarity(&a, &b).await?;
                    let structural = analyzer.structural_similarity(&a, &b).await?;
                    anyhow::Ok((i, j, content, structural))
                });
            }
        }

        let mut scored = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            let scores = joined.context("Pairwise similarity task panicked")??;
            scored.push(scores);
        }
        scored.sort_by_key(|(i, j, _, _)| (*i, *j));

        let mut collusion_pairs = Vec::with_capacity(scored.len());
        for (i, j, content, structural) in scored {
            let first = &submissions[i];
            let second = &submissions[j];
            let timing_minutes = minutes_between(first.submitted_at, second.submitted_at);
            let risk_level = self.policy.classify_pair(content.max(structural), timing_minutes);

            collusion_pairs.push(CollusionPair {
                submission1_id: first.submission_id.clone(),
                submission2_id: second.submission_id.clone(),
                student1_id: first.student_id.clone(),
                student2_id: second.student_id.clone(),
                similarity_score: content,
                structural_similarity: structural,
                timing_proximity_minutes: timing_minutes,
                risk_level,
            });
        }

        let suspicious_groups = build_groups(submissions, &collusion_pairs);
        let overall_risk = collusion_pairs
            .iter()
            .map(|pair| pair.risk_level)
            .max()
            .unwrap_or(RiskLevel::Low);

        Ok(CollusionReport {
            assignment_id: assignment_id.to_string(),
            course_id: course_id.to_string(),
            collusion_pairs,
            suspicious_groups,
            overall_risk,
        })
    }
}

/// Transitive closure over pairs classified high or above: any submissions
/// connected through a chain of such pairs form one group.
fn build_groups(
    submissions: &[CohortSubmission],
    pairs: &[CollusionPair],
) -> Vec<SuspiciousGroup> {
    let index_of = |submission_id: &str| -> Option<usize> {
        submissions.iter().position(|submission| submission.submission_id == submission_id)
    };

    let mut parent: Vec<usize> = (0..submissions.len()).collect();

    fn find(parent: &mut Vec<usize>, node: usize) -> usize {
        let mut root = node;
        while parent[root] != root {
            root = parent[root];
        }
        let mut current = node;
        while parent[current] != root {
            let next = parent[current];
            parent[current] = root;
            current = next;
        }
        root
    }

    let linked: Vec<&CollusionPair> =
        pairs.iter().filter(|pair| pair.risk_level >= RiskLevel::High).collect();

    for pair in &linked {
        if let (Some(a), Some(b)) = (index_of(&pair.submission1_id), index_of(&pair.submission2_id))
        {
            let root_a = find(&mut parent, a);
            let root_b = find(&mut parent, b);
            if root_a != root_b {
                parent[root_a] = root_b;
            }
        }
    }

    let mut groups = Vec::new();
    let mut roots_seen = Vec::new();
    for index in 0..submissions.len() {
        let root = find(&mut parent, index);
        if roots_seen.contains(&root) {
            continue;
        }

        let members: Vec<usize> =
            (0..submissions.len()).filter(|&other| find(&mut parent, other) == root).collect();
        if members.len() < 2 {
            continue;
        }
        roots_seen.push(root);

        let member_ids: Vec<String> =
            members.iter().map(|&member| submissions[member].submission_id.clone()).collect();
        let group_pairs: Vec<&&CollusionPair> = linked
            .iter()
            .filter(|pair| {
                member_ids.contains(&pair.submission1_id)
                    && member_ids.contains(&pair.submission2_id)
            })
            .collect();

        let average_similarity = group_pairs
            .iter()
            .map(|pair| pair.similarity_score)
            .sum::<f64>()
            / group_pairs.len().max(1) as f64;
        let risk_level = group_pairs
            .iter()
            .map(|pair| pair.risk_level)
            .max()
            .unwrap_or(RiskLevel::High);

        let times = members.iter().map(|&member| submissions[member].submitted_at);
        let (Some(earliest), Some(latest)) = (times.clone().min(), times.max()) else {
            continue;
        };

        let mut student_ids: Vec<String> =
            members.iter().map(|&member| submissions[member].student_id.clone()).collect();
        student_ids.sort();
        student_ids.dedup();

        groups.push(SuspiciousGroup {
            submission_ids: member_ids,
            student_ids,
            average_similarity,
            submission_time_span_minutes: minutes_between(latest, earliest),
            risk_level,
        });
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{cohort_submission, ScriptedSimilarity};

    fn detector(similarity: ScriptedSimilarity) -> CollusionDetector {
        CollusionDetector::new(Arc::new(similarity), CollusionPolicy::default())
    }

    #[tokio::test]
    async fn fewer_than_two_submissions_is_a_noop() {
        let detector = detector(ScriptedSimilarity::default());
        let cohort = vec![cohort_submission("s1", "alice", "text", 0)];

        let report = detector.detect("assign-1", "course-1", &cohort).await.expect("report");

        assert!(report.collusion_pairs.is_empty());
        assert!(report.suspicious_groups.is_empty());
        assert_eq!(report.overall_risk, RiskLevel::Low);
    }

    #[tokio::test]
    async fn near_identical_close_submissions_are_critical() {
        let mut similarity = ScriptedSimilarity::default();
        similarity.set_content("text-a", "text-b", 0.97);

        let cohort = vec![
            cohort_submission("s1", "alice", "text-a", 0),
            cohort_submission("s2", "bob", "text-b", 4),
        ];

        let report =
            detector(similarity).detect("assign-1", "course-1", &cohort).await.expect("report");

        assert_eq!(report.collusion_pairs.len(), 1);
        let pair = &report.collusion_pairs[0];
        assert_eq!(pair.risk_level, RiskLevel::Critical);
        assert_eq!(pair.timing_proximity_minutes, 4);
        assert_eq!(report.overall_risk, RiskLevel::Critical);
        assert_eq!(report.suspicious_groups.len(), 1);
    }

    #[tokio::test]
    async fn similarity_is_symmetric_across_submission_order() {
        let mut similarity = ScriptedSimilarity::default();
        similarity.set_content("text-a", "text-b", 0.91);

        let forward = vec![
            cohort_submission("s1", "alice", "text-a", 0),
            cohort_submission("s2", "bob", "text-b", 5),
        ];
        let reversed = vec![forward[1].clone(), forward[0].clone()];

        let first = detector(similarity.clone())
            .detect("assign-1", "course-1", &forward)
            .await
            .expect("report");
        let second = detector(similarity)
            .detect("assign-1", "course-1", &reversed)
            .await
            .expect("report");

        assert_eq!(
            first.collusion_pairs[0].similarity_score,
            second.collusion_pairs[0].similarity_score
        );
        assert_eq!(first.collusion_pairs[0].risk_level, second.collusion_pairs[0].risk_level);
    }

    #[tokio::test]
    async fn groups_form_by_transitive_closure() {
        let mut similarity = ScriptedSimilarity::default();
        similarity.set_content("text-a", "text-b", 0.92);
        similarity.set_content("text-b", "text-c", 0.85);
        similarity.set_content("text-a", "text-c", 0.2);

        let cohort = vec![
            cohort_submission("s1", "alice", "text-a", 0),
            cohort_submission("s2", "bob", "text-b", 10),
            cohort_submission("s3", "carol", "text-c", 25),
        ];

        let report =
            detector(similarity).detect("assign-1", "course-1", &cohort).await.expect("report");

        assert_eq!(report.suspicious_groups.len(), 1);
        let group = &report.suspicious_groups[0];
        assert_eq!(group.submission_ids.len(), 3);
        assert_eq!(group.student_ids, vec!["alice", "bob", "carol"]);
        assert_eq!(group.risk_level, RiskLevel::Critical);
        assert_eq!(group.submission_time_span_minutes, 25);
    }

    #[tokio::test]
    async fn low_similarity_cohort_has_no_groups() {
        let mut similarity = ScriptedSimilarity::default();
        similarity.set_content("text-a", "text-b", 0.3);

        let cohort = vec![
            cohort_submission("s1", "alice", "text-a", 0),
            cohort_submission("s2", "bob", "text-b", 200),
        ];

        let report =
            detector(similarity).detect("assign-1", "course-1", &cohort).await.expect("report");

        assert_eq!(report.collusion_pairs.len(), 1);
        assert_eq!(report.collusion_pairs[0].risk_level, RiskLevel::Low);
        assert!(report.suspicious_groups.is_empty());
        assert_eq!(report.overall_risk, RiskLevel::Low);
    }

    #[test]
    fn classification_is_monotonic_in_similarity() {
        let policy = CollusionPolicy::default();
        assert!(policy.classify_pair(0.95, 5) >= policy.classify_pair(0.70, 5));
        assert_eq!(policy.classify_pair(0.95, 5), RiskLevel::Critical);
        assert_eq!(policy.classify_pair(0.70, 5), RiskLevel::Medium);
        // Outside the window, critical similarity still reads as high.
        assert_eq!(policy.classify_pair(0.95, 300), RiskLevel::High);
    }
}
