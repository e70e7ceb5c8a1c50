//! Read-only aggregates over a test's submissions and a question's answers.
//! Nothing is cached: each call rescans the rows.

use std::collections::HashSet;

use sqlx::PgPool;

use crate::core::time::minutes_between;
use crate::db::models::{StudentAnswer, StudentSubmission};
use crate::repositories;
use crate::services::errors::{AssessmentError, AssessmentResult};

/// Upper bounds (inclusive) of the percentage-of-max buckets.
const BUCKETS: [(&str, f64); 5] =
    [("0-20", 20.0), ("21-40", 40.0), ("41-60", 60.0), ("61-80", 80.0), ("81-100", 100.0)];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ScoreBucket {
    pub(crate) range: &'static str,
    pub(crate) count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TestStatistics {
    pub(crate) test_id: String,
    pub(crate) submission_count: usize,
    pub(crate) student_count: usize,
    pub(crate) max_possible_points: i64,
    pub(crate) average_score: f64,
    pub(crate) threshold_percent: f64,
    pub(crate) success_rate: f64,
    pub(crate) score_distribution: Vec<ScoreBucket>,
    pub(crate) average_completion_minutes: f64,
    pub(crate) incomplete_attempts_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct QuestionStatistics {
    pub(crate) question_id: String,
    pub(crate) total_attempts: usize,
    pub(crate) correct_count: usize,
    pub(crate) average_score: f64,
    pub(crate) success_rate: f64,
}

/// Submissions of one test plus the test's maximum attainable score.
#[derive(Debug, Clone)]
pub(crate) struct TestSnapshot {
    test_id: String,
    submissions: Vec<StudentSubmission>,
    max_possible_points: i64,
}

pub(crate) fn percentage_of_max(score: i32, max_possible_points: i64) -> f64 {
    if max_possible_points <= 0 {
        return 0.0;
    }
    (f64::from(score) / max_possible_points as f64 * 100.0).clamp(0.0, 100.0)
}

pub(crate) fn bucket_for(percent: f64) -> &'static str {
    BUCKETS
        .iter()
        .find(|(_, upper)| *upper >= percent)
        .map(|(range, _)| *range)
        .unwrap_or(BUCKETS[BUCKETS.len() - 1].0)
}

impl TestSnapshot {
    pub(crate) async fn load(pool: &PgPool, test_id: &str) -> AssessmentResult<Self> {
        if !repositories::course_tests::exists(pool, test_id).await? {
            return Err(AssessmentError::not_found("Test"));
        }

        let submissions = repositories::submissions::list_all_by_test(pool, test_id).await?;
        let max_possible_points = repositories::course_tests::max_points(pool, test_id).await?;

        Ok(Self::from_parts(test_id, submissions, max_possible_points))
    }

    pub(crate) fn from_parts(
        test_id: &str,
        submissions: Vec<StudentSubmission>,
        max_possible_points: i64,
    ) -> Self {
        Self { test_id: test_id.to_string(), submissions, max_possible_points }
    }

    pub(crate) fn student_count(&self) -> usize {
        self.submissions
            .iter()
            .map(|submission| submission.student_id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    pub(crate) fn average_score(&self) -> f64 {
        if self.submissions.is_empty() {
            return 0.0;
        }
        let total: i64 =
            self.submissions.iter().map(|submission| i64::from(submission.score)).sum();
        total as f64 / self.submissions.len() as f64
    }

    pub(crate) fn success_rate(&self, threshold_percent: f64) -> f64 {
        if self.submissions.is_empty() {
            return 0.0;
        }
        let required = threshold_percent / 100.0 * self.max_possible_points as f64;
        let passed = self
            .submissions
            .iter()
            .filter(|submission| f64::from(submission.score) >= required)
            .count();
        passed as f64 / self.submissions.len() as f64 * 100.0
    }

    pub(crate) fn score_distribution(&self) -> Vec<ScoreBucket> {
        let mut buckets: Vec<ScoreBucket> =
            BUCKETS.iter().map(|(range, _)| ScoreBucket { range: *range, count: 0 }).collect();

        for submission in &self.submissions {
            let range = bucket_for(percentage_of_max(submission.score, self.max_possible_points));
            if let Some(bucket) = buckets.iter_mut().find(|bucket| bucket.range == range) {
                bucket.count += 1;
            }
        }

        buckets
    }

    pub(crate) fn average_completion_minutes(&self) -> f64 {
        let durations: Vec<f64> = self
            .submissions
            .iter()
            .filter_map(|submission| {
                submission.end_time.map(|end_time| minutes_between(submission.start_time, end_time))
            })
            .collect();

        if durations.is_empty() {
            0.0
        } else {
            durations.iter().sum::<f64>() / durations.len() as f64
        }
    }

    pub(crate) fn incomplete_attempts_count(&self) -> usize {
        self.submissions.iter().filter(|submission| submission.end_time.is_none()).count()
    }

    pub(crate) fn summary(&self, threshold_percent: f64) -> TestStatistics {
        TestStatistics {
            test_id: self.test_id.clone(),
            submission_count: self.submissions.len(),
            student_count: self.student_count(),
            max_possible_points: self.max_possible_points,
            average_score: self.average_score(),
            threshold_percent,
            success_rate: self.success_rate(threshold_percent),
            score_distribution: self.score_distribution(),
            average_completion_minutes: self.average_completion_minutes(),
            incomplete_attempts_count: self.incomplete_attempts_count(),
        }
    }
}

/// All test-level views from a single scan.
pub(crate) async fn test_statistics(
    pool: &PgPool,
    test_id: &str,
    threshold_percent: f64,
) -> AssessmentResult<TestStatistics> {
    Ok(TestSnapshot::load(pool, test_id).await?.summary(threshold_percent))
}

pub(crate) fn summarize_question(
    question_id: &str,
    answers: &[StudentAnswer],
) -> QuestionStatistics {
    let total_attempts = answers.len();
    let correct_count = answers.iter().filter(|answer| answer.is_correct).count();

    let (average_score, success_rate) = if total_attempts == 0 {
        (0.0, 0.0)
    } else {
        let total: i64 = answers.iter().map(|answer| i64::from(answer.score)).sum();
        (
            total as f64 / total_attempts as f64,
            correct_count as f64 / total_attempts as f64 * 100.0,
        )
    };

    QuestionStatistics {
        question_id: question_id.to_string(),
        total_attempts,
        correct_count,
        average_score,
        success_rate,
    }
}

pub(crate) async fn question_statistics(
    pool: &PgPool,
    question_id: &str,
) -> AssessmentResult<QuestionStatistics> {
    repositories::questions::find_by_id(pool, question_id)
        .await?
        .ok_or_else(|| AssessmentError::not_found("Question"))?;

    let answers = repositories::student_answers::list_by_question(pool, question_id).await?;
    Ok(summarize_question(question_id, &answers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Duration, PrimitiveDateTime};

    use crate::core::time::primitive_now_utc;

    fn submission(
        student_id: &str,
        score: i32,
        start_time: PrimitiveDateTime,
        minutes: Option<i64>,
    ) -> StudentSubmission {
        StudentSubmission {
            id: format!("{student_id}-{score}"),
            student_id: student_id.to_string(),
            test_id: "test-1".to_string(),
            start_time,
            end_time: minutes.map(|minutes| start_time + Duration::minutes(minutes)),
            score,
            reviewed: false,
            created_at: start_time,
            updated_at: start_time,
        }
    }

    fn student_answer(is_correct: bool, score: i32) -> StudentAnswer {
        let now = primitive_now_utc();
        StudentAnswer {
            id: format!("sa-{is_correct}-{score}"),
            submission_id: "s1".to_string(),
            question_id: "q1".to_string(),
            answer_text: "x".to_string(),
            is_correct,
            score,
            created_at: now,
            updated_at: now,
        }
    }

    fn counts(buckets: &[ScoreBucket]) -> Vec<usize> {
        buckets.iter().map(|bucket| bucket.count).collect()
    }

    #[test]
    fn buckets_use_first_upper_bound_not_below_percentage() {
        assert_eq!(bucket_for(0.0), "0-20");
        assert_eq!(bucket_for(20.0), "0-20");
        assert_eq!(bucket_for(20.5), "21-40");
        assert_eq!(bucket_for(60.0), "41-60");
        assert_eq!(bucket_for(80.1), "81-100");
        assert_eq!(bucket_for(100.0), "81-100");
    }

    #[test]
    fn percentage_is_clamped_and_zero_without_points() {
        assert_eq!(percentage_of_max(5, 10), 50.0);
        assert_eq!(percentage_of_max(15, 10), 100.0);
        assert_eq!(percentage_of_max(-3, 10), 0.0);
        assert_eq!(percentage_of_max(7, 0), 0.0);
    }

    #[test]
    fn empty_test_reports_zeroes() {
        let stats = TestSnapshot::from_parts("test-1", Vec::new(), 10).summary(60.0);

        assert_eq!(stats.student_count, 0);
        assert_eq!(stats.average_score, 0.0);
        assert_eq!(stats.success_rate, 0.0);
        assert_eq!(stats.average_completion_minutes, 0.0);
        assert_eq!(stats.incomplete_attempts_count, 0);
        assert_eq!(counts(&stats.score_distribution), vec![0, 0, 0, 0, 0]);
        assert_eq!(
            stats.score_distribution.iter().map(|bucket| bucket.range).collect::<Vec<_>>(),
            vec!["0-20", "21-40", "41-60", "61-80", "81-100"]
        );
    }

    #[test]
    fn full_score_lands_in_top_bucket() {
        let start = primitive_now_utc();
        let snapshot =
            TestSnapshot::from_parts("test-1", vec![submission("alice", 10, start, Some(5))], 10);

        assert_eq!(counts(&snapshot.score_distribution()), vec![0, 0, 0, 0, 1]);
        assert_eq!(snapshot.success_rate(60.0), 100.0);
    }

    #[test]
    fn aggregates_across_attempts() {
        let start = primitive_now_utc();
        let snapshot = TestSnapshot::from_parts(
            "test-1",
            vec![
                submission("alice", 2, start, Some(10)),
                submission("alice", 8, start, Some(20)),
                submission("bob", 6, start, None),
                submission("carol", 0, start, None),
            ],
            10,
        );

        assert_eq!(snapshot.student_count(), 3);
        assert_eq!(snapshot.average_score(), 4.0);
        assert_eq!(snapshot.success_rate(60.0), 50.0);
        assert_eq!(snapshot.average_completion_minutes(), 15.0);
        assert_eq!(snapshot.incomplete_attempts_count(), 2);
        assert_eq!(counts(&snapshot.score_distribution()), vec![2, 0, 1, 1, 0]);
    }

    #[test]
    fn zero_max_points_counts_everyone_as_zero_percent() {
        let start = primitive_now_utc();
        let snapshot =
            TestSnapshot::from_parts("test-1", vec![submission("alice", 0, start, None)], 0);

        assert_eq!(counts(&snapshot.score_distribution()), vec![1, 0, 0, 0, 0]);
    }

    #[test]
    fn question_summary_reports_attempts_and_success() {
        let answers =
            vec![student_answer(true, 5), student_answer(false, 0), student_answer(true, 5)];
        let stats = summarize_question("q1", &answers);

        assert_eq!(stats.total_attempts, 3);
        assert_eq!(stats.correct_count, 2);
        assert!((stats.average_score - 10.0 / 3.0).abs() < 1e-9);
        assert!((stats.success_rate - 200.0 / 3.0).abs() < 1e-9);

        let empty = summarize_question("q1", &[]);
        assert_eq!(empty.total_attempts, 0);
        assert_eq!(empty.success_rate, 0.0);
    }
}
