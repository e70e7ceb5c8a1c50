use serde::{Deserialize, Serialize};

use crate::services::statistics::{QuestionStatistics, ScoreBucket, TestStatistics};

#[derive(Debug, Deserialize, Default)]
pub(crate) struct TestStatisticsQuery {
    pub(crate) threshold_percent: Option<f64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ScoreBucketResponse {
    pub(crate) range: &'static str,
    pub(crate) count: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct TestStatisticsResponse {
    pub(crate) test_id: String,
    pub(crate) submission_count: usize,
    pub(crate) student_count: usize,
    pub(crate) max_possible_points: i64,
    pub(crate) average_score: f64,
    pub(crate) threshold_percent: f64,
    pub(crate) success_rate: f64,
    pub(crate) score_distribution: Vec<ScoreBucketResponse>,
    pub(crate) average_completion_minutes: f64,
    pub(crate) incomplete_attempts_count: usize,
}

impl TestStatisticsResponse {
    pub(crate) fn from_stats(stats: TestStatistics) -> Self {
        Self {
            test_id: stats.test_id,
            submission_count: stats.submission_count,
            student_count: stats.student_count,
            max_possible_points: stats.max_possible_points,
            average_score: round2(stats.average_score),
            threshold_percent: stats.threshold_percent,
            success_rate: round2(stats.success_rate),
            score_distribution: stats
                .score_distribution
                .into_iter()
                .map(|ScoreBucket { range, count }| ScoreBucketResponse { range, count })
                .collect(),
            average_completion_minutes: round2(stats.average_completion_minutes),
            incomplete_attempts_count: stats.incomplete_attempts_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionStatisticsResponse {
    pub(crate) question_id: String,
    pub(crate) total_attempts: usize,
    pub(crate) correct_count: usize,
    pub(crate) average_score: f64,
    pub(crate) success_rate: f64,
}

impl QuestionStatisticsResponse {
    pub(crate) fn from_stats(stats: QuestionStatistics) -> Self {
        Self {
            question_id: stats.question_id,
            total_attempts: stats.total_attempts,
            correct_count: stats.correct_count,
            average_score: round2(stats.average_score),
            success_rate: round2(stats.success_rate),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
