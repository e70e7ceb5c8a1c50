//! Attempt lifecycle: OPEN on creation, COMPLETED once `end_time` is set.
//! Every write that touches more than one row runs in a transaction that
//! first locks the submission.

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::metrics;
use crate::core::time::{minutes_between, primitive_now_utc};
use crate::db::models::{Answer, StudentAnswer, StudentSubmission};
use crate::repositories;
use crate::repositories::submissions::SubmissionContext;
use crate::services::errors::{AssessmentError, AssessmentResult};
use crate::services::grading::{self, GradeOutcome, StudentResponse};
use crate::services::score_aggregator;

/// Submission with the ids resolved when it was read.
#[derive(Debug, Clone)]
pub(crate) struct SubmissionView {
    pub(crate) submission: StudentSubmission,
    pub(crate) course_id: String,
    pub(crate) answers: Vec<StudentAnswer>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RegradeSummary {
    pub(crate) regraded: usize,
    pub(crate) deferred: usize,
    pub(crate) score: i32,
}

pub(crate) async fn create_submission(
    pool: &PgPool,
    student_id: &str,
    test_id: &str,
) -> AssessmentResult<StudentSubmission> {
    if !repositories::course_tests::exists(pool, test_id).await? {
        return Err(AssessmentError::not_found("Test"));
    }

    let submission = repositories::submissions::create(
        pool,
        repositories::submissions::CreateSubmission {
            id: &Uuid::new_v4().to_string(),
            student_id,
            test_id,
            start_time: primitive_now_utc(),
        },
    )
    .await?;

    metrics::record_submission_created();
    tracing::info!(
        submission_id = %submission.id,
        student_id,
        test_id,
        "submission started"
    );

    Ok(submission)
}

pub(crate) async fn submission_context(
    pool: &PgPool,
    submission_id: &str,
) -> AssessmentResult<SubmissionContext> {
    repositories::submissions::find_context(pool, submission_id)
        .await?
        .ok_or_else(|| AssessmentError::not_found("Submission"))
}

pub(crate) async fn get_submission(
    pool: &PgPool,
    submission_id: &str,
) -> AssessmentResult<SubmissionView> {
    let context = submission_context(pool, submission_id).await?;
    let submission = repositories::submissions::find_by_id(pool, submission_id)
        .await?
        .ok_or_else(|| AssessmentError::not_found("Submission"))?;
    let answers = repositories::student_answers::list_by_submission(pool, submission_id).await?;

    Ok(SubmissionView { submission, course_id: context.course_id, answers })
}

pub(crate) async fn list_submissions_for_test(
    pool: &PgPool,
    test_id: &str,
    skip: i64,
    limit: i64,
) -> AssessmentResult<(Vec<StudentSubmission>, i64)> {
    let items = repositories::submissions::list_by_test(pool, test_id, skip, limit).await?;
    let total = repositories::submissions::count_by_test(pool, test_id).await?;
    Ok((items, total))
}

pub(crate) async fn list_submissions_for_student(
    pool: &PgPool,
    student_id: &str,
    test_id: Option<&str>,
) -> AssessmentResult<Vec<StudentSubmission>> {
    Ok(repositories::submissions::list_by_student(pool, student_id, test_id).await?)
}

/// Grades and stores one response. Re-recording the same question replaces
/// the earlier response. The submission total is left as is until the next
/// complete, review, regrade or score call.
pub(crate) async fn record_answer(
    pool: &PgPool,
    submission_id: &str,
    question_id: &str,
    response: StudentResponse,
) -> AssessmentResult<StudentAnswer> {
    let mut tx = pool.begin().await?;

    let submission = repositories::submissions::lock_by_id(&mut *tx, submission_id)
        .await?
        .ok_or_else(|| AssessmentError::not_found("Submission"))?;

    // Questions of other tests are reported as missing.
    let question = repositories::questions::find_by_id(&mut *tx, question_id)
        .await?
        .filter(|question| question.test_id == submission.test_id)
        .ok_or_else(|| AssessmentError::not_found("Question"))?;

    response.validate_for(question.question_type)?;

    let answers = repositories::answers::list_by_question(&mut *tx, question_id).await?;
    let outcome = grading::grade(question.question_type, question.points, &answers, &response);

    let stored = repositories::student_answers::upsert(
        &mut *tx,
        repositories::student_answers::UpsertStudentAnswer {
            id: &Uuid::new_v4().to_string(),
            submission_id,
            question_id,
            answer_text: &response.to_stored(),
            is_correct: outcome.is_correct(),
            score: outcome.score(),
            now: primitive_now_utc(),
        },
    )
    .await?;

    tx.commit().await?;

    metrics::record_answer_graded(question.question_type.as_str(), outcome.label());
    tracing::debug!(
        submission_id,
        question_id,
        outcome = outcome.label(),
        "answer recorded"
    );

    Ok(stored)
}

/// Closes the attempt (first call only) and recomputes its score. Calling it
/// again keeps the original `end_time`.
pub(crate) async fn complete_submission(
    pool: &PgPool,
    submission_id: &str,
) -> AssessmentResult<StudentSubmission> {
    let mut tx = pool.begin().await?;

    let before = repositories::submissions::lock_by_id(&mut *tx, submission_id)
        .await?
        .ok_or_else(|| AssessmentError::not_found("Submission"))?;

    repositories::submissions::complete(&mut *tx, submission_id, primitive_now_utc())
        .await?
        .ok_or_else(|| AssessmentError::not_found("Submission"))?;
    let score = score_aggregator::recalculate(&mut *tx, submission_id).await?;

    let completed = repositories::submissions::find_by_id(&mut *tx, submission_id)
        .await?
        .ok_or_else(|| AssessmentError::not_found("Submission"))?;

    tx.commit().await?;

    if before.end_time.is_none() {
        let minutes = completed
            .end_time
            .map(|end_time| minutes_between(completed.start_time, end_time))
            .unwrap_or_default();
        metrics::record_submission_completed(minutes);
        tracing::info!(submission_id, score, duration_minutes = minutes, "submission completed");
    }

    Ok(completed)
}

/// Manual override. The submission total is left as is until the next
/// complete, review or score call.
pub(crate) async fn mark_answer_as_correct(
    pool: &PgPool,
    student_answer_id: &str,
    is_correct: bool,
) -> AssessmentResult<StudentAnswer> {
    let context = repositories::student_answers::find_context(pool, student_answer_id)
        .await?
        .ok_or_else(|| AssessmentError::not_found("Student answer"))?;

    let score = if is_correct { context.points } else { 0 };
    let updated = repositories::student_answers::set_outcome(
        pool,
        student_answer_id,
        is_correct,
        score,
        primitive_now_utc(),
    )
    .await?
    .ok_or_else(|| AssessmentError::not_found("Student answer"))?;

    tracing::info!(
        student_answer_id,
        submission_id = %context.submission_id,
        question_id = %context.question_id,
        question_type = context.question_type.as_str(),
        is_correct,
        "answer graded manually"
    );

    Ok(updated)
}

/// Re-runs auto grading over every stored response, then recomputes the
/// total. Deferred question types keep their manual outcome.
pub(crate) async fn regrade_submission(
    pool: &PgPool,
    submission_id: &str,
) -> AssessmentResult<RegradeSummary> {
    let mut tx = pool.begin().await?;

    repositories::submissions::lock_by_id(&mut *tx, submission_id)
        .await?
        .ok_or_else(|| AssessmentError::not_found("Submission"))?;

    let stored =
        repositories::student_answers::list_by_submission(&mut *tx, submission_id).await?;
    let question_ids: Vec<String> =
        stored.iter().map(|answer| answer.question_id.clone()).collect();
    let questions: HashMap<String, _> =
        repositories::questions::list_by_ids(&mut *tx, &question_ids)
            .await?
            .into_iter()
            .map(|question| (question.id.clone(), question))
            .collect();

    let mut answer_sets: HashMap<String, Vec<Answer>> = HashMap::new();
    for answer in repositories::answers::list_by_questions(&mut *tx, &question_ids).await? {
        answer_sets.entry(answer.question_id.clone()).or_default().push(answer);
    }

    let now = primitive_now_utc();
    let mut regraded = 0;
    let mut deferred = 0;
    for student_answer in &stored {
        let Some(question) = questions.get(&student_answer.question_id) else {
            continue;
        };
        let response =
            StudentResponse::from_stored(question.question_type, &student_answer.answer_text);
        let answers = answer_sets.get(&question.id).map(Vec::as_slice).unwrap_or_default();

        match grading::grade(question.question_type, question.points, answers, &response) {
            GradeOutcome::Graded { is_correct, score } => {
                repositories::student_answers::set_outcome(
                    &mut *tx,
                    &student_answer.id,
                    is_correct,
                    score,
                    now,
                )
                .await?;
                regraded += 1;
            }
            GradeOutcome::Deferred => deferred += 1,
        }
    }

    let score = score_aggregator::recalculate(&mut *tx, submission_id).await?;
    tx.commit().await?;

    tracing::info!(submission_id, regraded, deferred, score, "submission regraded");
    Ok(RegradeSummary { regraded, deferred, score })
}

pub(crate) async fn review_submission(
    pool: &PgPool,
    submission_id: &str,
) -> AssessmentResult<StudentSubmission> {
    let mut tx = pool.begin().await?;

    repositories::submissions::lock_by_id(&mut *tx, submission_id)
        .await?
        .ok_or_else(|| AssessmentError::not_found("Submission"))?;
    repositories::submissions::mark_reviewed(&mut *tx, submission_id, primitive_now_utc()).await?;
    let score = score_aggregator::recalculate(&mut *tx, submission_id).await?;

    let reviewed = repositories::submissions::find_by_id(&mut *tx, submission_id)
        .await?
        .ok_or_else(|| AssessmentError::not_found("Submission"))?;
    tx.commit().await?;

    tracing::info!(submission_id, score, "submission reviewed");
    Ok(reviewed)
}

pub(crate) async fn delete_submission(pool: &PgPool, submission_id: &str) -> AssessmentResult<()> {
    if !repositories::submissions::delete_by_id(pool, submission_id).await? {
        return Err(AssessmentError::not_found("Submission"));
    }
    tracing::info!(submission_id, "submission deleted");
    Ok(())
}
