//! Questions and their answer sets. All answer-set mutations of one question
//! run under a row lock on that question so the single-choice rule holds
//! under concurrent writers.

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::time::primitive_now_utc;
use crate::db::models::{Answer, Question};
use crate::db::types::QuestionType;
use crate::repositories;
use crate::services::errors::{AssessmentError, AssessmentResult};

pub(crate) const DEFAULT_POINTS: i32 = 1;

const SINGLE_CHOICE_CONFLICT: &str =
    "only one correct answer permitted for a single-choice question";

#[derive(Debug, Clone)]
pub(crate) struct NewQuestion {
    pub(crate) text: String,
    pub(crate) question_type: QuestionType,
    pub(crate) points: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct QuestionChanges {
    pub(crate) text: Option<String>,
    pub(crate) question_type: Option<QuestionType>,
    pub(crate) points: Option<i32>,
}

#[derive(Debug, Clone)]
pub(crate) struct QuestionWithAnswers {
    pub(crate) question: Question,
    pub(crate) answers: Vec<Answer>,
}

pub(crate) fn normalize_points(points: Option<i32>) -> i32 {
    match points {
        Some(value) if value > 0 => value,
        _ => DEFAULT_POINTS,
    }
}

/// True when writing one more correct answer would break the single-choice rule.
pub(crate) fn violates_single_choice(
    question_type: QuestionType,
    is_correct: bool,
    other_correct_answers: i64,
) -> bool {
    question_type == QuestionType::SingleChoice && is_correct && other_correct_answers > 0
}

pub(crate) async fn create_question(
    pool: &PgPool,
    test_id: &str,
    new_question: NewQuestion,
) -> AssessmentResult<Question> {
    if !repositories::course_tests::exists(pool, test_id).await? {
        return Err(AssessmentError::not_found("Test"));
    }

    let question = repositories::questions::create(
        pool,
        repositories::questions::CreateQuestion {
            id: &Uuid::new_v4().to_string(),
            test_id,
            text: &new_question.text,
            question_type: new_question.question_type,
            points: normalize_points(new_question.points),
            created_at: primitive_now_utc(),
        },
    )
    .await?;

    tracing::info!(
        question_id = %question.id,
        test_id = %question.test_id,
        question_type = question.question_type.as_str(),
        "question created"
    );

    Ok(question)
}

pub(crate) async fn get_question(
    pool: &PgPool,
    question_id: &str,
) -> AssessmentResult<QuestionWithAnswers> {
    let question = repositories::questions::find_by_id(pool, question_id)
        .await?
        .ok_or_else(|| AssessmentError::not_found("Question"))?;
    let answers = repositories::answers::list_by_question(pool, &question.id).await?;

    Ok(QuestionWithAnswers { question, answers })
}

pub(crate) async fn list_questions(
    pool: &PgPool,
    test_id: &str,
) -> AssessmentResult<Vec<QuestionWithAnswers>> {
    if !repositories::course_tests::exists(pool, test_id).await? {
        return Err(AssessmentError::not_found("Test"));
    }

    let questions = repositories::questions::list_by_test(pool, test_id).await?;
    let ids: Vec<String> = questions.iter().map(|question| question.id.clone()).collect();
    let mut by_question: HashMap<String, Vec<Answer>> = HashMap::new();
    for answer in repositories::answers::list_by_questions(pool, &ids).await? {
        by_question.entry(answer.question_id.clone()).or_default().push(answer);
    }

    Ok(questions
        .into_iter()
        .map(|question| {
            let answers = by_question.remove(&question.id).unwrap_or_default();
            QuestionWithAnswers { question, answers }
        })
        .collect())
}

pub(crate) async fn update_question(
    pool: &PgPool,
    question_id: &str,
    changes: QuestionChanges,
) -> AssessmentResult<Question> {
    let mut tx = pool.begin().await?;

    let current = repositories::questions::lock_by_id(&mut *tx, question_id)
        .await?
        .ok_or_else(|| AssessmentError::not_found("Question"))?;

    if changes.question_type == Some(QuestionType::SingleChoice)
        && current.question_type != QuestionType::SingleChoice
    {
        let correct = repositories::answers::count_correct(&mut *tx, question_id, None).await?;
        if correct > 1 {
            tracing::info!(
                question_id,
                correct_answers = correct,
                "rejected switch to single choice"
            );
            return Err(AssessmentError::Conflict(SINGLE_CHOICE_CONFLICT.to_string()));
        }
    }

    let now = primitive_now_utc();
    let updated = repositories::questions::update(
        &mut *tx,
        question_id,
        repositories::questions::UpdateQuestion {
            text: changes.text,
            question_type: changes.question_type,
            points: changes.points.map(|points| normalize_points(Some(points))),
            updated_at: now,
        },
    )
    .await?;

    if updated.points != current.points {
        let rescored = repositories::student_answers::rescore_for_question(
            &mut *tx,
            question_id,
            updated.points,
            now,
        )
        .await?;
        tracing::info!(question_id, points = updated.points, rescored, "question points changed");
    }

    tx.commit().await?;
    Ok(updated)
}

pub(crate) async fn delete_question(pool: &PgPool, question_id: &str) -> AssessmentResult<()> {
    if !repositories::questions::delete_by_id(pool, question_id).await? {
        return Err(AssessmentError::not_found("Question"));
    }
    tracing::info!(question_id, "question deleted");
    Ok(())
}

pub(crate) async fn get_answer(pool: &PgPool, answer_id: &str) -> AssessmentResult<Answer> {
    repositories::answers::find_by_id(pool, answer_id)
        .await?
        .ok_or_else(|| AssessmentError::not_found("Answer"))
}

pub(crate) async fn list_answers(
    pool: &PgPool,
    question_id: &str,
) -> AssessmentResult<Vec<Answer>> {
    Ok(get_question(pool, question_id).await?.answers)
}

pub(crate) async fn add_answer(
    pool: &PgPool,
    question_id: &str,
    text: &str,
    is_correct: bool,
) -> AssessmentResult<Answer> {
    let mut tx = pool.begin().await?;

    let question = repositories::questions::lock_by_id(&mut *tx, question_id)
        .await?
        .ok_or_else(|| AssessmentError::not_found("Question"))?;

    if is_correct && question.question_type == QuestionType::SingleChoice {
        let existing = repositories::answers::count_correct(&mut *tx, question_id, None).await?;
        if violates_single_choice(question.question_type, is_correct, existing) {
            tracing::info!(question_id, "rejected second correct answer");
            return Err(AssessmentError::Conflict(SINGLE_CHOICE_CONFLICT.to_string()));
        }
    }

    let answer = repositories::answers::create(
        &mut *tx,
        repositories::answers::CreateAnswer {
            id: &Uuid::new_v4().to_string(),
            question_id,
            text,
            is_correct,
            created_at: primitive_now_utc(),
        },
    )
    .await?;

    tx.commit().await?;
    Ok(answer)
}

pub(crate) async fn update_answer(
    pool: &PgPool,
    answer_id: &str,
    text: &str,
    is_correct: bool,
) -> AssessmentResult<Answer> {
    let current = get_answer(pool, answer_id).await?;
    let mut tx = pool.begin().await?;

    let question = repositories::questions::lock_by_id(&mut *tx, &current.question_id)
        .await?
        .ok_or_else(|| AssessmentError::not_found("Question"))?;

    if is_correct && question.question_type == QuestionType::SingleChoice {
        let others =
            repositories::answers::count_correct(&mut *tx, &question.id, Some(answer_id)).await?;
        if violates_single_choice(question.question_type, is_correct, others) {
            tracing::info!(question_id = %question.id, answer_id, "rejected second correct answer");
            return Err(AssessmentError::Conflict(SINGLE_CHOICE_CONFLICT.to_string()));
        }
    }

    // The answer may have been deleted since it was first read.
    let answer =
        repositories::answers::update(&mut *tx, answer_id, text, is_correct, primitive_now_utc())
            .await?
            .ok_or_else(|| AssessmentError::not_found("Answer"))?;

    tx.commit().await?;
    Ok(answer)
}

pub(crate) async fn delete_answer(pool: &PgPool, answer_id: &str) -> AssessmentResult<()> {
    if !repositories::answers::delete_by_id(pool, answer_id).await? {
        return Err(AssessmentError::not_found("Answer"));
    }
    Ok(())
}

/// Creates the correct answer first, then each distractor. Answers are
/// committed one by one, so a failure keeps what was already created.
pub(crate) async fn create_single_choice_answers(
    pool: &PgPool,
    question_id: &str,
    correct: &str,
    incorrect: &[String],
) -> AssessmentResult<Vec<Answer>> {
    let mut created = Vec::with_capacity(incorrect.len() + 1);
    created.push(add_answer(pool, question_id, correct, true).await?);
    for text in incorrect {
        created.push(add_answer(pool, question_id, text, false).await?);
    }
    Ok(created)
}

pub(crate) async fn create_multiple_choice_answers(
    pool: &PgPool,
    question_id: &str,
    correct: &[String],
    incorrect: &[String],
) -> AssessmentResult<Vec<Answer>> {
    let mut created = Vec::with_capacity(correct.len() + incorrect.len());
    for text in correct {
        created.push(add_answer(pool, question_id, text, true).await?);
    }
    for text in incorrect {
        created.push(add_answer(pool, question_id, text, false).await?);
    }
    Ok(created)
}
