use axum::http::{Method, StatusCode};
use serde_json::json;

use super::{answer_choice, answer_text, create_question, seed_actors, start_submission};
use crate::core::security::CallerRole;
use crate::test_support::{self, send};

#[tokio::test]
async fn essay_waits_for_manual_grading() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };
    let actors = seed_actors(&ctx).await;
    let (essay_id, _) = create_question(
        &ctx,
        &actors,
        json!({"text": "Describe the Seine", "question_type": "ESSAY", "points": 4}),
        None,
    )
    .await;

    let submission_id = start_submission(&ctx, &actors).await;
    let (status, recorded) =
        answer_text(&ctx, &actors, &submission_id, &essay_id, "A long river.").await;
    assert_eq!(status, StatusCode::OK, "response: {recorded}");
    assert_eq!(recorded["is_correct"], false);
    assert_eq!(recorded["score"], 0);
    let student_answer_id = recorded["id"].as_str().expect("student answer id").to_string();

    let (status, _) = send(
        &ctx,
        Method::POST,
        &format!("/api/v1/student-answers/{student_answer_id}/grade"),
        &actors.student,
        Some(json!({"is_correct": true})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, graded) = send(
        &ctx,
        Method::POST,
        &format!("/api/v1/student-answers/{student_answer_id}/grade"),
        &actors.teacher,
        Some(json!({"is_correct": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "response: {graded}");
    assert_eq!(graded["score"], 4);

    let (_, view) = send(
        &ctx,
        Method::GET,
        &format!("/api/v1/submissions/{submission_id}"),
        &actors.teacher,
        None,
    )
    .await;
    assert_eq!(view["score"], 0);

    let (_, rewritten) =
        answer_text(&ctx, &actors, &submission_id, &essay_id, "A long river in France.").await;
    assert_eq!(rewritten["is_correct"], true);
    assert_eq!(rewritten["answer_text"], "A long river in France.");

    let (status, reviewed) = send(
        &ctx,
        Method::POST,
        &format!("/api/v1/submissions/{submission_id}/review"),
        &actors.teacher,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "response: {reviewed}");
    assert_eq!(reviewed["reviewed"], true);
    assert_eq!(reviewed["score"], 4);
}

#[tokio::test]
async fn changing_points_rescores_stored_answers() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };
    let actors = seed_actors(&ctx).await;
    let (text_id, _) = create_question(
        &ctx,
        &actors,
        json!({"text": "Capital of France?", "question_type": "TEXT_INPUT", "points": 2}),
        None,
    )
    .await;
    let (status, _) = send(
        &ctx,
        Method::POST,
        &format!("/api/v1/questions/{text_id}/answers"),
        &actors.teacher,
        Some(json!({"text": "Paris", "is_correct": true})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (essay_id, _) = create_question(
        &ctx,
        &actors,
        json!({"text": "Describe the Loire", "question_type": "ESSAY", "points": 3}),
        None,
    )
    .await;

    let submission_id = start_submission(&ctx, &actors).await;
    let (_, text) = answer_text(&ctx, &actors, &submission_id, &text_id, "Paris").await;
    assert_eq!(text["score"], 2);
    let (_, essay) = answer_text(&ctx, &actors, &submission_id, &essay_id, "Long.").await;
    let essay_answer_id = essay["id"].as_str().expect("student answer id").to_string();
    let (status, _) = send(
        &ctx,
        Method::POST,
        &format!("/api/v1/student-answers/{essay_answer_id}/grade"),
        &actors.teacher,
        Some(json!({"is_correct": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    for (question_id, points) in [(&text_id, 7), (&essay_id, 5)] {
        let (status, updated) = send(
            &ctx,
            Method::PATCH,
            &format!("/api/v1/questions/{question_id}"),
            &actors.teacher,
            Some(json!({"points": points})),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "response: {updated}");
        assert_eq!(updated["points"], points);
    }

    let (status, stats) = send(
        &ctx,
        Method::GET,
        &format!("/api/v1/questions/{text_id}/statistics"),
        &actors.teacher,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "response: {stats}");
    assert_eq!(stats["average_score"], 7.0);

    let (_, view) = send(
        &ctx,
        Method::GET,
        &format!("/api/v1/submissions/{submission_id}"),
        &actors.teacher,
        None,
    )
    .await;
    let mut scores: Vec<i64> = view["answers"]
        .as_array()
        .expect("answers")
        .iter()
        .map(|answer| answer["score"].as_i64().expect("score"))
        .collect();
    scores.sort_unstable();
    assert_eq!(scores, vec![5, 7]);

    let (status, total) = send(
        &ctx,
        Method::POST,
        &format!("/api/v1/submissions/{submission_id}/score"),
        &actors.teacher,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "response: {total}");
    assert_eq!(total["score"], 12);
}

#[tokio::test]
async fn regrade_follows_answer_key_changes() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };
    let actors = seed_actors(&ctx).await;
    let (question_id, answer_ids) = create_question(
        &ctx,
        &actors,
        json!({"text": "Capital of France?", "question_type": "SINGLE_CHOICE", "points": 10}),
        Some(("single-choice", json!({"correct": "Paris", "incorrect": ["Lyon"]}))),
    )
    .await;
    let (paris_id, lyon_id) = (answer_ids[0].as_str(), answer_ids[1].as_str());

    let submission_id = start_submission(&ctx, &actors).await;
    let (_, recorded) =
        answer_choice(&ctx, &actors, &submission_id, &question_id, &[lyon_id]).await;
    assert_eq!(recorded["is_correct"], false);

    for (answer_id, is_correct) in [(paris_id, false), (lyon_id, true)] {
        let (status, _) = send(
            &ctx,
            Method::PATCH,
            &format!("/api/v1/answers/{answer_id}"),
            &actors.teacher,
            Some(json!({"is_correct": is_correct})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let uri = format!("/api/v1/submissions/{submission_id}/regrade");
    let (status, summary) = send(&ctx, Method::POST, &uri, &actors.teacher, None).await;
    assert_eq!(status, StatusCode::OK, "response: {summary}");
    assert_eq!(summary["regraded"], 1);
    assert_eq!(summary["deferred"], 0);
    assert_eq!(summary["score"], 10);

    let (_, again) = send(&ctx, Method::POST, &uri, &actors.teacher, None).await;
    assert_eq!(again["score"], 10);

    let score_uri = format!("/api/v1/submissions/{submission_id}/score");
    let (status, first) = send(&ctx, Method::POST, &score_uri, &actors.teacher, None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, second) = send(&ctx, Method::POST, &score_uri, &actors.teacher, None).await;
    assert_eq!(first["score"], 10);
    assert_eq!(first, second);
}

#[tokio::test]
async fn teacher_lists_and_deletes_submissions() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };
    let actors = seed_actors(&ctx).await;
    let first = start_submission(&ctx, &actors).await;
    start_submission(&ctx, &actors).await;
    start_submission(&ctx, &actors).await;

    let list_uri = format!("/api/v1/tests/{}/submissions?skip=0&limit=2", actors.seeded.test_id);
    let (status, page) = send(&ctx, Method::GET, &list_uri, &actors.teacher, None).await;
    assert_eq!(status, StatusCode::OK, "response: {page}");
    assert_eq!(page["total_count"], 3);
    assert_eq!(page["items"].as_array().expect("items").len(), 2);
    assert_eq!(page["limit"], 2);

    let other = test_support::bearer_token("teacher-2", CallerRole::Teacher, ctx.state.settings());
    let (status, _) = send(&ctx, Method::GET, &list_uri, &other, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) =
        send(&ctx, Method::DELETE, &format!("/api/v1/submissions/{first}"), &other, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) =
        send(&ctx, Method::DELETE, &format!("/api/v1/submissions/{first}"), &actors.teacher, None)
            .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) =
        send(&ctx, Method::GET, &format!("/api/v1/submissions/{first}"), &actors.teacher, None)
            .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, page) = send(&ctx, Method::GET, &list_uri, &actors.teacher, None).await;
    assert_eq!(page["total_count"], 2);
}
