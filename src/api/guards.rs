use async_trait::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::{header, request::Parts};

use crate::api::errors::ApiError;
use crate::core::security::{self, CallerRole};
use crate::core::state::AppState;
use crate::repositories;
use crate::repositories::course_tests::TestOwnership;
use crate::repositories::submissions::SubmissionContext;

/// Identity carried by the bearer token. Users live in the auth service; the
/// token is trusted once its signature and expiry check out.
#[derive(Debug, Clone)]
pub(crate) struct Caller {
    pub(crate) id: String,
    pub(crate) role: CallerRole,
}

impl Caller {
    pub(crate) fn is_admin(&self) -> bool {
        self.role == CallerRole::Admin
    }
}

pub(crate) struct CurrentUser(pub(crate) Caller);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let State(app_state) = State::<AppState>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to access application state"))?;

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let claims = security::verify_token(token, app_state.settings())
            .map_err(|_| ApiError::Unauthorized("Invalid authentication credentials"))?;

        if claims.sub.is_empty() {
            return Err(ApiError::Unauthorized("Invalid authentication credentials"));
        }

        Ok(CurrentUser(Caller { id: claims.sub, role: claims.role }))
    }
}

pub(crate) async fn require_test_owner(
    state: &AppState,
    caller: &Caller,
    test_id: &str,
) -> Result<TestOwnership, ApiError> {
    if caller.role == CallerRole::Student {
        return Err(ApiError::Forbidden("Teacher access required"));
    }

    let ownership = repositories::course_tests::find_ownership(state.db(), test_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to resolve test owner"))?
        .ok_or_else(|| ApiError::NotFound("Test not found".to_string()))?;

    if caller.is_admin() || ownership.teacher_id == caller.id {
        Ok(ownership)
    } else {
        Err(ApiError::Forbidden("Not enough permissions for this test"))
    }
}

pub(crate) async fn require_enrollment(
    state: &AppState,
    caller: &Caller,
    test_id: &str,
) -> Result<TestOwnership, ApiError> {
    let ownership = repositories::course_tests::find_ownership(state.db(), test_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to resolve test course"))?
        .ok_or_else(|| ApiError::NotFound("Test not found".to_string()))?;

    if caller.is_admin() {
        return Ok(ownership);
    }

    let enrolled =
        repositories::enrollments::is_enrolled(state.db(), &ownership.course_id, &caller.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to check enrollment"))?;

    if enrolled {
        Ok(ownership)
    } else {
        Err(ApiError::Forbidden("Enrollment required for this course"))
    }
}

pub(crate) fn require_submission_student(
    caller: &Caller,
    context: &SubmissionContext,
) -> Result<(), ApiError> {
    if caller.is_admin() || context.student_id == caller.id {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Not your submission"))
    }
}

pub(crate) fn require_course_teacher(caller: &Caller, teacher_id: &str) -> Result<(), ApiError> {
    if caller.is_admin() || (caller.role == CallerRole::Teacher && caller.id == teacher_id) {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Not enough permissions for this submission"))
    }
}

pub(crate) fn require_submission_teacher(
    caller: &Caller,
    context: &SubmissionContext,
) -> Result<(), ApiError> {
    require_course_teacher(caller, &context.teacher_id)
}

/// Either the student who owns the attempt or the teacher who owns the test.
pub(crate) fn require_submission_reader(
    caller: &Caller,
    context: &SubmissionContext,
) -> Result<(), ApiError> {
    require_submission_student(caller, context)
        .or_else(|_| require_submission_teacher(caller, context))
}
