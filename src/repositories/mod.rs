pub(crate) mod answers;
pub(crate) mod course_tests;
pub(crate) mod enrollments;
pub(crate) mod health;
pub(crate) mod questions;
pub(crate) mod student_answers;
pub(crate) mod submissions;
