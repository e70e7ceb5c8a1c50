pub(crate) mod errors;
pub(crate) mod grading;
pub(crate) mod question_bank;
pub(crate) mod score_aggregator;
pub(crate) mod statistics;
pub(crate) mod submission_lifecycle;
