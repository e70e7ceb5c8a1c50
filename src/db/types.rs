use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "questiontype", rename_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum QuestionType {
    SingleChoice,
    MultipleChoice,
    TextInput,
    Essay,
    Coding,
}

/// Shape a student's response must take for a question type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResponseFamily {
    Choice,
    Text,
}

impl QuestionType {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::SingleChoice => "SINGLE_CHOICE",
            Self::MultipleChoice => "MULTIPLE_CHOICE",
            Self::TextInput => "TEXT_INPUT",
            Self::Essay => "ESSAY",
            Self::Coding => "CODING",
        }
    }

    pub(crate) fn family(self) -> ResponseFamily {
        match self {
            Self::SingleChoice | Self::MultipleChoice => ResponseFamily::Choice,
            Self::TextInput | Self::Essay | Self::Coding => ResponseFamily::Text,
        }
    }

    /// Essay and coding answers wait for a human reviewer.
    pub(crate) fn is_auto_graded(self) -> bool {
        !matches!(self, Self::Essay | Self::Coding)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum SubmissionState {
    Open,
    Completed,
}
