use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("could not understand date/time expression \"{fragment}\"")]
    UnparsableExpression { fragment: String },

    #[error("no reminder text left after removing date/time words")]
    EmptyMessage,

    #[error("conflicting recurrence clauses \"{first}\" and \"{second}\"")]
    AmbiguousRecurrence { first: String, second: String },
}

impl ParseError {
    pub(crate) fn unparsable(fragment: impl Into<String>) -> Self {
        ParseError::UnparsableExpression {
            fragment: fragment.into(),
        }
    }
}
