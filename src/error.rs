//! Error types for definition building, parsing and validation.

use thiserror::Error;

use crate::field::FieldName;

/// Errors raised while building a dialect or turning text into a [`Cron`](crate::Cron).
///
/// An exhausted schedule is not an error: the execution-time queries return
/// `None` for it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CronError {
    /// The dialect definition is malformed or incomplete.
    #[error("invalid cron definition: {message}")]
    Configuration {
        /// What is wrong with the definition.
        message: String,
    },

    /// The expression text is syntactically malformed.
    #[error("{}", describe_parse(.field, .token, .message))]
    Parse {
        /// Field being parsed, `None` for whole-expression problems such as field count.
        field: Option<FieldName>,
        /// Offending substring.
        token: String,
        /// Description of the failure.
        message: String,
    },

    /// The expression parsed but breaks a semantic rule of its dialect.
    #[error("invalid {field} field: {message}")]
    Validation {
        /// Field that violated the rule.
        field: FieldName,
        /// Description of the violated rule.
        message: String,
    },
}

fn describe_parse(field: &Option<FieldName>, token: &str, message: &str) -> String {
    match field {
        Some(field) => format!("failed to parse {field} field '{token}': {message}"),
        None => format!("failed to parse '{token}': {message}"),
    }
}

impl CronError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        CronError::Configuration { message: message.into() }
    }

    /// True for [`CronError::Configuration`].
    pub fn is_configuration(&self) -> bool {
        matches!(self, CronError::Configuration { .. })
    }

    /// True for [`CronError::Parse`].
    pub fn is_parse(&self) -> bool {
        matches!(self, CronError::Parse { .. })
    }

    /// True for [`CronError::Validation`].
    pub fn is_validation(&self) -> bool {
        matches!(self, CronError::Validation { .. })
    }

    /// Field the error refers to, when there is one.
    pub fn field(&self) -> Option<FieldName> {
        match self {
            CronError::Configuration { .. } => None,
            CronError::Parse { field, .. } => *field,
            CronError::Validation { field, .. } => Some(*field),
        }
    }
}

/// Result type for cron operations.
pub type CronResult<T> = std::result::Result<T, CronError>;
