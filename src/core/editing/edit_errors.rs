// Error taxonomy for the text substitution engine.
//
// Every message here is read by an automated client, not a human looking at
// logs, so each one says what was wrong and what to try next. The wording is
// part of the tool contract.

use std::fmt;
use thiserror::Error;

/// What a substitution is aimed at. Only used to phrase error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    Document,
    Cell(String),
    Range(String),
    File(String),
}

impl fmt::Display for EditTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditTarget::Document => write!(f, "document"),
            EditTarget::Cell(cell) => write!(f, "cell {}", cell),
            EditTarget::Range(range) => write!(f, "range {}", range),
            EditTarget::File(name) => write!(f, "file \"{}\"", name),
        }
    }
}

/// Coarse classification of an [`EditError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AmbiguousMatch,
    InvalidArgument,
    UpstreamFailure,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error(
        "old_text not found in {target}. Make sure the text exists exactly as specified, \
         including whitespace and punctuation."
    )]
    TextNotFound { target: EditTarget },

    #[error(
        "Position text not found in document. Make sure the text exists exactly as specified."
    )]
    AnchorNotFound { anchor: String },

    #[error("Section \"{identifier}\" not found. Available sections: {}", .available.join(", "))]
    SectionNotFound {
        identifier: String,
        available: Vec<String>,
    },

    #[error("Section index {index} not found. Document has {count} sections.")]
    SectionIndexOutOfRange { index: usize, count: usize },

    #[error("File \"{name}\" not found in script. Available files: {}", .available.join(", "))]
    FileNotFound { name: String, available: Vec<String> },

    #[error("Cell {cell} is empty. Cannot perform text replacement on empty cell.")]
    EmptyCell { cell: String },

    #[error(
        "old_text appears {count} times in {target}. The edit will fail because old_text must \
         be unique. Either include more surrounding context to make it unique, or set \
         replace_all to true to replace all {count} occurrences."
    )]
    AmbiguousMatch { target: EditTarget, count: usize },

    #[error("{0}")]
    InvalidArgument(String),

    #[error("Upstream API error: {0}")]
    Upstream(String),
}

/// Failure talking to a Google REST API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("{status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl From<ApiError> for EditError {
    fn from(err: ApiError) -> Self {
        EditError::Upstream(err.to_string())
    }
}

impl EditError {
    pub fn invalid(message: impl Into<String>) -> Self {
        EditError::InvalidArgument(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            EditError::TextNotFound { .. }
            | EditError::AnchorNotFound { .. }
            | EditError::SectionNotFound { .. }
            | EditError::SectionIndexOutOfRange { .. }
            | EditError::FileNotFound { .. }
            | EditError::EmptyCell { .. } => ErrorKind::NotFound,
            EditError::AmbiguousMatch { .. } => ErrorKind::AmbiguousMatch,
            EditError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            EditError::Upstream(_) => ErrorKind::UpstreamFailure,
        }
    }

    /// Number of matches found, for ambiguous-match failures.
    pub fn match_count(&self) -> Option<usize> {
        match self {
            EditError::AmbiguousMatch { count, .. } => Some(*count),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguous_message_names_count_and_remedy() {
        let err = EditError::AmbiguousMatch {
            target: EditTarget::Document,
            count: 3,
        };
        let msg = err.to_string();
        assert!(msg.starts_with("old_text appears 3 times in document."));
        assert!(msg.contains("set replace_all to true to replace all 3 occurrences"));
        assert_eq!(err.kind(), ErrorKind::AmbiguousMatch);
        assert_eq!(err.match_count(), Some(3));
    }

    #[test]
    fn test_targets_are_phrased_per_system() {
        let cell = EditError::TextNotFound {
            target: EditTarget::Cell("B2".to_string()),
        };
        assert!(cell.to_string().starts_with("old_text not found in cell B2."));

        let file = EditError::TextNotFound {
            target: EditTarget::File("Code".to_string()),
        };
        assert!(file.to_string().contains("in file \"Code\""));
        assert_eq!(file.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_section_not_found_lists_available_names() {
        let err = EditError::SectionNotFound {
            identifier: "Budget".to_string(),
            available: vec!["Intro".to_string(), "Plan".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Section \"Budget\" not found. Available sections: Intro, Plan"
        );
    }

    #[test]
    fn test_api_errors_become_upstream_failures() {
        let err: EditError = ApiError::Status {
            status: 404,
            body: "Requested entity was not found.".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::UpstreamFailure);
        assert_eq!(
            err.to_string(),
            "Upstream API error: 404: Requested entity was not found."
        );
    }
}
