use serde::Serialize;

use crate::{
    expectation::{build_message, describe_found, Expectation},
    position::Location,
};

/// A parse failure as seen by the caller.
///
/// Structured errors come from the furthest-failure tracker (or `Context::expected`) and
/// carry the descriptors they were built from. Simple errors carry only a message, they
/// are raised directly by semantic actions or when nothing was expected.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub expected: Option<Vec<Expectation>>,
    pub found: Option<String>,
    pub location: Location,
}

impl ParseError {
    pub fn simple(message: impl Into<String>, location: Location) -> ParseError {
        Self {
            message: message.into(),
            expected: None,
            found: None,
            location,
        }
    }
    /// Failure where nothing was expected, so only what was found can be reported.
    pub fn unexpected(found: Option<String>, location: Location) -> ParseError {
        let message = match found {
            Some(_) => format!("Unexpected {}.", describe_found(found.as_deref())),
            None => "Unexpected end of input.".to_owned(),
        };
        Self {
            message,
            expected: None,
            found,
            location,
        }
    }
    pub fn structured(
        expected: Vec<Expectation>,
        found: Option<String>,
        location: Location,
    ) -> ParseError {
        Self {
            message: build_message(&expected, found.as_deref()),
            expected: Some(expected),
            found,
            location,
        }
    }
    pub fn is_structured(&self) -> bool {
        self.expected.is_some()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::position::Position;

    fn location(offset: usize) -> Location {
        let position = Position {
            offset,
            line: 1,
            column: offset as u32 + 1,
        };
        Location {
            source: None,
            start: position,
            end: position,
        }
    }

    #[test]
    fn structured_error_message() {
        let err = ParseError::structured(
            vec![Expectation::End],
            Some("x".to_owned()),
            location(3),
        );
        assert_eq!(err.to_string(), "Expected end of input but \"x\" found.");
        assert!(err.is_structured());
    }

    #[test]
    fn simple_error_serializes() {
        let err = ParseError::simple("bad number", location(0));
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["message"], "bad number");
        assert!(json["expected"].is_null());
        assert_eq!(json["location"]["start"]["column"], 1);
    }

    #[test]
    fn unexpected_error_keeps_found() {
        let err = ParseError::unexpected(Some("\n".to_owned()), location(2));
        assert_eq!(err.message, "Unexpected \"\\n\".");
        assert_eq!(err.found.as_deref(), Some("\n"));
        assert!(!err.is_structured());

        let err = ParseError::unexpected(None, location(4));
        assert_eq!(err.message, "Unexpected end of input.");
        assert_eq!(err.found, None);
    }
}
