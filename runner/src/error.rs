use std::ops::Range;

use thiserror::Error;

/// Failures while resolving or running a heading's code blocks.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Cannot find heading: {0}")]
    HeadingNotFound(String),
    #[error("No interpreter for language `{language}`")]
    UnsupportedLanguage {
        language: String,
        /// Span of the offending code block.
        span: Range<usize>,
    },
    #[error("`{program}` exited with status {code}")]
    ExitStatus { program: String, code: i32 },
    #[error("`{program}` was terminated by a signal")]
    Terminated { program: String },
    #[error("Unable to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl RunError {
    /// Process exit code to report: the interpreter's own status when it
    /// exited normally, otherwise 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::ExitStatus { code, .. } => *code,
            _ => 1,
        }
    }

    /// Source location to point at, if the error comes from a specific block.
    pub fn span(&self) -> Option<Range<usize>> {
        match self {
            RunError::UnsupportedLanguage { span, .. } => Some(span.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_propagates_interpreter_status() {
        let err = RunError::ExitStatus {
            program: "sh".to_string(),
            code: 42,
        };
        assert_eq!(err.exit_code(), 42);
        assert_eq!(err.to_string(), "`sh` exited with status 42");
    }

    #[test]
    fn other_errors_exit_with_one() {
        assert_eq!(RunError::HeadingNotFound("x".to_string()).exit_code(), 1);
        assert_eq!(
            RunError::Terminated {
                program: "sh".to_string()
            }
            .exit_code(),
            1
        );
        let spawn = RunError::Spawn {
            program: "nope".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(spawn.exit_code(), 1);
        assert!(spawn.span().is_none());
    }

    #[test]
    fn unsupported_language_carries_span() {
        let err = RunError::UnsupportedLanguage {
            language: "cobol".to_string(),
            span: 4..20,
        };
        assert_eq!(err.span(), Some(4..20));
        assert_eq!(err.to_string(), "No interpreter for language `cobol`");
    }
}
