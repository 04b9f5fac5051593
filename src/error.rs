use pest::error::LineColLocation;
use thiserror::Error;

use crate::parse::Rule;

#[derive(Error, Debug)]
pub enum OntcError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Construction error: {0}")]
    Construction(String),
    #[error("Integrity error: {0}")]
    Integrity(String),
    #[error("No query goal: supply exactly one of subject or object")]
    NoQueryGoal,
    #[error("Unknown sentence part: {0}")]
    UnknownSentencePart(String),
    #[error("{name}: {message}")]
    Builtin { name: &'static str, message: String },
    #[error("Unknown function: {0}")]
    UnknownFunction(String),
    #[error("Unsupported callee: only single-level identifiers can be called")]
    UnsupportedCallee,
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Precedence cycle through function '{0}'")]
    PrecedenceCycle(String),
    #[error("Precedence nesting exceeds the limit of {0}")]
    PrecedenceDepth(usize),
    #[error("Parse error: {message}")]
    Parse { message: String, line: Option<usize>, col: Option<usize> },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl OntcError {
    /// Errors that end a run. Everything else is reported and skipped.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::Validation(_)
                | Self::PrecedenceCycle(_)
                | Self::PrecedenceDepth(_)
                | Self::Parse { .. }
                | Self::Io(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, OntcError>;

// Helper conversions
impl From<config::ConfigError> for OntcError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
impl From<pest::error::Error<Rule>> for OntcError {
    fn from(e: pest::error::Error<Rule>) -> Self {
        let (line, col) = match e.line_col {
            LineColLocation::Pos(position) | LineColLocation::Span(position, _) => position,
        };
        Self::Parse {
            message: e.variant.message().to_string(),
            line: Some(line),
            col: Some(col),
        }
    }
}
