//!
//! # Job Result, Error and Warning Types
//!

// Local Imports
use crate::coords::{CellCR, Xy};
use crate::utils::{self, ErrorHelper};
use crate::write::JobSection;

/// # [JobError] Result Type
pub type JobResult<T> = Result<T, JobError>;

/// Enumerated error contexts.
/// Names the part of the job tree a failure refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorContext {
    Job,
    Cell,
    Wafer,
    Comment,
    Options,
    Image(String),
    Layer(String),
    Mark(String),
    Strategy(String),
    Section(JobSection),
}

///
/// # Job Error Enumeration
///
/// Every hard error aborts only the call which raised it;
/// the [crate::Job] is left as it was before that call.
///
pub enum JobError {
    /// Malformed input data, e.g. non-positive sizes or invalid identifiers
    Validation {
        message: String,
        context: ErrorContext,
    },
    /// Image `image` already has a placement in cell `cell`
    DuplicatePlacement { image: String, cell: CellCR },
    /// A second image, layer, mark or strategy with an existing identifier
    DuplicateId { kind: &'static str, id: String },
    /// Reference to an image not in the job
    UnknownImageReference { image: String, context: ErrorContext },
    /// Reference to a layer not in the job
    UnknownLayerReference { layer: String },
    /// Alignment strategy `strategy` names a mark not in the alignment
    UnknownMarkReference { strategy: String, mark: String },
    /// Layer `layer` names an alignment strategy not in the alignment
    UnknownStrategyReference { layer: String, strategy: String },
    /// Comment line number `line` exceeds the format's maximum length
    CommentTooLong { line: usize, len: usize, max: usize },
    /// Boxed External Errors
    Boxed(Box<dyn std::error::Error + Send + Sync>),
    /// Uncategorized Error, with String Message
    Str(String),
}
impl JobError {
    /// Create a [JobError::Str] from anything String-convertible
    pub fn msg(s: impl Into<String>) -> Self {
        Self::Str(s.into())
    }
    /// Create a [JobError::Validation] in context `context`
    pub fn validation(context: ErrorContext, message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            context,
        }
    }
}
impl std::fmt::Debug for JobError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            JobError::Validation { message, context } => {
                write!(f, "Validation Error: {} (in {:?})", message, context)
            }
            JobError::DuplicatePlacement { image, cell } => write!(
                f,
                "Duplicate Placement: Image \"{}\" already placed in cell ({})",
                image, cell
            ),
            JobError::DuplicateId { kind, id } => {
                write!(f, "Duplicate {} ID: \"{}\"", kind, id)
            }
            JobError::UnknownImageReference { image, context } => write!(
                f,
                "Unknown Image Reference: \"{}\" (from {:?})",
                image, context
            ),
            JobError::UnknownLayerReference { layer } => {
                write!(f, "Unknown Layer Reference: \"{}\"", layer)
            }
            JobError::UnknownMarkReference { strategy, mark } => write!(
                f,
                "Unknown Mark Reference: \"{}\" in Strategy \"{}\"",
                mark, strategy
            ),
            JobError::UnknownStrategyReference { layer, strategy } => write!(
                f,
                "Unknown Strategy Reference: \"{}\" in Layer \"{}\"",
                strategy, layer
            ),
            JobError::CommentTooLong { line, len, max } => write!(
                f,
                "Comment Too Long: line {} has {} characters, maximum {}",
                line, len, max
            ),
            JobError::Boxed(err) => err.fmt(f),
            JobError::Str(err) => err.fmt(f),
        }
    }
}
impl std::fmt::Display for JobError {
    /// Delegates to the [Debug] implementation
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}
impl std::error::Error for JobError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Boxed(e) => Some(&**e),
            _ => None,
        }
    }
}
impl From<String> for JobError {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}
impl From<&str> for JobError {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}
impl From<std::io::Error> for JobError {
    fn from(e: std::io::Error) -> Self {
        Self::Boxed(Box::new(e))
    }
}
impl From<utils::ser::Error> for JobError {
    fn from(e: utils::ser::Error) -> Self {
        Self::Boxed(Box::new(e))
    }
}

///
/// # Checker
///
/// [ErrorHelper] producing [JobError::Validation]s in a fixed [ErrorContext].
///
#[derive(Debug, Clone)]
pub(crate) struct Checker(pub(crate) ErrorContext);
impl ErrorHelper for Checker {
    type Error = JobError;
    fn err(&self, msg: impl Into<String>) -> JobError {
        JobError::validation(self.0.clone(), msg)
    }
}

///
/// # Job Warnings
///
/// Conditions worth reporting which do not abort the operation that found them.
/// Each is logged at `warn` level when raised, and returned to the caller.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobWarning {
    /// Placement shift at or beyond half a cell, in either dimension.
    /// The placement is still accepted.
    ExcessiveShift {
        image: String,
        cell: CellCR,
        shift: Xy,
    },
    /// Placement reaching beyond the usable wafer area, left out of the export
    EdgeDieExcluded { image: String, cell: CellCR },
}
impl JobWarning {
    /// Log ourselves, and hand ourselves back
    pub(crate) fn logged(self) -> Self {
        log::warn!("{}", self);
        self
    }
}
impl std::fmt::Display for JobWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            JobWarning::ExcessiveShift { image, cell, shift } => write!(
                f,
                "Image \"{}\" at cell ({}): shift ({}) is at least half the cell size",
                image, cell, shift
            ),
            JobWarning::EdgeDieExcluded { image, cell } => write!(
                f,
                "Image \"{}\" at cell ({}) extends past the usable wafer area, and is not exported",
                image, cell
            ),
        }
    }
}
