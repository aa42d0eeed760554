use thiserror::Error;

/// Error returned when a sketch cannot be constructed.
///
/// Constructors are the only fallible operations in this crate: once a sketch
/// exists, `add`, `count` and `contains` are total.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SketchError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl SketchError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SketchError>;
