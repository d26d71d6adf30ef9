//! Error taxonomy for navigation operations.
//!
//! Every error is reported through the operation's [`crate::NavFuture`];
//! nothing here aborts the process or poisons the stack.

/// Why a navigation operation could not complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavError {
    /// An insert or set-pages call received an empty page list.
    InvalidPages,
    /// A removal index fell outside the stack, or a pop targeted the last
    /// remaining record.
    RemoveOutOfRange { index: usize, len: usize },
    /// `present` resolved to a root host that is a tab container; overlays
    /// need a plain navigation stack at the root.
    PresentRequiresStack,
    /// The content loader failed to construct the entering page.
    LoadFailed { page: String, reason: String },
}

impl std::fmt::Display for NavError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NavError::InvalidPages => write!(f, "no pages provided"),
            NavError::RemoveOutOfRange { index, len } => {
                write!(f, "remove index {index} out of range (stack length {len})")
            }
            NavError::PresentRequiresStack => {
                write!(f, "present requires a navigation stack at the root host")
            }
            NavError::LoadFailed { page, reason } => {
                write!(f, "failed to load page {page}: {reason}")
            }
        }
    }
}

impl std::error::Error for NavError {}

pub type NavResult = Result<(), NavError>;
