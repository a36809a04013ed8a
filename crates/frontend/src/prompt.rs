//! Blocking confirmation prompts

/// A yes/no question put to the user
///
/// Implementations block until the user answers.
pub trait Confirm {
    fn confirm(&self, question: &str) -> bool;
}

/// Answers yes without asking, for non-interactive use
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _question: &str) -> bool {
        true
    }
}
