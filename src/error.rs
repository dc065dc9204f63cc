//! Error types shared by the library modules.

use thiserror::Error;

/// Errors raised by [`Seq`](crate::seq::Seq) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeqError {
    /// `reduce` was called on a sequence with no assigned elements and no
    /// initial value.
    #[error("reduce of empty sequence with no initial value")]
    EmptyReduce,

    /// A slot index past the end of the sequence.
    #[error("index {index} is out of range for a sequence of length {len}")]
    OutOfRange { index: usize, len: usize },

    /// A dense view was requested but a slot was never assigned.
    #[error("slot {index} is unassigned")]
    Unassigned { index: usize },
}

/// A failed task inside a scenario run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("task {index} failed: {message}")]
pub struct TaskFailure {
    /// Position of the task in the task list.
    pub index: usize,
    /// Failure reason reported by the task.
    pub message: String,
}

impl TaskFailure {
    pub fn new(index: usize, message: impl Into<String>) -> Self {
        Self {
            index,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            SeqError::EmptyReduce.to_string(),
            "reduce of empty sequence with no initial value"
        );
        assert_eq!(
            SeqError::OutOfRange { index: 4, len: 2 }.to_string(),
            "index 4 is out of range for a sequence of length 2"
        );
        assert_eq!(
            TaskFailure::new(1, "boom").to_string(),
            "task 1 failed: boom"
        );
    }
}
