//! Error types for symkern operations.
//!
//! Kernels themselves never fail. Everything that can go wrong is caught
//! before a kernel runs: bad command lines, non-positive dimensions and
//! operand bundles whose shapes do not fit together.

use std::fmt;

/// Errors that can occur while preparing or launching a kernel run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    /// The command line could not be interpreted.
    UsageError {
        /// Human-readable error message.
        message: String,
    },
    /// Input validation error (zero dimension, bad trial count, ...).
    ValidationError {
        /// Human-readable error message.
        message: String,
    },
    /// An operand does not have the shape the kernel family requires.
    DimensionMismatch {
        /// Name of the offending operand (`"A"`, `"B"`, `"C"`).
        operand: &'static str,
        /// Shape required by the other operands, as `(rows, cols)`.
        expected: (usize, usize),
        /// Shape actually supplied.
        found: (usize, usize),
    },
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelError::UsageError { message } => write!(f, "Usage error: {}", message),
            KernelError::ValidationError { message } => {
                write!(f, "Validation error: {}", message)
            }
            KernelError::DimensionMismatch {
                operand,
                expected,
                found,
            } => write!(
                f,
                "Dimension mismatch for operand {}: expected {}x{}, found {}x{}",
                operand, expected.0, expected.1, found.0, found.1
            ),
        }
    }
}

impl std::error::Error for KernelError {}

/// Result type alias for symkern operations.
pub type Result<T> = std::result::Result<T, KernelError>;

/// Creates a usage error.
pub fn usage_error(message: impl Into<String>) -> KernelError {
    KernelError::UsageError {
        message: message.into(),
    }
}

/// Creates a validation error.
pub fn validation_error(message: impl Into<String>) -> KernelError {
    KernelError::ValidationError {
        message: message.into(),
    }
}

/// Creates a dimension mismatch error.
pub fn dimension_mismatch(
    operand: &'static str,
    expected: (usize, usize),
    found: (usize, usize),
) -> KernelError {
    KernelError::DimensionMismatch {
        operand,
        expected,
        found,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_error_display() {
        let error = usage_error("symm m n");
        let display = format!("{}", error);
        assert!(display.contains("Usage error"));
        assert!(display.contains("symm m n"));
    }

    #[test]
    fn test_validation_error_display() {
        let error = validation_error("dimension m must be positive");
        let display = format!("{}", error);
        assert!(display.contains("Validation error"));
        assert!(display.contains("dimension m must be positive"));
    }

    #[test]
    fn test_dimension_mismatch_display() {
        let error = dimension_mismatch("B", (4, 3), (3, 4));
        let display = format!("{}", error);
        assert!(display.contains("operand B"));
        assert!(display.contains("expected 4x3"));
        assert!(display.contains("found 3x4"));
    }

    #[test]
    fn test_error_equality() {
        let error1 = dimension_mismatch("C", (2, 2), (2, 3));
        let error2 = dimension_mismatch("C", (2, 2), (2, 3));
        let error3 = dimension_mismatch("A", (2, 2), (2, 3));

        assert_eq!(error1, error2);
        assert_ne!(error1, error3);
    }

    #[test]
    fn test_error_trait_implementation() {
        let error = validation_error("test error");

        let _: &dyn std::error::Error = &error;

        assert!(std::error::Error::source(&error).is_none());
    }
}
