use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A mass vector was not a single column.
    NotColumn { name: &'static str, shape: (usize, usize) },
    /// An input's dimensions disagree with the other inputs.
    ShapeMismatch {
        name: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },
    /// Decay law name other than `power` or `exponential`.
    UnknownDecay(String),
    /// A scalar model parameter outside its valid range.
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotColumn { name, shape } => {
                write!(
                    f,
                    "`{name}` must be 2D with a single column, got {}x{}",
                    shape.0, shape.1
                )
            }
            Self::ShapeMismatch { name, expected, found } => {
                write!(
                    f,
                    "`{name}` shape mismatch: expected {}x{}, found {}x{}",
                    expected.0, expected.1, found.0, found.1
                )
            }
            Self::UnknownDecay(name) => {
                write!(f, "unknown decay law '{name}' (expected 'power' or 'exponential')")
            }
            Self::InvalidParameter { name, value, reason } => {
                write!(f, "invalid {name} = {value}: {reason}")
            }
        }
    }
}

impl std::error::Error for ModelError {}
