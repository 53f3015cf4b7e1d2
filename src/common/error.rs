use std::fmt::{Debug, Display, Error, Formatter};

// Error
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum DotCodeError {
    /// ECI value beyond the encodable ceiling.
    InvalidEci(u32),
    /// Requested fixed width outside [5, 200].
    InvalidWidth(usize),
    /// Mask override outside 0..=7.
    InvalidMaskingPattern(u8),
    /// Structured append index/count out of bounds.
    InvalidStructuredAppend { index: u8, count: u8 },
    /// DotCode structured append carries no ID field.
    StructuredAppendIdUnsupported,
    /// A computed symbol dimension fell outside [5, 200].
    CapacityExceeded { axis: Axis, size: usize },
    /// Output buffer allocation failed.
    OutputAllocation,
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Axis {
    Height,
    Width,
}

impl Display for DotCodeError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        match *self {
            Self::InvalidEci(eci) => write!(f, "ECI {eci} is beyond the supported ceiling"),
            Self::InvalidWidth(w) => write!(f, "Requested width {w} is outside [5, 200]"),
            Self::InvalidMaskingPattern(m) => write!(f, "Invalid masking pattern {m}"),
            Self::InvalidStructuredAppend { index, count } => {
                write!(f, "Invalid structured append position {index} of {count}")
            }
            Self::StructuredAppendIdUnsupported => {
                f.write_str("Structured append ID field is not supported")
            }
            Self::CapacityExceeded { axis, size } => {
                let axis = match axis {
                    Axis::Height => "height",
                    Axis::Width => "width",
                };
                write!(f, "Symbol {axis} {size} is outside [5, 200]")
            }
            Self::OutputAllocation => f.write_str("Output buffer allocation failed"),
        }
    }
}

impl std::error::Error for DotCodeError {}

impl From<std::collections::TryReserveError> for DotCodeError {
    fn from(_: std::collections::TryReserveError) -> Self {
        Self::OutputAllocation
    }
}

pub type DotCodeResult<T> = Result<T, DotCodeError>;
