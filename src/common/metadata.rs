use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::common::mask::MaskPattern;

// Global constants
//------------------------------------------------------------------------------

/// Smallest permitted symbol dimension, rows or columns.
pub const MIN_DIMENSION: usize = 5;

/// Largest permitted symbol dimension, rows or columns.
pub const MAX_DIMENSION: usize = 200;

/// Largest ECI value the 3-codeword escape form can carry.
pub const MAX_ECI: u32 = 96766;

/// Size of the Reed-Solomon field.
pub const GF: usize = 113;

// Segment
//------------------------------------------------------------------------------

/// One run of input bytes with its character-set interpretation. A message is
/// an ordered list of segments; only the list position marks the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub data: &'a [u8],
    /// Extended Channel Interpretation, 0 for none.
    pub eci: u32,
}

impl<'a> Segment<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, eci: 0 }
    }

    pub fn with_eci(data: &'a [u8], eci: u32) -> Self {
        Self { data, eci }
    }
}

// Structured append
//------------------------------------------------------------------------------

/// Position of this symbol within a multi-symbol message. DotCode has no ID
/// field, unlike the structured append of most other symbologies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructuredAppend {
    /// 1-based position, 1..=count.
    pub index: u8,
    /// Total symbol count, 2..=35.
    pub count: u8,
}

// Warning
//------------------------------------------------------------------------------

/// Standards non-compliances that are accepted but flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Warning {
    EciWithGs1,
    StructuredAppendWithGs1,
}

impl Display for Warning {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::EciWithGs1 => f.write_str("ECI together with GS1 mode is non-compliant"),
            Self::StructuredAppendWithGs1 => {
                f.write_str("Structured append together with GS1 mode is non-compliant")
            }
        }
    }
}

// Metadata
//------------------------------------------------------------------------------

/// Effective symbol parameters, reported back to the caller after encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    pub height: usize,
    pub width: usize,
    pub mask: MaskPattern,
}

impl Display for Metadata {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{{ Height: {}, Width: {}, Mask: {} }}", self.height, self.width, *self.mask)
    }
}
