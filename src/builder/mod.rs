pub(crate) mod symbol;

pub use symbol::{Color, DotCode, Module};

use crate::common::{
    codec::{encode, lower, CodeSet},
    error::{DotCodeError, DotCodeResult},
    mask::{select_mask, MaskPattern},
    metadata::{Segment, StructuredAppend, Warning, MAX_DIMENSION, MAX_ECI, MIN_DIMENSION},
};
use symbol::size_for;

pub struct DotCodeBuilder<'a> {
    segments: Vec<Segment<'a>>,
    gs1: bool,
    width: Option<usize>,
    mask: Option<u8>,
    structured_append: Option<StructuredAppend>,
    structured_append_id: Option<u16>,
}

impl<'a> DotCodeBuilder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            segments: vec![Segment::new(data)],
            gs1: false,
            width: None,
            mask: None,
            structured_append: None,
            structured_append_id: None,
        }
    }

    /// Appends a further input segment; its ECI takes effect from its first
    /// byte onward.
    pub fn add_segment(&mut self, segment: Segment<'a>) -> &mut Self {
        self.segments.push(segment);
        self
    }

    /// Sets the ECI of the most recently added segment.
    pub fn eci(&mut self, eci: u32) -> &mut Self {
        if let Some(seg) = self.segments.last_mut() {
            seg.eci = eci;
        }
        self
    }

    pub fn gs1(&mut self, gs1: bool) -> &mut Self {
        self.gs1 = gs1;
        self
    }

    /// Fixes the symbol width; height is derived. Without this both
    /// dimensions are chosen automatically near a 3:2 aspect.
    pub fn width(&mut self, width: usize) -> &mut Self {
        self.width = Some(width);
        self
    }

    /// Overrides the mask search with a fixed pattern 0-7.
    pub fn mask(&mut self, mask: u8) -> &mut Self {
        self.mask = Some(mask);
        self
    }

    pub fn structured_append(&mut self, index: u8, count: u8) -> &mut Self {
        self.structured_append = Some(StructuredAppend { index, count });
        self
    }

    /// DotCode structured append carries no ID field; setting one only ever
    /// produces an error from `build`. Present so misconfiguration surfaces
    /// as a diagnostic rather than silently dropped data.
    pub fn structured_append_id(&mut self, id: u16) -> &mut Self {
        self.structured_append_id = Some(id);
        self
    }

    pub fn metadata(&self) -> String {
        format!(
            "{{ Segments: {}, GS1: {}, Width: {:?}, Mask: {:?} }}",
            self.segments.len(),
            self.gs1,
            self.width,
            self.mask
        )
    }
}

impl DotCodeBuilder<'_> {
    pub fn build(&self) -> DotCodeResult<DotCode> {
        println!("\nGenerating DotCode {}...", self.metadata());

        let (mask, warnings) = self.validate()?;

        // Compact the message into the extended codeword stream
        println!("Encoding data...");
        let (stream, final_mode) = encode(&self.segments, self.gs1, self.structured_append)?;
        let mut codewords = lower(&stream);

        println!("Sizing symbol...");
        let data_len = codewords.len();
        let ecc_len = 3 + data_len / 2;
        let (height, width) = size_for(data_len, ecc_len, self.width)?;

        let n_dots = height * width / 2;
        let ecc_len = pad(&mut codewords, n_dots, final_mode == CodeSet::X);

        println!("Selecting mask & folding grid...");
        let mut symbol = select_mask(&codewords, ecc_len, height, width, mask)?;
        symbol.set_warnings(warnings);

        println!("\x1b[1;32mDotCode generated successfully!\n \x1b[0m");

        let total_cells = height * width;
        let dark_dots = symbol.count_dark_dots();

        println!("Report:");
        println!("{}", symbol.metadata());
        println!("Data codewords: {}, Check codewords: {}", codewords.len(), ecc_len);
        println!(
            "Dots: {}, Dark: {}, Fill: {}%\n",
            n_dots,
            dark_dots,
            dark_dots * 100 / total_cells
        );

        Ok(symbol)
    }

    /// Checks the configuration up front, before any encoding work, and
    /// collects the non-fatal compliance warnings.
    fn validate(&self) -> DotCodeResult<(Option<MaskPattern>, Vec<Warning>)> {
        if let Some(width) = self.width {
            if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&width) {
                return Err(DotCodeError::InvalidWidth(width));
            }
        }

        let mask = match self.mask {
            Some(m) if m > 7 => return Err(DotCodeError::InvalidMaskingPattern(m)),
            Some(m) => Some(MaskPattern::new(m)),
            None => None,
        };

        if let Some(sa) = self.structured_append {
            if !(2..=35).contains(&sa.count) || sa.index < 1 || sa.index > sa.count {
                return Err(DotCodeError::InvalidStructuredAppend {
                    index: sa.index,
                    count: sa.count,
                });
            }
            if self.structured_append_id.is_some() {
                return Err(DotCodeError::StructuredAppendIdUnsupported);
            }
        }

        for seg in &self.segments {
            if seg.eci > MAX_ECI {
                return Err(DotCodeError::InvalidEci(seg.eci));
            }
        }

        let mut warnings = Vec::new();
        if self.gs1 && self.segments.iter().any(|s| s.eci != 0) {
            warnings.push(Warning::EciWithGs1);
        }
        if self.gs1 && self.structured_append.is_some() {
            warnings.push(Warning::StructuredAppendWithGs1);
        }
        Ok((mask, warnings))
    }
}

// Padding
//------------------------------------------------------------------------------

/// Grows the codeword stream into the spare dot capacity. Each pad costs 9
/// dots, or 18 when it tips the length to even and pulls in another check
/// codeword. A stream that ends in binary mode spends its first pad on the
/// terminator back to set A; every other pad is the set A pad codeword.
/// Returns the check codeword count for the padded length.
fn pad(codewords: &mut Vec<u8>, n_dots: usize, binary_finish: bool) -> usize {
    let mut len = codewords.len();
    let ecc_len = 3 + len / 2;
    debug_assert!(
        n_dots >= 9 * (len + ecc_len) + 2,
        "Dot capacity {n_dots} below demand of {len} codewords"
    );

    let mut padding_dots = n_dots - (9 * (len + ecc_len) + 2);
    let mut pads = 0;
    while padding_dots >= 9 {
        if padding_dots < 18 && len % 2 == 0 {
            padding_dots -= 9;
        } else if padding_dots >= 18 {
            if len % 2 == 0 {
                padding_dots -= 9;
            } else {
                padding_dots -= 18;
            }
        } else {
            break;
        }
        len += 1;
        pads += 1;
    }

    for i in 0..pads {
        codewords.push(if i == 0 && binary_finish { 103 } else { 112 });
    }
    debug_assert!(codewords.len() == len, "Padded to {}, expected {len}", codewords.len());

    3 + len / 2
}


#[cfg(test)]
mod builder_validation_tests {
    use super::DotCodeBuilder;
    use crate::common::error::DotCodeError;
    use crate::common::metadata::Warning;

    #[test]
    fn test_width_out_of_range() {
        let err = DotCodeBuilder::new(b"ab").width(4).build().unwrap_err();
        assert_eq!(err, DotCodeError::InvalidWidth(4));
        let err = DotCodeBuilder::new(b"ab").width(201).build().unwrap_err();
        assert_eq!(err, DotCodeError::InvalidWidth(201));
    }

    #[test]
    fn test_invalid_mask() {
        let err = DotCodeBuilder::new(b"ab").mask(8).build().unwrap_err();
        assert_eq!(err, DotCodeError::InvalidMaskingPattern(8));
    }

    #[test]
    fn test_invalid_structured_append() {
        let err = DotCodeBuilder::new(b"ab").structured_append(4, 3).build().unwrap_err();
        assert_eq!(err, DotCodeError::InvalidStructuredAppend { index: 4, count: 3 });
        let err = DotCodeBuilder::new(b"ab").structured_append(0, 3).build().unwrap_err();
        assert_eq!(err, DotCodeError::InvalidStructuredAppend { index: 0, count: 3 });
        let err = DotCodeBuilder::new(b"ab").structured_append(1, 36).build().unwrap_err();
        assert_eq!(err, DotCodeError::InvalidStructuredAppend { index: 1, count: 36 });
    }

    #[test]
    fn test_structured_append_id_rejected() {
        let err = DotCodeBuilder::new(b"ab")
            .structured_append(1, 2)
            .structured_append_id(7)
            .build()
            .unwrap_err();
        assert_eq!(err, DotCodeError::StructuredAppendIdUnsupported);
    }

    #[test]
    fn test_invalid_eci() {
        let err = DotCodeBuilder::new(b"ab").eci(96767).build().unwrap_err();
        assert_eq!(err, DotCodeError::InvalidEci(96767));
    }

    #[test]
    fn test_gs1_warnings() {
        let symbol = DotCodeBuilder::new(b"0195012345678903").gs1(true).eci(3).build().unwrap();
        assert_eq!(symbol.warnings(), [Warning::EciWithGs1]);

        let symbol = DotCodeBuilder::new(b"0195012345678903")
            .gs1(true)
            .structured_append(1, 2)
            .build()
            .unwrap();
        assert_eq!(symbol.warnings(), [Warning::StructuredAppendWithGs1]);
    }
}
