use crate::common::error::DotCodeResult;
use crate::common::metadata::{Segment, StructuredAppend, MAX_ECI};

// Dot patterns
//------------------------------------------------------------------------------

/// 9-bit dot mask for each final codeword value. Every pattern lights exactly
/// 5 of its 9 dots; the 13 combinations whose geometry scans poorly are left
/// out of the set.
pub const DOT_PATTERNS: [u16; 113] = [
    0x155, 0x0ab, 0x0ad, 0x0b5, 0x0d5, 0x156, 0x15a, 0x16a, 0x1aa, 0x0ae,
    0x0b6, 0x0ba, 0x0d6, 0x0da, 0x0ea, 0x12b, 0x12d, 0x135, 0x14b, 0x14d,
    0x153, 0x159, 0x165, 0x169, 0x195, 0x1a5, 0x1a9, 0x057, 0x05b, 0x05d,
    0x06b, 0x06d, 0x075, 0x097, 0x09b, 0x09d, 0x0a7, 0x0b3, 0x0b9, 0x0cb,
    0x0cd, 0x0d3, 0x0d9, 0x0e5, 0x0e9, 0x12e, 0x136, 0x13a, 0x14e, 0x15c,
    0x166, 0x16c, 0x172, 0x174, 0x196, 0x19a, 0x1a6, 0x1ac, 0x1b2, 0x1b4,
    0x1ca, 0x1d2, 0x1d4, 0x05e, 0x06e, 0x076, 0x07a, 0x09e, 0x0bc, 0x0ce,
    0x0dc, 0x0e6, 0x0ec, 0x0f2, 0x0f4, 0x117, 0x11b, 0x11d, 0x127, 0x133,
    0x139, 0x147, 0x163, 0x171, 0x18b, 0x18d, 0x193, 0x199, 0x1a3, 0x1b1,
    0x1c5, 0x1c9, 0x1d1, 0x02f, 0x037, 0x03b, 0x03d, 0x04f, 0x067, 0x073,
    0x079, 0x08f, 0x0c7, 0x0e3, 0x0f1, 0x11e, 0x13c, 0x178, 0x18e, 0x19c,
    0x1b8, 0x1c6, 0x1cc,
];

// Code set
//------------------------------------------------------------------------------

/// Compaction mode in effect; governs how codeword values are interpreted.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum CodeSet {
    /// Digit pairs.
    C,
    /// Printable ASCII plus HT/FS/GS/RS and CR LF as one unit.
    B,
    /// Bytes 0-95, biased toward the control ranges.
    A,
    /// Binary, via the base-259 packer.
    X,
}

// Extended encodation stream
//------------------------------------------------------------------------------

// The state machine emits data values 0..=127 (pre-mapped for the code set in
// effect) and the control values below; `lower` maps the stream onto final
// 0..=112 codewords.
pub(crate) const LATCH_A: u16 = 128;
pub(crate) const LATCH_B: u16 = 129;
pub(crate) const LATCH_C: u16 = 130;
pub(crate) const BIN_LATCH: u16 = 131;
pub(crate) const TERM_A: u16 = 132;
pub(crate) const TERM_B: u16 = 133;
pub(crate) const SHIFT_A: u16 = 134;
// 1-6 characters from set B while in set A
pub(crate) const SHIFT_B1: u16 = 135;
// 2-4 digit pairs without a full latch
pub(crate) const SHIFT_C2: u16 = 141;
pub(crate) const UPPER_SHIFT_A: u16 = 144;
pub(crate) const UPPER_SHIFT_B: u16 = 145;
pub(crate) const FNC1: u16 = 146;
pub(crate) const FNC2: u16 = 147;
pub(crate) const FNC3: u16 = 148;
pub(crate) const CRLF: u16 = 149;
pub(crate) const DATE_1710: u16 = 150;
pub(crate) const MACRO_05: u16 = 151;
pub(crate) const MACRO_06: u16 = 152;
pub(crate) const SA_MARKER: u16 = 153;
pub(crate) const PAD: u16 = 154;

const HT: u8 = 9;
const LF: u8 = 10;
const CR: u8 = 13;
const FS: u8 = 28;
const GS: u8 = 29;
const RS: u8 = 30;
const EOT: u8 = 4;

// Binary buffer packer
//------------------------------------------------------------------------------

/// Radix converter for set X: queues up to 5 extended byte values (0-258,
/// 256-258 being the reserved ECI escape markers) into a base-259 accumulator
/// and flushes them as `pending + 1` base-103 codewords, most significant
/// first. 259^5 < 103^6, so the conversion is exact.
#[derive(Debug, Clone)]
pub struct BinaryPacker {
    acc: u64,
    pending: usize,
}

impl BinaryPacker {
    pub fn new() -> Self {
        Self { acc: 0, pending: 0 }
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn push(&mut self, value: u16, out: &mut Vec<u16>) {
        debug_assert!(value <= 258, "Binary value out of range: {value}");

        self.acc = self.acc * 259 + value as u64;
        self.pending += 1;
        if self.pending == 5 {
            self.flush(out);
        }
    }

    pub fn flush(&mut self, out: &mut Vec<u16>) {
        if self.pending == 0 {
            return;
        }

        let mut cws = [0u16; 6];
        let count = self.pending + 1;
        let mut acc = self.acc;
        for cw in cws[..count].iter_mut().rev() {
            *cw = (acc % 103) as u16;
            acc /= 103;
        }
        debug_assert!(acc == 0, "Accumulator overflowed the codeword count: {acc}");

        out.extend(&cws[..count]);
        self.acc = 0;
        self.pending = 0;
    }
}

impl Default for BinaryPacker {
    fn default() -> Self {
        Self::new()
    }
}

// ECI escape
//------------------------------------------------------------------------------

/// Magnitude encoding emitted after FNC2: one codeword up to 39, two up to
/// 7384 (first in 40..=104), three up to 96766 (first in 105..=111).
pub(crate) fn eci_codewords(eci: u32) -> Vec<u16> {
    debug_assert!(eci <= MAX_ECI, "ECI beyond ceiling: {eci}");

    if eci <= 39 {
        vec![eci as u16]
    } else if eci <= 7384 {
        let v = eci - 40;
        vec![40 + (v / 113) as u16, (v % 113) as u16]
    } else {
        let v = eci - 7385;
        vec![105 + (v / 12769) as u16, (v / 113 % 113) as u16, (v % 113) as u16]
    }
}

// Encodation state machine
//------------------------------------------------------------------------------

/// All mutable encodation state, threaded by `&mut` through the mode steps.
#[derive(Debug)]
struct EncoderState {
    mode: CodeSet,
    packer: BinaryPacker,
    stream: Vec<u16>,
    eci: u32,
}

/// Runs the compaction state machine over the segment list and returns the
/// extended encodation stream together with the mode in effect at the end.
/// Deterministic and total for any byte input; fails only on output
/// allocation.
pub(crate) fn encode(
    segments: &[Segment],
    gs1: bool,
    sa: Option<StructuredAppend>,
) -> DotCodeResult<(Vec<u16>, CodeSet)> {
    let total: usize = segments.iter().map(|s| s.data.len()).sum();

    let mut st =
        EncoderState { mode: CodeSet::C, packer: BinaryPacker::new(), stream: Vec::new(), eci: 0 };
    // Worst case is one codeword per byte plus shift/latch overhead
    st.stream.try_reserve(total * 2 + 16)?;

    // The structured append prefix leads the stream; its values only have
    // set C meanings, so it must precede any latch.
    if let Some(sa) = sa {
        st.stream.push(SA_MARKER);
        st.stream.push((sa.index - 1) as u16);
        st.stream.push(sa.count as u16);
    }

    let macro_id = detect_macro(segments);
    let mut skip_first = 0;
    match macro_id {
        Some(5) => {
            st.stream.push(MACRO_05);
            skip_first = 7;
        }
        Some(6) => {
            st.stream.push(MACRO_06);
            skip_first = 7;
        }
        _ => {
            // A leading special control character must not be mistaken for a
            // macro trigger; force a full latch to A up front.
            if let Some(&b) = segments.first().and_then(|s| s.data.first()) {
                if b < 0x20 {
                    st.stream.push(LATCH_A);
                    st.mode = CodeSet::A;
                }
            }
        }
    }

    let last = segments.len().saturating_sub(1);
    for (i, seg) in segments.iter().enumerate() {
        if seg.eci != st.eci {
            st.emit_eci(seg.eci);
            st.eci = seg.eci;
        }

        let skip = if i == 0 { skip_first } else { 0 };
        let trim = if i == last && macro_id.is_some() { 2 } else { 0 };
        st.encode_bytes(&seg.data[skip..seg.data.len() - trim], gs1);
    }

    if st.mode == CodeSet::X {
        st.packer.flush(&mut st.stream);
    }
    debug_assert!(st.packer.pending() == 0, "Unflushed binary values: {}", st.packer.pending());

    Ok((st.stream, st.mode))
}

/// Fixed 7-byte header `[)>` RS digit digit GS at the very start of the
/// message, with the matching RS EOT trailer closing the last segment. Only
/// ids 05 and 06 have dedicated codewords.
fn detect_macro(segments: &[Segment]) -> Option<u8> {
    let first = segments.first()?.data;
    let tail = segments.last()?.data;

    let single = segments.len() == 1;
    if first.len() < 7 || tail.len() < 2 || (single && first.len() < 9) {
        return None;
    }
    if &first[..4] != b"[)>\x1e" || first[6] != GS {
        return None;
    }
    if tail[tail.len() - 2] != RS || tail[tail.len() - 1] != EOT {
        return None;
    }
    match &first[4..6] {
        b"05" => Some(5),
        b"06" => Some(6),
        _ => None,
    }
}

impl EncoderState {
    fn encode_bytes(&mut self, data: &[u8], gs1: bool) {
        let mut pos = 0;
        while pos < data.len() {
            pos = match self.mode {
                CodeSet::C => self.step_c(data, pos, gs1),
                CodeSet::B => self.step_b(data, pos, gs1),
                CodeSet::A => self.step_a(data, pos, gs1),
                CodeSet::X => self.step_x(data, pos),
            };
        }
    }

    fn step_c(&mut self, data: &[u8], pos: usize, gs1: bool) -> usize {
        let b = data[pos];

        // "17...10" date linkage consumed as one jump
        if is_date_1710(data, pos) {
            self.stream.push(DATE_1710);
            for k in 0..3 {
                self.stream.push(pair_value(data, pos + 2 + 2 * k));
            }
            return pos + 10;
        }

        if is_pair(data, pos) {
            self.stream.push(pair_value(data, pos));
            return pos + 2;
        }

        if gs1 && b == GS {
            self.stream.push(FNC1);
            return pos + 1;
        }

        if b >= 128 && !next_is_digit(data, pos) {
            if binary_run(data, pos) {
                self.stream.push(BIN_LATCH);
                self.mode = CodeSet::X;
                return pos;
            }
            self.push_upper_shift(b);
            return pos + 1;
        }

        // Mode comparison fallback; an unpaired trailing digit lands here too
        if ahead_a(data, pos) > ahead_b(data, pos) {
            self.stream.push(LATCH_A);
            self.mode = CodeSet::A;
        } else {
            self.stream.push(LATCH_B);
            self.mode = CodeSet::B;
        }
        pos
    }

    fn step_b(&mut self, data: &[u8], pos: usize, gs1: bool) -> usize {
        let b = data[pos];

        if let Some(next) = self.try_digit_pairs(data, pos) {
            return next;
        }

        if gs1 && b == GS {
            self.stream.push(FNC1);
            return pos + 1;
        }

        if b == CR && pos + 1 < data.len() && data[pos + 1] == LF {
            self.stream.push(CRLF);
            return pos + 2;
        }

        if let Some(v) = b_value(b) {
            self.stream.push(v);
            return pos + 1;
        }

        if b >= 128 {
            if binary_run(data, pos) {
                self.stream.push(BIN_LATCH);
                self.mode = CodeSet::X;
                return pos;
            }
            if let Some(v) = b_value(b - 128) {
                self.stream.push(UPPER_SHIFT_B);
                self.stream.push(v);
                return pos + 1;
            }
            // High control byte with no set B page entry
            self.stream.push(BIN_LATCH);
            self.mode = CodeSet::X;
            return pos;
        }

        // Control character outside the B subset
        if pos + 1 < data.len() && !datum_b(data, pos + 1) && data[pos + 1] < 128 {
            self.stream.push(LATCH_A);
            self.mode = CodeSet::A;
            return pos;
        }
        self.stream.push(SHIFT_A);
        self.stream.push(b as u16);
        pos + 1
    }

    fn step_a(&mut self, data: &[u8], pos: usize, gs1: bool) -> usize {
        let b = data[pos];

        if let Some(next) = self.try_digit_pairs(data, pos) {
            return next;
        }

        if gs1 && b == GS {
            self.stream.push(FNC1);
            return pos + 1;
        }

        if b <= 95 {
            self.stream.push(b as u16);
            return pos + 1;
        }

        if b <= 127 {
            // Lowercase range only exists in set B
            let run = data[pos..].iter().take_while(|&&c| (96..=127).contains(&c)).count();
            if run <= 6 {
                self.stream.push(SHIFT_B1 + run as u16 - 1);
                for &c in &data[pos..pos + run] {
                    self.stream.push((c - 32) as u16);
                }
                return pos + run;
            }
            self.stream.push(LATCH_B);
            self.mode = CodeSet::B;
            return pos;
        }

        if binary_run(data, pos) {
            self.stream.push(BIN_LATCH);
            self.mode = CodeSet::X;
            return pos;
        }
        if b <= 223 {
            self.stream.push(UPPER_SHIFT_A);
            self.stream.push((b - 128) as u16);
            return pos + 1;
        }
        // 224..=255 needs the B page; set A has no upper shift B
        self.stream.push(BIN_LATCH);
        self.mode = CodeSet::X;
        pos
    }

    fn step_x(&mut self, data: &[u8], pos: usize) -> usize {
        if data[pos] >= 128 || (pos + 1 < data.len() && data[pos + 1] >= 128) {
            self.packer.push(data[pos] as u16, &mut self.stream);
            return pos + 1;
        }

        self.packer.flush(&mut self.stream);
        if ahead_a(data, pos) > ahead_b(data, pos) {
            self.stream.push(TERM_A);
            self.mode = CodeSet::A;
        } else {
            self.stream.push(TERM_B);
            self.mode = CodeSet::B;
        }
        pos
    }

    /// Runs of 4+ digits in sets A/B: 2-4 pairs shift without latching,
    /// 5+ pairs latch to C.
    fn try_digit_pairs(&mut self, data: &[u8], pos: usize) -> Option<usize> {
        let run = data[pos..].iter().take_while(|c| c.is_ascii_digit()).count();
        let pairs = run / 2;
        if pairs < 2 {
            return None;
        }
        if pairs > 4 {
            self.stream.push(LATCH_C);
            self.mode = CodeSet::C;
            return Some(pos);
        }
        self.stream.push(SHIFT_C2 + pairs as u16 - 2);
        for k in 0..pairs {
            self.stream.push(pair_value(data, pos + 2 * k));
        }
        Some(pos + 2 * pairs)
    }

    /// Extended ASCII escape from set C: one shifted character through the
    /// A page (128-223) or the B page (224-255).
    fn push_upper_shift(&mut self, b: u8) {
        if b <= 223 {
            self.stream.push(UPPER_SHIFT_A);
            self.stream.push((b - 128) as u16);
        } else {
            self.stream.push(UPPER_SHIFT_B);
            self.stream.push((b - 160) as u16);
        }
    }

    fn emit_eci(&mut self, eci: u32) {
        let cws = eci_codewords(eci);
        if self.mode == CodeSet::X {
            self.packer.push(256 + cws.len() as u16 - 1, &mut self.stream);
            for cw in cws {
                self.packer.push(cw, &mut self.stream);
            }
        } else {
            self.stream.push(FNC2);
            self.stream.extend(cws);
        }
    }
}

// Character predicates
//------------------------------------------------------------------------------

fn is_pair(data: &[u8], pos: usize) -> bool {
    pos + 1 < data.len() && data[pos].is_ascii_digit() && data[pos + 1].is_ascii_digit()
}

fn pair_value(data: &[u8], pos: usize) -> u16 {
    debug_assert!(is_pair(data, pos), "Not a digit pair at {pos}");
    ((data[pos] - b'0') * 10 + (data[pos + 1] - b'0')) as u16
}

fn next_is_digit(data: &[u8], pos: usize) -> bool {
    pos + 1 < data.len() && data[pos + 1].is_ascii_digit()
}

fn binary_run(data: &[u8], pos: usize) -> bool {
    data[pos] >= 128 && pos + 1 < data.len() && data[pos + 1] >= 128
}

fn is_date_1710(data: &[u8], pos: usize) -> bool {
    pos + 10 <= data.len()
        && &data[pos..pos + 2] == b"17"
        && data[pos + 2..pos + 8].iter().all(|c| c.is_ascii_digit())
        && &data[pos + 8..pos + 10] == b"10"
}

/// Set B data value for a byte, if the byte has one.
fn b_value(b: u8) -> Option<u16> {
    match b {
        32..=127 => Some((b - 32) as u16),
        HT => Some(96),
        FS => Some(97),
        GS => Some(98),
        RS => Some(99),
        _ => None,
    }
}

fn datum_b(data: &[u8], pos: usize) -> bool {
    b_value(data[pos]).is_some()
        || (data[pos] == CR && pos + 1 < data.len() && data[pos + 1] == LF)
}

/// Consecutive characters encodable directly in set A.
fn ahead_a(data: &[u8], pos: usize) -> usize {
    data[pos..].iter().take_while(|&&b| b <= 95).count()
}

/// Consecutive characters encodable directly in set B.
fn ahead_b(data: &[u8], pos: usize) -> usize {
    let mut n = 0;
    while pos + n < data.len() && datum_b(data, pos + n) {
        n += 1;
    }
    n
}

// Lowering
//------------------------------------------------------------------------------

/// Maps the extended encodation stream onto final 0..=112 codewords, tracking
/// the code set in effect. The state machine never produces a control that is
/// undefined for the current set.
pub(crate) fn lower(stream: &[u16]) -> Vec<u8> {
    use CodeSet::*;

    let mut out = Vec::with_capacity(stream.len());
    let mut mode = C;
    let mut i = 0;

    while i < stream.len() {
        let cw = stream[i];
        if cw < 128 {
            debug_assert!(
                cw <= if mode == X { 102 } else { 99 },
                "Data codeword {cw} out of range for {mode:?}"
            );
            out.push(cw as u8);
            i += 1;
            continue;
        }

        let lowered: u8 = match (mode, cw) {
            (C, DATE_1710) => 100,
            (C, FNC1) => 101,
            (C, FNC2) => 102,
            (C, FNC3) => 103,
            (C, UPPER_SHIFT_A) => 104,
            (C, UPPER_SHIFT_B) => 105,
            (C, MACRO_05) => 106,
            (C, MACRO_06) => 107,
            (C, LATCH_A) => 108,
            (C, LATCH_B) => 109,
            (C, BIN_LATCH) => 110,
            (C, SA_MARKER) => 111,
            (C, PAD) => 112,

            (A, cw) if (SHIFT_B1..SHIFT_B1 + 6).contains(&cw) => (96 + cw - SHIFT_B1) as u8,
            (A, LATCH_B) => 102,
            (A, cw) if (SHIFT_C2..SHIFT_C2 + 3).contains(&cw) => (103 + cw - SHIFT_C2) as u8,
            (A, LATCH_C) => 106,
            (A, FNC1) => 107,
            (A, FNC2) => 108,
            (A, FNC3) => 109,
            (A, UPPER_SHIFT_A) => 110,
            (A, BIN_LATCH) => 111,
            (A, PAD) => 112,

            (B, CRLF) => 100,
            (B, SHIFT_A) => 101,
            (B, LATCH_A) => 102,
            (B, cw) if (SHIFT_C2..SHIFT_C2 + 3).contains(&cw) => (103 + cw - SHIFT_C2) as u8,
            (B, LATCH_C) => 106,
            (B, FNC1) => 107,
            (B, FNC2) => 108,
            (B, FNC3) => 109,
            (B, UPPER_SHIFT_B) => 110,
            (B, BIN_LATCH) => 111,
            (B, PAD) => 112,

            (X, TERM_A) => 103,
            (X, TERM_B) => 104,
            (X, PAD) => 112,

            (mode, cw) => unreachable!("Codeword {cw} undefined in {mode:?}"),
        };
        out.push(lowered);

        match (mode, cw) {
            (_, LATCH_A) | (X, TERM_A) => mode = A,
            (_, LATCH_B) | (X, TERM_B) => mode = B,
            (_, LATCH_C) => mode = C,
            (_, BIN_LATCH) => mode = X,
            (_, FNC2) => {
                // ECI magnitude codewords pass through unmapped
                let first = stream[i + 1];
                let n = if first <= 39 {
                    1
                } else if first <= 104 {
                    2
                } else {
                    3
                };
                for k in 0..n {
                    out.push(stream[i + 1 + k] as u8);
                }
                i += n;
            }
            _ => {}
        }
        i += 1;
    }

    out
}

#[cfg(test)]
mod dot_pattern_tests {
    use super::DOT_PATTERNS;

    #[test]
    fn test_patterns_are_five_of_nine() {
        for (i, p) in DOT_PATTERNS.iter().enumerate() {
            assert!(*p < 512, "pattern {i} wider than 9 bits");
            assert_eq!(p.count_ones(), 5, "pattern {i} is not 5-of-9");
        }
    }

    #[test]
    fn test_patterns_distinct() {
        let mut seen = std::collections::HashSet::new();
        for p in DOT_PATTERNS {
            assert!(seen.insert(p), "duplicate pattern {p:#x}");
        }
        assert_eq!(seen.len(), 113);
    }
}
