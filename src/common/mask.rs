use std::ops::Deref;

use crate::builder::symbol::{fold, DotCode};
use crate::common::bitstream::BitStream;
use crate::common::codec::DOT_PATTERNS;
use crate::common::ec::rs_encode;
use crate::common::error::DotCodeResult;
use crate::common::metadata::GF;

// Mask pattern
//------------------------------------------------------------------------------

/// Masks 0-3 offset the codeword stream by a running weight; 4-7 repeat the
/// same offsets and additionally force the six reserved corner cells dark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskPattern(u8);

impl MaskPattern {
    pub fn new(pattern: u8) -> Self {
        debug_assert!(pattern < 8, "Invalid mask pattern: {pattern}");

        Self(pattern)
    }
}

impl Deref for MaskPattern {
    type Target = u8;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// Masking
//------------------------------------------------------------------------------

const MASK_WEIGHTS: [usize; 4] = [0, 3, 7, 17];

/// Prepends the mask id (low 2 bits) as codeword 0 and offsets each data
/// codeword by a weight running in steps of the mask's prime, mod 113.
pub(crate) fn apply_mask(mask: u8, codewords: &[u8]) -> Vec<u8> {
    let prime = MASK_WEIGHTS[(mask & 3) as usize];
    let mut out = Vec::with_capacity(codewords.len() + 1);
    out.push(mask & 3);
    let mut weight = 0;
    for &cw in codewords {
        out.push(((cw as usize + weight) % GF) as u8);
        weight = (weight + prime) % GF;
    }
    out
}

/// Masks the codewords, appends error correction, expands to the dot stream
/// and folds the grid for one mask candidate.
fn render(
    codewords: &[u8],
    ecc_len: usize,
    mask: u8,
    height: usize,
    width: usize,
) -> DotCodeResult<DotCode> {
    let masked = apply_mask(mask, codewords);
    let full = rs_encode(&masked, ecc_len);

    let n_dots = height * width / 2;
    let mut bits = BitStream::new(n_dots);
    // The mask codeword contributes only its 2-bit id to the dot stream
    bits.push_bits(full[0], 2);
    for &cw in &full[1..] {
        bits.push_bits(DOT_PATTERNS[cw as usize], 9);
    }
    // Remaining dot capacity fills with set dots
    while bits.len() < bits.capacity() {
        bits.push(true);
    }

    let mut symbol = fold(&bits, height, width, mask >= 4)?;
    symbol.set_mask(MaskPattern::new(mask));
    Ok(symbol)
}

/// Picks the mask whose folded grid scores highest. Masks 0-3 are tried
/// first; if the best of those scores no better than half the module count,
/// the corner-forced variants 4-7 join the contest. Ties keep the lower id.
pub(crate) fn select_mask(
    codewords: &[u8],
    ecc_len: usize,
    height: usize,
    width: usize,
    user_mask: Option<MaskPattern>,
) -> DotCodeResult<DotCode> {
    if let Some(mask) = user_mask {
        return render(codewords, ecc_len, *mask, height, width);
    }

    fn consider(best: &mut Option<(DotCode, i64)>, symbol: DotCode) {
        let s = score(&symbol);
        if best.as_ref().map_or(true, |(_, bs)| s > *bs) {
            *best = Some((symbol, s));
        }
    }

    let mut best = None;
    for mask in 0..4 {
        consider(&mut best, render(codewords, ecc_len, mask, height, width)?);
    }
    let threshold = (height * width / 2) as i64;
    if best.as_ref().map_or(false, |(_, s)| *s <= threshold) {
        for mask in 4..8 {
            consider(&mut best, render(codewords, ecc_len, mask, height, width)?);
        }
    }

    match best {
        Some((symbol, _)) => Ok(symbol),
        None => unreachable!("mask search always scores the first four candidates"),
    }
}

// Scoring
//------------------------------------------------------------------------------

/// Reject sentinel for grids a reader could not lock onto at all.
pub(crate) const SCORE_REJECT: i64 = i64::MIN;

/// Print-quality estimate of a folded grid. The dominant term is the worst
/// of the four edges, valued by dot count plus dark span and weighted by the
/// orthogonal dimension; any fully empty edge rejects the grid outright.
/// Isolated dots and inverse crosses in the interior subtract quadratically,
/// and empty interior rows or columns subtract compounding penalties.
pub(crate) fn score(symbol: &DotCode) -> i64 {
    let (h, w) = (symbol.height(), symbol.width());
    let dark = |r: usize, c: usize| symbol.get(r, c).is_dark();

    // Edge measures
    let mut worst = i64::MAX;
    let edges: [(bool, usize, usize); 4] = [
        (true, 0, h),       // top, weighted by height
        (true, h - 1, h),   // bottom
        (false, 0, w),      // left, weighted by width
        (false, w - 1, w),  // right
    ];
    for (horizontal, fixed, ortho) in edges {
        let extent = if horizontal { w } else { h };
        let mut count = 0i64;
        let mut first = None;
        let mut last = 0;
        for i in 0..extent {
            let (r, c) = if horizontal { (fixed, i) } else { (i, fixed) };
            if (r + c) % 2 == 0 && dark(r, c) {
                count += 1;
                first.get_or_insert(i);
                last = i;
            }
        }
        let Some(first) = first else {
            return SCORE_REJECT;
        };
        worst = worst.min((count + (last - first) as i64) * ortho as i64);
    }

    // Interior isolation: a dark dot with all four diagonal neighbours light,
    // or a light cell with all four dark
    let mut isolated = 0i64;
    for r in 1..h - 1 {
        for c in 1..w - 1 {
            if (r + c) % 2 != 0 {
                continue;
            }
            let diagonals =
                [dark(r - 1, c - 1), dark(r - 1, c + 1), dark(r + 1, c - 1), dark(r + 1, c + 1)];
            let center = dark(r, c);
            if diagonals.iter().all(|&d| d != center) {
                isolated += 1;
            }
        }
    }

    // Empty interior lines, compounding per consecutive run
    let mut penalty = 0i64;
    let mut mult = 1i64;
    for r in 1..h - 1 {
        if (0..w).any(|c| (r + c) % 2 == 0 && dark(r, c)) {
            mult = 1;
        } else {
            mult = mult.saturating_mul(h as i64);
            penalty = penalty.saturating_add(mult);
        }
    }
    mult = 1;
    for c in 1..w - 1 {
        if (0..h).any(|r| (r + c) % 2 == 0 && dark(r, c)) {
            mult = 1;
        } else {
            mult = mult.saturating_mul(w as i64);
            penalty = penalty.saturating_add(mult);
        }
    }

    worst.saturating_sub(isolated.saturating_mul(isolated)).saturating_sub(penalty)
}
