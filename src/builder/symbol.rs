use crate::common::bitstream::BitStream;
use crate::common::error::{Axis, DotCodeError, DotCodeResult};
use crate::common::mask::MaskPattern;
use crate::common::metadata::{Metadata, Warning, MAX_DIMENSION, MIN_DIMENSION};

// Module
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Color {
    Light,
    Dark,
}

/// One grid cell. Cells on the wrong checkerboard parity carry no data and
/// stay `Void`; the six cells nearest the symbol corners are reserved and
/// filled last during folding.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Module {
    Void,
    Dot(Color),
    Corner(Color),
}

impl Module {
    pub fn is_dark(&self) -> bool {
        matches!(self, Module::Dot(Color::Dark) | Module::Corner(Color::Dark))
    }
}

// DotCode symbol
//------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DotCode {
    grid: Vec<Module>,
    height: usize,
    width: usize,
    mask: MaskPattern,
    warnings: Vec<Warning>,
}

impl DotCode {
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn mask(&self) -> MaskPattern {
        self.mask
    }

    pub fn grid(&self) -> &[Module] {
        &self.grid
    }

    pub fn get(&self, r: usize, c: usize) -> Module {
        debug_assert!(r < self.height, "Row {r} out of bounds: Height {}", self.height);
        debug_assert!(c < self.width, "Column {c} out of bounds: Width {}", self.width);

        self.grid[r * self.width + c]
    }

    /// Every DotCode row renders at unit height.
    pub fn row_heights(&self) -> Vec<u8> {
        vec![1; self.height]
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn metadata(&self) -> Metadata {
        Metadata { height: self.height, width: self.width, mask: self.mask }
    }

    pub fn count_dark_dots(&self) -> usize {
        self.grid.iter().filter(|m| m.is_dark()).count()
    }

    pub(crate) fn set_mask(&mut self, mask: MaskPattern) {
        self.mask = mask;
    }

    pub(crate) fn set_warnings(&mut self, warnings: Vec<Warning>) {
        self.warnings = warnings;
    }

    #[cfg(test)]
    pub(crate) fn to_debug_str(&self) -> String {
        let mut res = String::with_capacity((self.width + 1) * self.height + 1);
        res.push('\n');
        for r in 0..self.height {
            for c in 0..self.width {
                res.push(match self.get(r, c) {
                    Module::Void => ' ',
                    Module::Dot(Color::Dark) => 'o',
                    Module::Dot(Color::Light) => '.',
                    Module::Corner(Color::Dark) => 'O',
                    Module::Corner(Color::Light) => ',',
                });
            }
            res.push('\n');
        }
        res
    }
}

// Grid sizer
//------------------------------------------------------------------------------

/// Derives symbol height and width from the codeword volume. The dot demand
/// is 9 bits per codeword plus the 2-bit mask prefix, and only half the cells
/// carry dots, so the module area must cover twice the dot count. Auto-sizing
/// aims at a 3:2 aspect; `height + width` must come out odd.
pub(crate) fn size_for(
    data_len: usize,
    ecc_len: usize,
    requested_width: Option<usize>,
) -> DotCodeResult<(usize, usize)> {
    let min_dots = 9 * (data_len + ecc_len) + 2;
    let min_area = 2 * min_dots;

    if let Some(width) = requested_width {
        debug_assert!(
            (MIN_DIMENSION..=MAX_DIMENSION).contains(&width),
            "Width {width} should have been validated"
        );

        let mut height = min_area.div_ceil(width).max(MIN_DIMENSION);
        if (height + width) % 2 == 0 {
            height += 1;
        }
        if height > MAX_DIMENSION {
            return Err(DotCodeError::CapacityExceeded { axis: Axis::Height, size: height });
        }
        return Ok((height, width));
    }

    let mut height = (min_area as f64 * 2.0 / 3.0).sqrt() as usize;
    let mut width = (min_area as f64 * 1.5).sqrt() as usize;
    height = height.max(MIN_DIMENSION);
    width = width.max(MIN_DIMENSION);

    while (height + width) % 2 == 0 || height * width < min_area {
        if (height + width) % 2 == 0 {
            // widen first on parity ties
            width += 1;
        } else if width * 2 < height * 3 {
            width += 1;
        } else {
            height += 1;
        }
    }

    if height > MAX_DIMENSION {
        return Err(DotCodeError::CapacityExceeded { axis: Axis::Height, size: height });
    }
    if width > MAX_DIMENSION {
        return Err(DotCodeError::CapacityExceeded { axis: Axis::Width, size: width });
    }
    Ok((height, width))
}

// Folder
//------------------------------------------------------------------------------

/// The six reserved cells, in fill order TL, TR, BL, BR. A corner whose exact
/// cell sits on data parity contributes itself; a blocked corner contributes
/// its two data-parity border neighbours (same-edge cell first). Since
/// `height + width` is odd, exactly two corners are blocked.
pub(crate) fn corner_cells(height: usize, width: usize) -> Vec<(usize, usize)> {
    debug_assert!((height + width) % 2 == 1, "Dimension parity violated: {height}x{width}");

    let mut cells = Vec::with_capacity(6);
    cells.push((0, 0));
    if (width - 1) % 2 == 0 {
        cells.push((0, width - 1));
    } else {
        cells.push((0, width - 2));
        cells.push((1, width - 1));
    }
    if (height - 1) % 2 == 0 {
        cells.push((height - 1, 0));
    } else {
        cells.push((height - 1, 1));
        cells.push((height - 2, 0));
    }
    // bottom-right is always blocked
    cells.push((height - 1, width - 2));
    cells.push((height - 2, width - 1));

    debug_assert!(cells.len() == 6, "Expected 6 corner cells, got {}", cells.len());
    cells
}

/// Folds the dot bitstream into the checkerboard grid. Odd heights fold
/// row-major bottom-up, even heights column-major; the reserved corners take
/// the final six bits, or forced dark dots for the corner mask variants.
pub(crate) fn fold(
    bits: &BitStream,
    height: usize,
    width: usize,
    forced_corners: bool,
) -> DotCodeResult<DotCode> {
    let n_dots = height * width / 2;
    debug_assert!(bits.len() == n_dots, "Bitstream {} should fill {n_dots} dots", bits.len());

    let mut grid = Vec::new();
    grid.try_reserve(height * width)?;
    grid.resize(height * width, Module::Void);

    let corners = corner_cells(height, width);
    let color = |bit: bool| if bit { Color::Dark } else { Color::Light };

    let mut idx = 0;
    let mut place = |grid: &mut Vec<Module>, r: usize, c: usize| {
        if (r + c) % 2 == 0 && !corners.contains(&(r, c)) {
            grid[r * width + c] = Module::Dot(color(bits.get(idx)));
            idx += 1;
        }
    };

    if height % 2 == 1 {
        for r in (0..height).rev() {
            for c in 0..width {
                place(&mut grid, r, c);
            }
        }
    } else {
        for c in 0..width {
            for r in 0..height {
                place(&mut grid, r, c);
            }
        }
    }

    for &(r, c) in &corners {
        let dark = forced_corners || bits.get(idx);
        grid[r * width + c] = Module::Corner(color(dark));
        idx += 1;
    }
    debug_assert!(idx == n_dots, "Folded {idx} dots, expected {n_dots}");

    Ok(DotCode {
        grid,
        height,
        width,
        mask: MaskPattern::new(0),
        warnings: Vec::new(),
    })
}
