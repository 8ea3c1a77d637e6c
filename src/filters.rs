//! The five PNG scanline filters.
//!
//! Filters work on bytes, not pixels. In every function below `a` is the byte
//! one pixel to the left (`bpp` bytes back), `b` the byte above in the previous
//! scanline and `c` the byte above-left. Anything off the left edge is zero, and
//! the row above the first row of an image or interlace pass is all zeros.

use log::trace;

use crate::error::PngError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterType {
    None = 0,
    Sub = 1,
    Up = 2,
    Average = 3,
    Paeth = 4,
}

impl FilterType {
    pub fn filter(&self, x: u8, a: u8, b: u8, c: u8) -> u8 {
        match self {
            FilterType::None => x,
            FilterType::Sub => x.wrapping_sub(a),
            FilterType::Up => x.wrapping_sub(b),
            FilterType::Average => x.wrapping_sub(average(a, b)),
            FilterType::Paeth => x.wrapping_sub(paeth_predictor(a, b, c)),
        }
    }

    pub fn reconstruct(&self, x: u8, a: u8, b: u8, c: u8) -> u8 {
        match self {
            FilterType::None => x,
            FilterType::Sub => x.wrapping_add(a),
            FilterType::Up => x.wrapping_add(b),
            FilterType::Average => x.wrapping_add(average(a, b)),
            FilterType::Paeth => x.wrapping_add(paeth_predictor(a, b, c)),
        }
    }
}

impl TryFrom<u8> for FilterType {
    type Error = PngError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Sub),
            2 => Ok(Self::Up),
            3 => Ok(Self::Average),
            4 => Ok(Self::Paeth),
            i => Err(PngError::unsupported(format!("scanline filter type {i}"))),
        }
    }
}

/// `floor((a + b) / 2)` without overflowing a byte.
const fn average(a: u8, b: u8) -> u8 {
    ((a as u16 + b as u16) / 2) as u8
}

/// Picks whichever of `a`, `b`, `c` is closest to `a + b - c`, preferring
/// `a`, then `b`, then `c` on ties.
pub const fn paeth_predictor(a: u8, b: u8, c: u8) -> u8 {
    let (ia, ib, ic) = (a as i16, b as i16, c as i16);
    let p = ia + ib - ic;
    let pa = (p - ia).abs();
    let pb = (p - ib).abs();
    let pc = (p - ic).abs();
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

/// Filters `raw` into `filtered`. `prior` is the previous row's raw bytes.
pub fn filter_scanline(
    filter: FilterType,
    raw: &[u8],
    prior: &[u8],
    bpp: usize,
    filtered: &mut [u8],
) {
    for i in 0..raw.len() {
        let (a, c) = if i >= bpp {
            (raw[i - bpp], prior[i - bpp])
        } else {
            (0, 0)
        };
        filtered[i] = filter.filter(raw[i], a, prior[i], c);
    }
}

/// Undoes [`filter_scanline`] in place. Bytes are rebuilt left to right since
/// each one needs the already rebuilt byte `bpp` positions back.
pub fn reconstruct_scanline(filter: FilterType, scanline: &mut [u8], prior: &[u8], bpp: usize) {
    match filter {
        FilterType::None => (),
        FilterType::Up => {
            for (x, b) in scanline.iter_mut().zip(prior) {
                *x = x.wrapping_add(*b);
            }
        }
        _ => {
            for i in 0..scanline.len() {
                let (a, c) = if i >= bpp {
                    (scanline[i - bpp], prior[i - bpp])
                } else {
                    (0, 0)
                };
                scanline[i] = filter.reconstruct(scanline[i], a, prior[i], c);
            }
        }
    }
}

/// Sum of each byte's distance from zero when read as a signed value. Stops
/// counting once the sum passes `limit`, since the candidate has lost by then.
fn score(filtered: &[u8], limit: usize) -> usize {
    let mut sum = 0;
    for &v in filtered {
        sum += if v < 128 { v as usize } else { 256 - v as usize };
        if sum > limit {
            break;
        }
    }
    sum
}

/// Scratch rows for adaptive filter selection, sized once per image and
/// reused for every scanline.
#[derive(Debug)]
pub struct FilterScratch {
    up: Vec<u8>,
    paeth: Vec<u8>,
    sub: Vec<u8>,
    average: Vec<u8>,
}

impl FilterScratch {
    pub fn new(scanline_length: usize) -> Self {
        Self {
            up: vec![0; scanline_length],
            paeth: vec![0; scanline_length],
            sub: vec![0; scanline_length],
            average: vec![0; scanline_length],
        }
    }

    /// Filters `raw` with `filter` into the scratch row and returns it.
    pub fn apply(&mut self, filter: FilterType, raw: &[u8], prior: &[u8], bpp: usize) -> &[u8] {
        let out = &mut self.up[..raw.len()];
        filter_scanline(filter, raw, prior, bpp, out);
        out
    }

    /// Tries Up, Paeth, Sub and Average in that order and keeps the one with
    /// the lowest [`score`]. A later candidate must score strictly lower to
    /// win, so ties go to the earlier one.
    pub fn select_filter(&mut self, raw: &[u8], prior: &[u8], bpp: usize) -> (FilterType, &[u8]) {
        let len = raw.len();
        let mut best = FilterType::Up;
        filter_scanline(FilterType::Up, raw, prior, bpp, &mut self.up[..len]);
        let mut lowest = score(&self.up[..len], usize::MAX);

        for (filter, row) in [
            (FilterType::Paeth, &mut self.paeth),
            (FilterType::Sub, &mut self.sub),
            (FilterType::Average, &mut self.average),
        ] {
            filter_scanline(filter, raw, prior, bpp, &mut row[..len]);
            let sum = score(&row[..len], lowest);
            if sum < lowest {
                lowest = sum;
                best = filter;
            }
        }
        trace!("selected {best:?} filter, score {lowest}");

        let row = match best {
            FilterType::Paeth => &self.paeth,
            FilterType::Sub => &self.sub,
            FilterType::Average => &self.average,
            _ => &self.up,
        };
        (best, &row[..len])
    }
}
