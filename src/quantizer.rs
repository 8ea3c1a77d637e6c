//! Reducing an image to an indexed palette for palette encoding.

use std::collections::HashMap;

use log::debug;

use crate::pixel::{PackedPixel, PixelBuffer};

/// A palette of RGBA colors and one palette index per pixel, row-major.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuantizedImage {
    pub palette: Vec<[u8; 4]>,
    pub indices: Vec<u8>,
}

pub trait Quantizer {
    /// Maps every pixel of `image` onto a palette of at most `max_colors`
    /// entries.
    fn quantize<B: PixelBuffer>(&self, image: &B, max_colors: usize) -> QuantizedImage;
}

/// Keeps the most used colors.
///
/// An image with no more than `max_colors` distinct colors gets an exact
/// palette in order of first appearance. Otherwise the `max_colors` most
/// frequent colors are kept (ties broken by first appearance) and every pixel
/// maps to the nearest of them by squared RGBA distance, the lowest index
/// winning ties.
#[derive(Debug, Clone, Copy, Default)]
pub struct PopularityQuantizer;

impl Quantizer for PopularityQuantizer {
    fn quantize<B: PixelBuffer>(&self, image: &B, max_colors: usize) -> QuantizedImage {
        let max_colors = max_colors.clamp(1, 256);
        let mut colors: Vec<[u8; 4]> = Vec::new();
        let mut counts: Vec<usize> = Vec::new();
        let mut lookup: HashMap<[u8; 4], usize> = HashMap::new();
        let mut pixels = Vec::with_capacity(image.width() as usize * image.height() as usize);

        for y in 0..image.height() {
            for x in 0..image.width() {
                let color = image.get_pixel(x, y).to_components();
                let slot = *lookup.entry(color).or_insert_with(|| {
                    colors.push(color);
                    counts.push(0);
                    colors.len() - 1
                });
                counts[slot] += 1;
                pixels.push(slot);
            }
        }

        if colors.len() <= max_colors {
            debug!("exact palette of {} colors", colors.len());
            return QuantizedImage {
                palette: colors,
                indices: pixels.into_iter().map(|slot| slot as u8).collect(),
            };
        }

        // Stable sort keeps first-appearance order among equal counts.
        let mut ranked: Vec<usize> = (0..colors.len()).collect();
        ranked.sort_by(|&a, &b| counts[b].cmp(&counts[a]));
        ranked.truncate(max_colors);
        let palette: Vec<[u8; 4]> = ranked.iter().map(|&slot| colors[slot]).collect();

        let mapping: Vec<u8> = colors
            .iter()
            .map(|color| nearest(&palette, color))
            .collect();
        debug!(
            "reduced {} colors to a palette of {}",
            colors.len(),
            palette.len()
        );
        QuantizedImage {
            palette,
            indices: pixels.into_iter().map(|slot| mapping[slot]).collect(),
        }
    }
}

fn distance(a: &[u8; 4], b: &[u8; 4]) -> u32 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = x as i32 - y as i32;
            (d * d) as u32
        })
        .sum()
}

fn nearest(palette: &[[u8; 4]], color: &[u8; 4]) -> u8 {
    let mut best = 0;
    let mut best_distance = u32::MAX;
    for (index, entry) in palette.iter().enumerate() {
        let d = distance(entry, color);
        if d < best_distance {
            best = index;
            best_distance = d;
        }
    }
    best as u8
}
