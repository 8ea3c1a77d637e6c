//! Turning unpacked scanline samples into pixels and back.
//!
//! Samples arrive one per byte for depths up to 8 and as big-endian byte
//! pairs at depth 16. Pixels leave as 8-bit RGBA, so 16-bit samples keep
//! their most significant byte.

use crate::{
    chunks::{ihdr::ColorType, plte::Entry},
    error::{PngError, PngResult},
    pixel::PackedPixel,
};

/// Fills `row` from the unpacked samples of one scanline. `row.len()` is the
/// number of pixels the scanline covers; any padding samples past it are
/// ignored.
pub fn assemble_row<P: PackedPixel>(
    samples: &[u8],
    color_type: ColorType,
    bit_depth: u8,
    palette: &[Entry],
    palette_alpha: &[u8],
    row: &mut [P],
) -> PngResult<()> {
    let step = if bit_depth == 16 { 2 } else { 1 };
    let stride = color_type.channel_count() * step;
    let pixels = row.iter_mut().zip(samples.chunks(stride));
    match color_type {
        ColorType::Grayscale => {
            let scale = if bit_depth < 8 {
                u8::MAX / ((1 << bit_depth) - 1)
            } else {
                1
            };
            for (pixel, sample) in pixels {
                let intensity = sample[0] * scale;
                *pixel = P::pack_from_components(intensity, intensity, intensity, u8::MAX);
            }
        }
        ColorType::GrayscaleAlpha => {
            for (pixel, sample) in pixels {
                let (intensity, alpha) = (sample[0], sample[step]);
                *pixel = P::pack_from_components(intensity, intensity, intensity, alpha);
            }
        }
        ColorType::Palette => {
            for (pixel, sample) in pixels {
                let index = sample[0];
                let Entry(red, green, blue) =
                    *palette
                        .get(index as usize)
                        .ok_or(PngError::PaletteIndexOutOfRange {
                            index,
                            palette_len: palette.len(),
                        })?;
                let alpha = palette_alpha
                    .get(index as usize)
                    .copied()
                    .unwrap_or(u8::MAX);
                *pixel = P::pack_from_components(red, green, blue, alpha);
            }
        }
        ColorType::Rgb => {
            for (pixel, sample) in pixels {
                *pixel =
                    P::pack_from_components(sample[0], sample[step], sample[2 * step], u8::MAX);
            }
        }
        ColorType::RgbAlpha => {
            for (pixel, sample) in pixels {
                *pixel = P::pack_from_components(
                    sample[0],
                    sample[step],
                    sample[2 * step],
                    sample[3 * step],
                );
            }
        }
    }
    Ok(())
}

/// `0.299 R + 0.587 G + 0.114 B`, truncated. Worked in thousandths so gray
/// input comes back unchanged.
pub fn luminance([red, green, blue, _]: [u8; 4]) -> u8 {
    ((299 * red as u32 + 587 * green as u32 + 114 * blue as u32) / 1000) as u8
}

/// Appends the samples for `row` to `out`: one per byte up to depth 8 (not yet
/// packed), two big-endian bytes at depth 16. Grayscale targets collapse color
/// through [`luminance`] and keep only the top `bit_depth` bits of it.
///
/// Palette rows are not built from pixels; they are the quantizer's indices.
pub fn disassemble_row<P: PackedPixel>(
    row: &[P],
    color_type: ColorType,
    bit_depth: u8,
    out: &mut Vec<u8>,
) -> PngResult<()> {
    let mut push = |value: u8| {
        if bit_depth == 16 {
            out.extend((value as u16 * 257).to_be_bytes());
        } else {
            out.push(value);
        }
    };
    for pixel in row {
        let components = pixel.to_components();
        let [red, green, blue, alpha] = components;
        match color_type {
            ColorType::Grayscale => {
                let luma = luminance(components);
                if bit_depth < 8 {
                    push(luma >> (8 - bit_depth));
                } else {
                    push(luma);
                }
            }
            ColorType::GrayscaleAlpha => {
                push(luminance(components));
                push(alpha);
            }
            ColorType::Rgb => {
                push(red);
                push(green);
                push(blue);
            }
            ColorType::RgbAlpha => {
                push(red);
                push(green);
                push(blue);
                push(alpha);
            }
            ColorType::Palette => {
                return Err(PngError::unsupported(
                    "palette scanlines come from quantized indices, not pixels",
                ))
            }
        }
    }
    Ok(())
}
