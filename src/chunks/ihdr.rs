use nom::{bytes::complete::take, number::complete::be_u32, sequence::tuple};

use super::{payload_error, ParseableChunk};
use crate::error::{PngError, PngResult};

/// Size of the `IHDR` payload.
pub const HEADER_LENGTH: usize = 13;

/// The image header. Created once from `IHDR` and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub color_type: ColorType,
    pub compression_method: u8,
    pub filter_method: u8,
    pub interlace_method: Interlacing,
}

impl Header {
    pub fn new(
        width: u32,
        height: u32,
        bit_depth: u8,
        color_type: ColorType,
        interlace_method: Interlacing,
    ) -> Self {
        Self {
            width,
            height,
            bit_depth,
            color_type,
            compression_method: 0,
            filter_method: 0,
            interlace_method,
        }
    }

    /// Checks the header against the PNG compatibility rules.
    pub fn validate(&self) -> PngResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PngError::unsupported(format!(
                "image dimensions {}x{} must both be non-zero",
                self.width, self.height
            )));
        }
        if !self
            .color_type
            .allowed_bit_depths()
            .contains(&self.bit_depth)
        {
            return Err(PngError::unsupported(format!(
                "bit depth {} is not allowed for {:?}",
                self.bit_depth, self.color_type
            )));
        }
        if self.compression_method != 0 {
            return Err(PngError::unsupported(format!(
                "compression method {} (only 0 is defined)",
                self.compression_method
            )));
        }
        if self.filter_method != 0 {
            return Err(PngError::unsupported(format!(
                "filter method {} (only 0 is defined)",
                self.filter_method
            )));
        }
        Ok(())
    }

    pub fn bits_per_pixel(&self) -> usize {
        self.color_type.channel_count() * self.bit_depth as usize
    }

    /// Distance to the "left" byte used by the scanline filters: one whole
    /// pixel, or one byte when pixels are smaller than a byte.
    pub fn bytes_per_pixel(&self) -> usize {
        usize::max(self.bits_per_pixel() / 8, 1)
    }

    /// Sample bytes in a scanline covering `columns` pixels, without the
    /// leading filter byte.
    pub fn scanline_length(&self, columns: u32) -> usize {
        (columns as usize * self.bits_per_pixel()).div_ceil(8)
    }
}

impl<'a> ParseableChunk<'a> for Header {
    type Output = [u8; HEADER_LENGTH];

    const HEADER: &'static [u8; 4] = b"IHDR";

    /// Reads the fixed fields. Color type and interlace method codes this
    /// codec has no representation for are rejected here; everything else
    /// is left to [`Header::validate`].
    fn from_bytes(chunk_data: &'a [u8]) -> PngResult<Self> {
        if chunk_data.len() != HEADER_LENGTH {
            return Err(PngError::malformed(format!(
                "IHDR payload is {} bytes, expected {HEADER_LENGTH}",
                chunk_data.len()
            )));
        }
        let (_, (width, height, other_bytes)) =
            tuple((be_u32, be_u32, take(5usize)))(chunk_data)
                .map_err(payload_error::<nom::error::Error<&[u8]>>(Self::HEADER))?;
        Ok(Header {
            width,
            height,
            bit_depth: other_bytes[0],
            color_type: other_bytes[1].try_into()?,
            compression_method: other_bytes[2],
            filter_method: other_bytes[3],
            interlace_method: other_bytes[4].try_into()?,
        })
    }

    fn to_bytes(&self) -> Self::Output {
        let mut bytes = [0; HEADER_LENGTH];
        bytes[0..4].copy_from_slice(&self.width.to_be_bytes());
        bytes[4..8].copy_from_slice(&self.height.to_be_bytes());
        bytes[8] = self.bit_depth;
        bytes[9] = self.color_type as u8;
        bytes[10] = self.compression_method;
        bytes[11] = self.filter_method;
        bytes[12] = self.interlace_method as u8;
        bytes
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorType {
    Grayscale = 0,
    Rgb = 2,
    Palette = 3,
    GrayscaleAlpha = 4,
    #[default]
    RgbAlpha = 6,
}

impl TryFrom<u8> for ColorType {
    type Error = PngError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Grayscale),
            2 => Ok(Self::Rgb),
            3 => Ok(Self::Palette),
            4 => Ok(Self::GrayscaleAlpha),
            6 => Ok(Self::RgbAlpha),
            i => Err(PngError::unsupported(format!("color type {i}"))),
        }
    }
}

impl ColorType {
    pub fn channel_count(&self) -> usize {
        match self {
            Self::Grayscale => 1,
            Self::Palette => 1,
            Self::GrayscaleAlpha => 2,
            Self::Rgb => 3,
            Self::RgbAlpha => 4,
        }
    }

    /// The color type / bit depth compatibility table.
    pub fn allowed_bit_depths(&self) -> &'static [u8] {
        match self {
            Self::Grayscale => &[1, 2, 4, 8, 16],
            Self::Palette => &[1, 2, 4, 8],
            Self::Rgb | Self::GrayscaleAlpha | Self::RgbAlpha => &[8, 16],
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Interlacing {
    #[default]
    None = 0,
    Adam7 = 1,
}

impl TryFrom<u8> for Interlacing {
    type Error = PngError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Adam7),
            i => Err(PngError::unsupported(format!("interlace method {i}"))),
        }
    }
}
