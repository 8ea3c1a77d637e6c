use nom::number::complete::be_u32;

use super::{payload_error, ParseableChunk};
use crate::error::PngResult;

/// Image gamma, stored as gamma × 100000.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct gAMAChunk {
    pub gamma: u32,
}

impl gAMAChunk {
    pub fn from_gamma(gamma: f32) -> Self {
        Self {
            gamma: (gamma * 100_000.0) as u32,
        }
    }

    pub fn gamma(&self) -> f32 {
        self.gamma as f32 / 100_000.0
    }
}

impl<'a> ParseableChunk<'a> for gAMAChunk {
    type Output = [u8; 4];

    const HEADER: &'static [u8; 4] = b"gAMA";

    fn from_bytes(chunk_data: &'a [u8]) -> PngResult<Self> {
        let (_, gamma) = be_u32(chunk_data)
            .map_err(payload_error::<nom::error::Error<&[u8]>>(Self::HEADER))?;
        Ok(Self { gamma })
    }

    fn to_bytes(&self) -> Self::Output {
        self.gamma.to_be_bytes()
    }
}
