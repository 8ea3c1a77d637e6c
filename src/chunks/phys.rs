use nom::{
    number::complete::{be_u32, u8},
    sequence::tuple,
};

use super::{payload_error, ParseableChunk};
use crate::error::PngResult;

/// Resolution is kept as pixels per inch; `pHYs` stores pixels per metre.
pub const INCHES_PER_METER: f64 = 39.3700787;

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct pHYsChunk {
    pub x_axis_ppu: u32,
    pub y_axis_ppu: u32,
    pub unit: Unit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Unknown,
    Meter,
}
impl From<u8> for Unit {
    fn from(value: u8) -> Self {
        if value == 1 {
            Self::Meter
        } else {
            Self::Unknown
        }
    }
}

impl pHYsChunk {
    pub fn from_resolution(horizontal_ppi: f64, vertical_ppi: f64) -> Self {
        Self {
            x_axis_ppu: (horizontal_ppi * INCHES_PER_METER).round() as u32,
            y_axis_ppu: (vertical_ppi * INCHES_PER_METER).round() as u32,
            unit: Unit::Meter,
        }
    }

    /// Horizontal and vertical pixels per inch. Only an aspect ratio is known
    /// when the unit is unspecified, so there is no resolution then.
    pub fn resolution(&self) -> Option<(f64, f64)> {
        match self.unit {
            Unit::Meter => Some((
                self.x_axis_ppu as f64 / INCHES_PER_METER,
                self.y_axis_ppu as f64 / INCHES_PER_METER,
            )),
            Unit::Unknown => None,
        }
    }
}

impl<'a> ParseableChunk<'a> for pHYsChunk {
    type Output = [u8; 9];

    const HEADER: &'static [u8; 4] = b"pHYs";

    fn from_bytes(chunk_data: &'a [u8]) -> PngResult<Self> {
        let (_, (x_axis_ppu, y_axis_ppu, unit)) = tuple((be_u32, be_u32, u8))(chunk_data)
            .map_err(payload_error::<nom::error::Error<&[u8]>>(Self::HEADER))?;
        Ok(pHYsChunk {
            x_axis_ppu,
            y_axis_ppu,
            unit: unit.into(),
        })
    }

    fn to_bytes(&self) -> Self::Output {
        let mut bytes = [0; 9];
        bytes[0..4].copy_from_slice(&self.x_axis_ppu.to_be_bytes());
        bytes[4..8].copy_from_slice(&self.y_axis_ppu.to_be_bytes());
        bytes[8] = match self.unit {
            Unit::Meter => 1,
            Unit::Unknown => 0,
        };
        bytes
    }
}
