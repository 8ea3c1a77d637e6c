use log::warn;
use nom::{bytes::complete::take, combinator::map, multi::count};

use super::{payload_error, ParseableChunk};
use crate::error::PngResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry(pub u8, pub u8, pub u8);

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PLTEChunk {
    colors: Vec<Entry>,
}

impl PLTEChunk {
    pub fn new(colors: Vec<Entry>) -> Self {
        Self { colors }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.colors
    }
}

impl<'a> ParseableChunk<'a> for PLTEChunk {
    type Output = Vec<u8>;

    const HEADER: &'static [u8; 4] = b"PLTE";

    fn from_bytes(chunk_data: &'a [u8]) -> PngResult<Self> {
        if chunk_data.len() % 3 != 0 {
            warn!(
                "PLTE payload of {} bytes is not a whole number of entries, ignoring the tail",
                chunk_data.len()
            );
        }
        let entry_count = chunk_data.len() / 3;
        let (_, colors) = count(
            map(take(3usize), |i: &[u8]| Entry(i[0], i[1], i[2])),
            entry_count,
        )(chunk_data)
        .map_err(payload_error::<nom::error::Error<&[u8]>>(Self::HEADER))?;
        Ok(PLTEChunk { colors })
    }

    fn to_bytes(&self) -> Self::Output {
        self.colors
            .iter()
            .flat_map(|&Entry(r, g, b)| [r, g, b])
            .collect()
    }
}
