use super::ParseableChunk;
use crate::error::PngResult;

pub struct IENDChunk;

impl<'a> ParseableChunk<'a> for IENDChunk {
    type Output = [u8; 0];

    const HEADER: &'static [u8; 4] = b"IEND";

    fn from_bytes(_chunk_data: &'a [u8]) -> PngResult<Self> {
        Ok(Self)
    }

    fn to_bytes(&self) -> Self::Output {
        []
    }
}
