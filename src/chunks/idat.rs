use super::ParseableChunk;
use crate::error::PngResult;

/// One slice of the zlib stream. The image data is the concatenation of
/// every `IDAT` payload in stream order.
#[derive(Debug, Clone, Copy)]
pub struct IDATChunk<'a> {
    pub data: &'a [u8],
}

impl<'a> ParseableChunk<'a> for IDATChunk<'a> {
    type Output = &'a [u8];

    const HEADER: &'static [u8; 4] = b"IDAT";

    fn from_bytes(chunk_data: &'a [u8]) -> PngResult<Self> {
        Ok(IDATChunk { data: chunk_data })
    }

    fn to_bytes(&self) -> Self::Output {
        self.data
    }
}
