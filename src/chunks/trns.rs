use super::ParseableChunk;
use crate::error::PngResult;

/// Palette transparency: one alpha per palette entry, possibly fewer entries
/// than the palette has. Missing entries are opaque.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct tRNSChunk {
    alpha: Vec<u8>,
}

impl tRNSChunk {
    /// Builds the shortest table that still carries every non-opaque entry,
    /// or `None` when the whole palette is opaque.
    pub fn from_palette_alpha(alpha: impl IntoIterator<Item = u8>) -> Option<Self> {
        let mut alpha: Vec<u8> = alpha.into_iter().collect();
        let used = alpha.iter().rposition(|&a| a != u8::MAX)? + 1;
        alpha.truncate(used);
        Some(Self { alpha })
    }

    pub fn entries(&self) -> &[u8] {
        &self.alpha
    }
}

impl<'a> ParseableChunk<'a> for tRNSChunk {
    type Output = Vec<u8>;

    const HEADER: &'static [u8; 4] = b"tRNS";

    fn from_bytes(chunk_data: &'a [u8]) -> PngResult<Self> {
        Ok(tRNSChunk {
            alpha: chunk_data.to_vec(),
        })
    }

    fn to_bytes(&self) -> Self::Output {
        self.alpha.clone()
    }
}
