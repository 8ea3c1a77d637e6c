use log::warn;

use super::ParseableChunk;
use crate::{error::PngResult, image::ImageProperty};

/// How `tEXt` keywords and values are turned into bytes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// ISO 8859-1, as the PNG standard prescribes. Characters outside it are
    /// written as `?`.
    #[default]
    Latin1,
    Utf8,
    /// Little-endian UTF-16; keyword and value are separated by a zero code
    /// unit instead of a zero byte.
    Utf16Le,
}

impl TextEncoding {
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            Self::Latin1 => text
                .chars()
                .map(|c| u8::try_from(c).unwrap_or(b'?'))
                .collect(),
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::Utf16Le => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
        }
    }

    pub fn decode(&self, bytes: &[u8]) -> String {
        match self {
            Self::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Self::Utf16Le => {
                let units = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
                char::decode_utf16(units)
                    .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
                    .collect()
            }
        }
    }

    fn separator(&self) -> &'static [u8] {
        match self {
            Self::Latin1 | Self::Utf8 => &[0],
            Self::Utf16Le => &[0, 0],
        }
    }

    /// Splits a payload into keyword and text at the first separator.
    fn split<'a>(&self, payload: &'a [u8]) -> Option<(&'a [u8], &'a [u8])> {
        let separator = self.separator();
        let position = payload
            .chunks(separator.len())
            .position(|unit| unit == separator)?
            * separator.len();
        Some((
            &payload[..position],
            &payload[position + separator.len()..],
        ))
    }
}

/// A keyword/text pair. The payload is kept as bytes; which encoding applies
/// is the reader's configuration, not the chunk's.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct tEXtChunk {
    payload: Vec<u8>,
}

impl tEXtChunk {
    pub fn from_property(property: &ImageProperty, encoding: TextEncoding) -> Self {
        let mut payload = encoding.encode(&property.name);
        payload.extend(encoding.separator());
        payload.extend(encoding.encode(&property.value));
        Self { payload }
    }

    pub fn to_property(&self, encoding: TextEncoding) -> ImageProperty {
        match encoding.split(&self.payload) {
            Some((name, value)) => ImageProperty::new(encoding.decode(name), encoding.decode(value)),
            None => {
                warn!("tEXt chunk has no keyword separator, keeping it all as the keyword");
                ImageProperty::new(encoding.decode(&self.payload), String::new())
            }
        }
    }
}

impl<'a> ParseableChunk<'a> for tEXtChunk {
    type Output = Vec<u8>;

    const HEADER: &'static [u8; 4] = b"tEXt";

    fn from_bytes(chunk_data: &'a [u8]) -> PngResult<Self> {
        Ok(Self {
            payload: chunk_data.to_vec(),
        })
    }

    fn to_bytes(&self) -> Self::Output {
        self.payload.clone()
    }
}
