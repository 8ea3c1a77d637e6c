use std::io::Read;

use crate::{
    decoder::{DecoderOptions, PngDecoder},
    encoder::{EncoderOptions, PngEncoder},
    error::PngResult,
    image::Image,
    pixel::Pixel,
};

/// A decoded PNG held as RGBA pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct PNG {
    image: Image<Pixel>,
}

impl PNG {
    pub fn decode(bytes: &[u8]) -> PngResult<Self> {
        Self::decode_with(bytes, DecoderOptions::default())
    }

    pub fn decode_with(bytes: &[u8], options: DecoderOptions) -> PngResult<Self> {
        let image = PngDecoder::new(options).decode(bytes)?;
        Ok(Self { image })
    }

    pub fn read_from<R: Read>(reader: R, options: DecoderOptions) -> PngResult<Self> {
        let image = PngDecoder::new(options).decode_reader(reader)?;
        Ok(Self { image })
    }

    /// Encodes as 8-bit RGBA, adaptively filtered.
    pub fn encode(&self) -> PngResult<Vec<u8>> {
        self.encode_with(EncoderOptions::default())
    }

    pub fn encode_with(&self, options: EncoderOptions) -> PngResult<Vec<u8>> {
        PngEncoder::new(options).encode_to_vec(&self.image)
    }

    pub fn from_image(image: Image<Pixel>) -> Self {
        Self { image }
    }

    pub fn image(&self) -> &Image<Pixel> {
        &self.image
    }

    pub fn into_image(self) -> Image<Pixel> {
        self.image
    }
}
