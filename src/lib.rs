pub mod assembler;
pub mod bit_depth;
pub mod chunks;
mod crc;
mod decoder;
mod encoder;
mod error;
pub mod filters;
mod image;
mod image_data;
pub mod interlacing;
mod pixel;
mod png;
mod quantizer;
mod scanlines;

pub use chunks::{
    ihdr::{ColorType, Header, Interlacing},
    text::TextEncoding,
};
pub use decoder::{DecoderOptions, PngDecoder};
pub use encoder::{EncoderOptions, EncoderOptionsBuilder, PngEncoder};
pub use error::{PngError, PngResult};
pub use filters::FilterType;
pub use image::{Image, ImageMetadata, ImageProperty};
pub use image_data::MAX_BLOCK_SIZE;
pub use pixel::{PackedPixel, Pixel, PixelBuffer};
pub use png::PNG;
pub use quantizer::{PopularityQuantizer, QuantizedImage, Quantizer};
