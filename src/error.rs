use thiserror::Error;

/// Everything that can stop a decode or encode call.
///
/// None of these are recoverable inside the codec; the call that produced one
/// has already been abandoned.
#[derive(Debug, Error)]
pub enum PngError {
    /// Truncated chunks, chunks after `IEND`, missing `IHDR`/`IEND`, or image
    /// data that ends before the last scanline.
    #[error("Malformed stream: {0}")]
    MalformedStream(String),

    #[error("Corrupt {chunk_type} chunk: computed CRC {actual:#010x}, stored CRC {expected:#010x}")]
    CorruptChunk {
        chunk_type: String,
        expected: u32,
        actual: u32,
    },

    /// A well formed stream using something this codec does not handle.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Image is {width}x{height} but at most {max_width}x{max_height} is allowed")]
    DimensionLimitExceeded {
        width: u32,
        height: u32,
        max_width: u32,
        max_height: u32,
    },

    #[error("Palette index {index} is out of range for a palette of {palette_len} entries")]
    PaletteIndexOutOfRange { index: u8, palette_len: usize },

    #[error("Failed to inflate image data: {0}")]
    Inflate(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PngResult<T> = Result<T, PngError>;

impl PngError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedStream(message.into())
    }

    pub(crate) fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedFormat(message.into())
    }
}
