use log::debug;
use miniz_oxide::{
    deflate::compress_to_vec_zlib,
    inflate::{decompress_to_vec_zlib_with_limit, TINFLStatus},
};

use crate::error::{PngError, PngResult};

/// Upper bound on the payload of each `IDAT` chunk the encoder writes.
pub const MAX_BLOCK_SIZE: usize = 65_535;

/// Inflates the concatenated `IDAT` payloads, stopping after `limit` bytes.
/// Output past the limit is never produced.
pub(crate) fn decompress_data(compressed_data: &[u8], limit: usize) -> PngResult<Vec<u8>> {
    let data = match decompress_to_vec_zlib_with_limit(compressed_data, limit) {
        Ok(data) => data,
        Err(e) if e.status == TINFLStatus::HasMoreOutput && e.output.len() >= limit => {
            debug!("image data continues past {limit} bytes, ignoring the rest");
            let mut data = e.output;
            data.truncate(limit);
            data
        }
        Err(e) => return Err(PngError::Inflate(format!("{:?}", e.status))),
    };
    debug!(
        "inflated {} bytes of image data to {}",
        compressed_data.len(),
        data.len()
    );
    Ok(data)
}

/// Deflates filtered scanlines at `level` (0 to 10).
pub(crate) fn compress_data(data: &[u8], level: u8) -> Vec<u8> {
    let compressed = compress_to_vec_zlib(data, level.min(10));
    debug!(
        "deflated {} bytes of image data to {} at level {level}",
        data.len(),
        compressed.len()
    );
    compressed
}
