//! Conversion between packed sub-byte samples and one sample per byte.
//!
//! Samples narrower than a byte are packed most significant bits first. At
//! depths 8 and 16 the bytes already are the samples (16-bit samples stay as
//! two big-endian bytes), so both directions just copy.

/// Unpacks every sample in `packed`, including the padding bits of a partial
/// last byte, into `out`.
pub fn expand_into(packed: &[u8], bit_depth: u8, out: &mut Vec<u8>) {
    out.clear();
    if bit_depth >= 8 {
        out.extend_from_slice(packed);
        return;
    }
    let mask = (1u8 << bit_depth) - 1;
    for &byte in packed {
        let mut shift = 8;
        while shift > 0 {
            shift -= bit_depth;
            out.push((byte >> shift) & mask);
        }
    }
}

pub fn expand(packed: &[u8], bit_depth: u8) -> Vec<u8> {
    let mut out = Vec::with_capacity(packed.len() * 8 / usize::from(bit_depth.clamp(1, 8)));
    expand_into(packed, bit_depth, &mut out);
    out
}

/// Packs one-sample-per-byte `samples` at `bit_depth`, masking each sample
/// and zero filling the unused low bits of the last byte.
pub fn pack_into(samples: &[u8], bit_depth: u8, out: &mut Vec<u8>) {
    out.clear();
    if bit_depth >= 8 {
        out.extend_from_slice(samples);
        return;
    }
    let per_byte = usize::from(8 / bit_depth);
    let mask = (1u8 << bit_depth) - 1;
    for group in samples.chunks(per_byte) {
        let mut byte = 0u8;
        let mut shift = 8;
        for &sample in group {
            shift -= bit_depth;
            byte |= (sample & mask) << shift;
        }
        out.push(byte);
    }
}

pub fn pack(samples: &[u8], bit_depth: u8) -> Vec<u8> {
    let mut out = Vec::new();
    pack_into(samples, bit_depth, &mut out);
    out
}
