//! Chunk-level container I/O.
//!
//! Every chunk is `length (u32 BE) | type (4 ASCII bytes) | data | CRC (u32 BE)`,
//! with the CRC covering the type and the data.

use std::io::Write;

use log::trace;
use nom::{
    bytes::complete::take, combinator::map_res, number::complete::be_u32, sequence::tuple,
    IResult,
};

use crate::{
    crc::chunk_crc,
    error::{PngError, PngResult},
};

pub mod gama;
pub mod idat;
pub mod iend;
pub mod ihdr;
pub mod phys;
pub mod plte;
pub mod text;
pub mod trns;

/// The eight bytes every PNG stream starts with.
pub const SIGNATURE: [u8; 8] = *b"\x89PNG\x0d\x0a\x1a\x0a";

#[allow(non_camel_case_types, clippy::upper_case_acronyms)]
#[derive(Debug)]
pub enum Chunk<'a> {
    IHDR(ihdr::Header),
    PLTE(plte::PLTEChunk),
    tRNS(trns::tRNSChunk),
    pHYs(phys::pHYsChunk),
    gAMA(gama::gAMAChunk),
    tEXt(text::tEXtChunk),
    IDAT(idat::IDATChunk<'a>),
    IEND,
    Unknown(RawChunk<'a>),
}

impl<'a> Chunk<'a> {
    /// Interprets a CRC-checked chunk. Types this codec does not know are kept
    /// as [`Chunk::Unknown`] so callers can skip them.
    pub fn from_raw(raw: RawChunk<'a>) -> PngResult<Self> {
        let data = raw.data;
        Ok(match &raw.chunk_type {
            t if t == ihdr::Header::HEADER => Chunk::IHDR(ihdr::Header::from_bytes(data)?),
            t if t == plte::PLTEChunk::HEADER => Chunk::PLTE(plte::PLTEChunk::from_bytes(data)?),
            t if t == trns::tRNSChunk::HEADER => Chunk::tRNS(trns::tRNSChunk::from_bytes(data)?),
            t if t == phys::pHYsChunk::HEADER => Chunk::pHYs(phys::pHYsChunk::from_bytes(data)?),
            t if t == gama::gAMAChunk::HEADER => Chunk::gAMA(gama::gAMAChunk::from_bytes(data)?),
            t if t == text::tEXtChunk::HEADER => Chunk::tEXt(text::tEXtChunk::from_bytes(data)?),
            t if t == idat::IDATChunk::HEADER => Chunk::IDAT(idat::IDATChunk::from_bytes(data)?),
            t if t == iend::IENDChunk::HEADER => Chunk::IEND,
            _ => Chunk::Unknown(raw),
        })
    }
}

/// A chunk exactly as framed in the stream. `data` borrows from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawChunk<'a> {
    pub chunk_type: [u8; 4],
    pub data: &'a [u8],
    pub crc: u32,
}

impl RawChunk<'_> {
    pub fn length(&self) -> u32 {
        self.data.len() as u32
    }

    pub fn type_name(&self) -> String {
        String::from_utf8_lossy(&self.chunk_type).into_owned()
    }
}

fn chunk_frame(input: &[u8]) -> IResult<&[u8], RawChunk<'_>> {
    let (input, (length, chunk_type)) = tuple((
        be_u32,
        map_res(take(4usize), |t: &[u8]| <[u8; 4]>::try_from(t)),
    ))(input)?;
    let (input, (data, crc)) = tuple((take(length as usize), be_u32))(input)?;
    Ok((
        input,
        RawChunk {
            chunk_type,
            data,
            crc,
        },
    ))
}

/// Reads chunks one at a time from an in-memory stream, checking each CRC.
#[derive(Debug, Clone)]
pub struct ChunkReader<'a> {
    source: &'a [u8],
    finished: bool,
}

impl<'a> ChunkReader<'a> {
    /// `source` starts right after the signature.
    pub fn new(source: &'a [u8]) -> Self {
        Self {
            source,
            finished: false,
        }
    }

    /// Returns `Ok(None)` once the stream is exhausted. A stream that ends in
    /// the middle of a chunk is malformed, and a chunk whose stored CRC
    /// disagrees with its contents is corrupt.
    pub fn read_chunk(&mut self) -> PngResult<Option<RawChunk<'a>>> {
        if self.source.is_empty() {
            return Ok(None);
        }
        let (rest, chunk) = chunk_frame(self.source).map_err(|_| {
            PngError::malformed(format!(
                "stream ends inside a chunk ({} bytes left)",
                self.source.len()
            ))
        })?;
        let actual = chunk_crc(&chunk.chunk_type, chunk.data);
        if actual != chunk.crc {
            return Err(PngError::CorruptChunk {
                chunk_type: chunk.type_name(),
                expected: chunk.crc,
                actual,
            });
        }
        trace!("read {} chunk, {} bytes", chunk.type_name(), chunk.length());
        self.source = rest;
        Ok(Some(chunk))
    }

    pub fn remaining(&self) -> &'a [u8] {
        self.source
    }
}

impl<'a> Iterator for ChunkReader<'a> {
    type Item = PngResult<RawChunk<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_chunk() {
            Ok(Some(chunk)) => Some(Ok(chunk)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Frames chunks onto any byte sink.
#[derive(Debug)]
pub struct ChunkWriter<W> {
    inner: W,
}

impl<W: Write> ChunkWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn write_signature(&mut self) -> PngResult<()> {
        self.inner.write_all(&SIGNATURE)?;
        Ok(())
    }

    /// Writes length, type, data and CRC in that order. The CRC is written for
    /// empty chunks too.
    pub fn write_chunk(&mut self, chunk_type: &[u8; 4], data: &[u8]) -> PngResult<()> {
        let length = u32::try_from(data.len()).map_err(|_| {
            PngError::unsupported(format!(
                "{} bytes do not fit in a single chunk",
                data.len()
            ))
        })?;
        self.inner.write_all(&length.to_be_bytes())?;
        self.inner.write_all(chunk_type)?;
        self.inner.write_all(data)?;
        self.inner
            .write_all(&chunk_crc(chunk_type, data).to_be_bytes())?;
        trace!(
            "wrote {} chunk, {} bytes",
            String::from_utf8_lossy(chunk_type),
            length
        );
        Ok(())
    }

    pub fn write<'a, C: ParseableChunk<'a>>(&mut self, chunk: &C) -> PngResult<()> {
        self.write_chunk(C::HEADER, chunk.to_bytes().as_ref())
    }

    pub fn flush(&mut self) -> PngResult<()> {
        self.inner.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

pub trait ParseableChunk<'a>: Sized {
    type Output: AsRef<[u8]>;
    const HEADER: &'static [u8; 4];

    fn from_bytes(chunk_data: &'a [u8]) -> PngResult<Self>;
    fn to_bytes(&self) -> Self::Output;
}

/// Maps a nom failure inside a chunk payload to a malformed-stream error.
pub(crate) fn payload_error<E>(chunk_type: &[u8; 4]) -> impl FnOnce(nom::Err<E>) -> PngError + '_ {
    move |_| {
        PngError::malformed(format!(
            "{} chunk payload is too short",
            String::from_utf8_lossy(chunk_type)
        ))
    }
}
