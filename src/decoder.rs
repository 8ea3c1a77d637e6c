use std::{io::Read, marker::PhantomData};

use log::{debug, warn};
use nom::{bytes::complete::tag, IResult};

use crate::{
    assembler::assemble_row,
    bit_depth::expand_into,
    chunks::{
        ihdr::{ColorType, Header},
        plte::Entry,
        text::TextEncoding,
        Chunk, ChunkReader, SIGNATURE,
    },
    error::{PngError, PngResult},
    filters::{reconstruct_scanline, FilterType},
    image::{Image, ImageMetadata},
    image_data::decompress_data,
    pixel::{PackedPixel, PixelBuffer},
    scanlines::{image_data_length, scanline_passes, ScanlineBuffer},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Images wider than this are rejected before any pixel memory is
    /// allocated.
    pub max_width: u32,
    pub max_height: u32,
    /// Encoding of `tEXt` keywords and values.
    pub text_encoding: TextEncoding,
    /// Skip `pHYs`, `gAMA` and `tEXt` entirely.
    pub ignore_metadata: bool,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            max_width: 65_535,
            max_height: 65_535,
            text_encoding: TextEncoding::default(),
            ignore_metadata: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PngDecoder {
    options: DecoderOptions,
}

impl PngDecoder {
    pub fn new(options: DecoderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    /// Decodes a whole PNG stream into an owned image.
    pub fn decode<P: PackedPixel>(&self, bytes: &[u8]) -> PngResult<Image<P>> {
        let (mut image, metadata) =
            self.decode_into(bytes, |header| Image::new(header.width, header.height))?;
        image.metadata = metadata;
        Ok(image)
    }

    /// Reads the stream to its end first, then decodes it like [`Self::decode`].
    pub fn decode_reader<P: PackedPixel, R: Read>(&self, mut reader: R) -> PngResult<Image<P>> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        self.decode(&bytes)
    }

    /// Decodes into a caller-provided pixel buffer. `make_buffer` is called
    /// once the header has been validated and the image data is known to
    /// cover every scanline. It must return a buffer with the header's
    /// dimensions.
    pub fn decode_into<B, F>(&self, bytes: &[u8], make_buffer: F) -> PngResult<(B, ImageMetadata)>
    where
        B: PixelBuffer,
        F: FnOnce(&Header) -> B,
    {
        let chunks = DecodeSession::new(bytes, self.options)
            .check_signature()?
            .read_chunks()?;
        let header = &chunks.header;
        let data = inflate_scanlines(&chunks)?;
        let mut buffer = make_buffer(header);
        if (buffer.width(), buffer.height()) != (header.width, header.height) {
            return Err(PngError::unsupported(format!(
                "pixel buffer is {}x{} but the image is {}x{}",
                buffer.width(),
                buffer.height(),
                header.width,
                header.height
            )));
        }
        decode_pixels(&chunks, &data, &mut buffer)?;
        Ok((buffer, chunks.metadata))
    }

    /// Reads chunks only as far as the header and validates it.
    pub fn read_header(&self, bytes: &[u8]) -> PngResult<Header> {
        let session = DecodeSession::new(bytes, self.options).check_signature()?;
        let mut reader = ChunkReader::new(session.input);
        while let Some(raw) = reader.read_chunk()? {
            if let Chunk::IHDR(header) = Chunk::from_raw(raw)? {
                session.check_header(&header)?;
                return Ok(header);
            }
        }
        Err(PngError::malformed("stream has no IHDR chunk"))
    }
}

struct Signature;
struct Chunks;

/// One decode call, moving from signature check to chunk reading.
struct DecodeSession<'a, State> {
    input: &'a [u8],
    options: DecoderOptions,
    state: PhantomData<State>,
}

/// Everything collected from the chunk stream before pixels are rebuilt.
#[derive(Debug)]
struct DecodedChunks {
    header: Header,
    palette: Vec<Entry>,
    palette_alpha: Vec<u8>,
    data: Vec<u8>,
    metadata: ImageMetadata,
}

impl<'a> DecodeSession<'a, Signature> {
    fn new(input: &'a [u8], options: DecoderOptions) -> Self {
        Self {
            input,
            options,
            state: PhantomData,
        }
    }

    fn check_signature(self) -> PngResult<DecodeSession<'a, Chunks>> {
        let (rest, _) = parse_signature(self.input)
            .map_err(|_| PngError::malformed("input doesn't start with the PNG signature"))?;
        Ok(DecodeSession {
            input: rest,
            options: self.options,
            state: PhantomData,
        })
    }
}

impl<'a> DecodeSession<'a, Chunks> {
    fn check_header(&self, header: &Header) -> PngResult<()> {
        header.validate()?;
        let DecoderOptions {
            max_width,
            max_height,
            ..
        } = self.options;
        if header.width > max_width || header.height > max_height {
            return Err(PngError::DimensionLimitExceeded {
                width: header.width,
                height: header.height,
                max_width,
                max_height,
            });
        }
        Ok(())
    }

    fn read_chunks(self) -> PngResult<DecodedChunks> {
        let mut reader = ChunkReader::new(self.input);
        let mut header: Option<Header> = None;
        let mut palette = Vec::new();
        let mut palette_alpha = Vec::new();
        let mut data = Vec::new();
        let mut metadata = ImageMetadata::default();
        let mut idat_count = 0;
        let mut palette_seen = false;
        let keep_metadata = !self.options.ignore_metadata;

        loop {
            let raw = reader
                .read_chunk()?
                .ok_or_else(|| PngError::malformed("stream ends without an IEND chunk"))?;
            match Chunk::from_raw(raw)? {
                Chunk::IHDR(h) => {
                    if header.is_some() {
                        return Err(PngError::malformed("more than one IHDR chunk"));
                    }
                    self.check_header(&h)?;
                    debug!(
                        "{}x{} {:?} at {} bits, {:?} interlacing",
                        h.width, h.height, h.color_type, h.bit_depth, h.interlace_method
                    );
                    header = Some(h);
                }
                Chunk::IDAT(idat) => {
                    if header.is_none() {
                        return Err(PngError::malformed("IDAT chunk before IHDR"));
                    }
                    data.extend_from_slice(idat.data);
                    idat_count += 1;
                }
                Chunk::PLTE(plte) => {
                    let color_type = header
                        .ok_or_else(|| PngError::malformed("PLTE chunk before IHDR"))?
                        .color_type;
                    if matches!(color_type, ColorType::Grayscale | ColorType::GrayscaleAlpha) {
                        return Err(PngError::malformed(format!(
                            "PLTE chunk in a {color_type:?} image"
                        )));
                    }
                    if palette_seen {
                        return Err(PngError::malformed("more than one PLTE chunk"));
                    }
                    if idat_count > 0 {
                        return Err(PngError::malformed("PLTE chunk after IDAT"));
                    }
                    palette = plte.entries().to_vec();
                    palette_seen = true;
                }
                Chunk::tRNS(trns) => palette_alpha = trns.entries().to_vec(),
                Chunk::pHYs(phys) if keep_metadata => {
                    if let Some((horizontal, vertical)) = phys.resolution() {
                        metadata.horizontal_resolution = horizontal;
                        metadata.vertical_resolution = vertical;
                    }
                }
                Chunk::gAMA(gama) if keep_metadata => metadata.gamma = Some(gama.gamma()),
                Chunk::tEXt(text) if keep_metadata => metadata
                    .properties
                    .push(text.to_property(self.options.text_encoding)),
                Chunk::IEND => break,
                Chunk::Unknown(raw) => warn!("skipping unknown {} chunk", raw.type_name()),
                _ => (),
            }
        }

        if !reader.remaining().is_empty() {
            return Err(PngError::malformed(format!(
                "{} bytes after the IEND chunk",
                reader.remaining().len()
            )));
        }
        let header = header.ok_or_else(|| PngError::malformed("stream has no IHDR chunk"))?;
        debug!("{idat_count} IDAT chunks, {} compressed bytes", data.len());

        if header.color_type == ColorType::Palette {
            if palette.is_empty() {
                return Err(PngError::malformed("palette image without a PLTE chunk"));
            }
            if palette_alpha.len() > palette.len() {
                warn!(
                    "tRNS has {} entries for a palette of {}, ignoring the rest",
                    palette_alpha.len(),
                    palette.len()
                );
                palette_alpha.truncate(palette.len());
            }
        } else if !palette_alpha.is_empty() {
            warn!("ignoring tRNS on a {:?} image", header.color_type);
            palette_alpha.clear();
        }

        Ok(DecodedChunks {
            header,
            palette,
            palette_alpha,
            data,
            metadata,
        })
    }
}

fn parse_signature(input: &[u8]) -> IResult<&[u8], &[u8]> {
    tag(&SIGNATURE[..])(input)
}

/// Inflates exactly the bytes the scanline plan needs. Anything the stream
/// holds past that is never inflated.
fn inflate_scanlines(chunks: &DecodedChunks) -> PngResult<Vec<u8>> {
    let needed = image_data_length(&chunks.header);
    let data = decompress_data(&chunks.data, needed)?;
    if data.len() < needed {
        return Err(PngError::malformed(format!(
            "image data holds {} bytes, scanlines need {needed}",
            data.len()
        )));
    }
    Ok(data)
}

/// Unfilters and unpacks every scanline, pass by pass, writing each pixel to
/// its place in `buffer`.
fn decode_pixels<B: PixelBuffer>(
    chunks: &DecodedChunks,
    data: &[u8],
    buffer: &mut B,
) -> PngResult<()> {
    let header = &chunks.header;

    let bpp = header.bytes_per_pixel();
    let mut scanlines = ScanlineBuffer::new(header.scanline_length(header.width));
    let mut samples = Vec::new();
    let mut pixels = vec![B::Pixel::default(); header.width as usize];
    let mut offset = 0;

    for pass in scanline_passes(header) {
        let length = header.scanline_length(pass.width) + 1;
        scanlines.start_pass(length - 1);
        let row = &mut pixels[..pass.width as usize];
        for y in 0..pass.height {
            let (current, previous) = scanlines.split();
            current.copy_from_slice(&data[offset..offset + length]);
            offset += length;

            let filter = FilterType::try_from(current[0])?;
            reconstruct_scanline(filter, &mut current[1..], &previous[1..], bpp);
            expand_into(&current[1..], header.bit_depth, &mut samples);
            assemble_row(
                &samples,
                header.color_type,
                header.bit_depth,
                &chunks.palette,
                &chunks.palette_alpha,
                row,
            )?;
            for (x, pixel) in row.iter().enumerate() {
                let (column, line) = pass.position(x as u32, y);
                buffer.set_pixel(column, line, *pixel);
            }
            scanlines.rotate();
        }
    }
    Ok(())
}
