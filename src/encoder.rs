use std::io::Write;

use log::debug;

use crate::{
    assembler::disassemble_row,
    bit_depth::pack_into,
    chunks::{
        gama::gAMAChunk,
        idat::IDATChunk,
        iend::IENDChunk,
        ihdr::{ColorType, Header, Interlacing},
        phys::pHYsChunk,
        plte::{Entry, PLTEChunk},
        text::{tEXtChunk, TextEncoding},
        trns::tRNSChunk,
        ChunkWriter,
    },
    error::{PngError, PngResult},
    filters::{FilterScratch, FilterType},
    image::{Image, ImageMetadata},
    image_data::{compress_data, MAX_BLOCK_SIZE},
    pixel::{PackedPixel, PixelBuffer},
    quantizer::{PopularityQuantizer, QuantizedImage, Quantizer},
    scanlines::{image_data_length, scanline_passes, ScanlineBuffer},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncoderOptions {
    pub color_type: ColorType,
    /// `None` picks 8 bits, or for palette images the fewest bits that can
    /// index the palette.
    pub bit_depth: Option<u8>,
    pub interlace: Interlacing,
    /// Deflate level, 0 to 10.
    pub compression_level: u8,
    /// Use this filter on every scanline instead of choosing one per row.
    pub filter: Option<FilterType>,
    /// Largest palette the quantizer may produce.
    pub max_colors: usize,
    /// Written as `gAMA`. Falls back to the image's own gamma when unset.
    pub gamma: Option<f32>,
    pub text_encoding: TextEncoding,
    /// Write one `tEXt` chunk per image property.
    pub write_text: bool,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            color_type: ColorType::RgbAlpha,
            bit_depth: None,
            interlace: Interlacing::None,
            compression_level: 6,
            filter: None,
            max_colors: 256,
            gamma: None,
            text_encoding: TextEncoding::default(),
            write_text: true,
        }
    }
}

impl EncoderOptions {
    pub fn builder() -> EncoderOptionsBuilder {
        EncoderOptionsBuilder::default()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EncoderOptionsBuilder {
    options: EncoderOptions,
}

impl EncoderOptionsBuilder {
    pub fn color_type(mut self, color_type: ColorType) -> Self {
        self.options.color_type = color_type;
        self
    }

    pub fn bit_depth(mut self, bit_depth: u8) -> Self {
        self.options.bit_depth = Some(bit_depth);
        self
    }

    pub fn interlace(mut self, interlace: Interlacing) -> Self {
        self.options.interlace = interlace;
        self
    }

    pub fn compression_level(mut self, level: u8) -> Self {
        self.options.compression_level = level;
        self
    }

    pub fn filter(mut self, filter: FilterType) -> Self {
        self.options.filter = Some(filter);
        self
    }

    pub fn max_colors(mut self, max_colors: usize) -> Self {
        self.options.max_colors = max_colors;
        self
    }

    pub fn gamma(mut self, gamma: f32) -> Self {
        self.options.gamma = Some(gamma);
        self
    }

    pub fn text_encoding(mut self, encoding: TextEncoding) -> Self {
        self.options.text_encoding = encoding;
        self
    }

    pub fn write_text(mut self, write_text: bool) -> Self {
        self.options.write_text = write_text;
        self
    }

    pub fn build(self) -> EncoderOptions {
        self.options
    }
}

#[derive(Debug, Clone, Default)]
pub struct PngEncoder<Q = PopularityQuantizer> {
    options: EncoderOptions,
    quantizer: Q,
}

impl PngEncoder {
    pub fn new(options: EncoderOptions) -> Self {
        Self::with_quantizer(options, PopularityQuantizer)
    }
}

impl<Q: Quantizer> PngEncoder<Q> {
    pub fn with_quantizer(options: EncoderOptions, quantizer: Q) -> Self {
        Self { options, quantizer }
    }

    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    pub fn encode_to_vec<P: PackedPixel>(&self, image: &Image<P>) -> PngResult<Vec<u8>> {
        self.encode(image, &image.metadata, Vec::new())
    }

    /// Writes `image` as a complete PNG stream and hands the writer back.
    ///
    /// Chunks go out in a fixed order: `IHDR`, then `PLTE` and `tRNS` for
    /// palette images, `pHYs`, `gAMA`, `tEXt`, the `IDAT` blocks and `IEND`.
    pub fn encode<B: PixelBuffer, W: Write>(
        &self,
        image: &B,
        metadata: &ImageMetadata,
        writer: W,
    ) -> PngResult<W> {
        let options = &self.options;
        let quantized = match options.color_type {
            ColorType::Palette => Some(self.quantize(image)?),
            _ => None,
        };
        let bit_depth = self.bit_depth(quantized.as_ref())?;
        let header = Header::new(
            image.width(),
            image.height(),
            bit_depth,
            options.color_type,
            options.interlace,
        );
        header.validate()?;
        debug!(
            "encoding {}x{} as {:?} at {} bits, {:?} interlacing",
            header.width, header.height, header.color_type, header.bit_depth, header.interlace_method
        );

        let scanlines = self.filtered_scanlines(&header, image, quantized.as_ref())?;
        let compressed = compress_data(&scanlines, options.compression_level);

        let mut writer = ChunkWriter::new(writer);
        writer.write_signature()?;
        writer.write(&header)?;
        if let Some(quantized) = &quantized {
            let entries = quantized
                .palette
                .iter()
                .map(|&[red, green, blue, _]| Entry(red, green, blue))
                .collect();
            writer.write(&PLTEChunk::new(entries))?;
            if let Some(trns) =
                tRNSChunk::from_palette_alpha(quantized.palette.iter().map(|color| color[3]))
            {
                writer.write(&trns)?;
            }
        }
        if metadata.horizontal_resolution > 0.0 && metadata.vertical_resolution > 0.0 {
            writer.write(&pHYsChunk::from_resolution(
                metadata.horizontal_resolution,
                metadata.vertical_resolution,
            ))?;
        }
        if let Some(gamma) = options.gamma.or(metadata.gamma) {
            writer.write(&gAMAChunk::from_gamma(gamma))?;
        }
        if options.write_text {
            for property in &metadata.properties {
                writer.write(&tEXtChunk::from_property(property, options.text_encoding))?;
            }
        }
        let mut blocks = 0;
        for data in compressed.chunks(MAX_BLOCK_SIZE) {
            writer.write(&IDATChunk { data })?;
            blocks += 1;
        }
        writer.write(&IENDChunk)?;
        writer.flush()?;
        debug!("wrote {} compressed bytes in {blocks} IDAT chunks", compressed.len());
        Ok(writer.into_inner())
    }

    /// Runs the quantizer and checks that what came back can be written.
    fn quantize<B: PixelBuffer>(&self, image: &B) -> PngResult<QuantizedImage> {
        let quantized = self.quantizer.quantize(image, self.options.max_colors);
        let pixel_count = image.width() as usize * image.height() as usize;
        if quantized.palette.is_empty() || quantized.palette.len() > 256 {
            return Err(PngError::unsupported(format!(
                "quantizer produced a palette of {} colors",
                quantized.palette.len()
            )));
        }
        if quantized.indices.len() != pixel_count {
            return Err(PngError::unsupported(format!(
                "quantizer produced {} indices for {pixel_count} pixels",
                quantized.indices.len()
            )));
        }
        if let Some(&index) = quantized
            .indices
            .iter()
            .find(|&&i| i as usize >= quantized.palette.len())
        {
            return Err(PngError::PaletteIndexOutOfRange {
                index,
                palette_len: quantized.palette.len(),
            });
        }
        debug!("palette of {} colors", quantized.palette.len());
        Ok(quantized)
    }

    fn bit_depth(&self, quantized: Option<&QuantizedImage>) -> PngResult<u8> {
        let Some(quantized) = quantized else {
            return Ok(self.options.bit_depth.unwrap_or(8));
        };
        let colors = quantized.palette.len();
        let smallest = [1u8, 2, 4, 8]
            .into_iter()
            .find(|&depth| 1usize << depth >= colors)
            .unwrap_or(8);
        match self.options.bit_depth {
            Some(depth) if depth < smallest => Err(PngError::unsupported(format!(
                "{depth} bits cannot index a palette of {colors} colors"
            ))),
            Some(depth) => Ok(depth),
            None => Ok(smallest),
        }
    }

    /// A filter used for every row, or `None` to choose per row. Rows of
    /// palette indices and sub-byte samples are never filtered.
    fn fixed_filter(&self, header: &Header) -> Option<FilterType> {
        match self.options.filter {
            Some(filter) => Some(filter),
            None if header.color_type == ColorType::Palette || header.bit_depth < 8 => {
                Some(FilterType::None)
            }
            None => None,
        }
    }

    /// Gathers, packs and filters every scanline, pass by pass, into one
    /// buffer ready for deflate.
    fn filtered_scanlines<B: PixelBuffer>(
        &self,
        header: &Header,
        image: &B,
        quantized: Option<&QuantizedImage>,
    ) -> PngResult<Vec<u8>> {
        let max_length = header.scanline_length(header.width);
        let bpp = header.bytes_per_pixel();
        let fixed_filter = self.fixed_filter(header);
        let mut scanlines = ScanlineBuffer::new(max_length);
        let mut scratch = FilterScratch::new(max_length);
        let mut output = Vec::with_capacity(image_data_length(header));
        let mut pixels: Vec<B::Pixel> = Vec::with_capacity(header.width as usize);
        let mut samples = Vec::new();
        let mut packed = Vec::new();

        for pass in scanline_passes(header) {
            scanlines.start_pass(header.scanline_length(pass.width));
            for y in 0..pass.height {
                samples.clear();
                match quantized {
                    Some(quantized) => {
                        for x in 0..pass.width {
                            let (column, line) = pass.position(x, y);
                            let index = line as usize * header.width as usize + column as usize;
                            samples.push(quantized.indices[index]);
                        }
                    }
                    None => {
                        pixels.clear();
                        for x in 0..pass.width {
                            let (column, line) = pass.position(x, y);
                            pixels.push(image.get_pixel(column, line));
                        }
                        disassemble_row(&pixels, header.color_type, header.bit_depth, &mut samples)?;
                    }
                }
                pack_into(&samples, header.bit_depth, &mut packed);

                let (current, previous) = scanlines.split();
                current[1..].copy_from_slice(&packed);
                let (raw, prior) = (&current[1..], &previous[1..]);
                let (filter, filtered) = match fixed_filter {
                    Some(filter) => (filter, scratch.apply(filter, raw, prior, bpp)),
                    None => scratch.select_filter(raw, prior, bpp),
                };
                output.push(filter as u8);
                output.extend_from_slice(filtered);
                scanlines.rotate();
            }
        }
        Ok(output)
    }
}
