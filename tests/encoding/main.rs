use imagecore_png::{
    chunks::ChunkReader, ColorType, DecoderOptions, EncoderOptions, FilterType, Image,
    ImageProperty, Interlacing, PngDecoder, PngEncoder, PngError, Pixel, TextEncoding,
    MAX_BLOCK_SIZE,
};
use miniz_oxide::inflate::decompress_to_vec_zlib;

fn image_from(width: u32, height: u32, mut pixel: impl FnMut(u32, u32) -> Pixel) -> Image {
    let pixels = (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .map(|(x, y)| pixel(x, y))
        .collect();
    Image::from_pixels(width, height, pixels).unwrap()
}

fn encode(image: &Image, options: EncoderOptions) -> Vec<u8> {
    PngEncoder::new(options).encode_to_vec(image).unwrap()
}

fn decode(bytes: &[u8]) -> Image {
    PngDecoder::default().decode(bytes).unwrap()
}

fn chunk_types(bytes: &[u8]) -> Vec<String> {
    ChunkReader::new(&bytes[8..])
        .map(|chunk| chunk.unwrap().type_name())
        .collect()
}

fn chunk_data<'a>(bytes: &'a [u8], chunk_type: &[u8; 4]) -> Vec<&'a [u8]> {
    ChunkReader::new(&bytes[8..])
        .map(|chunk| chunk.unwrap())
        .filter(|chunk| &chunk.chunk_type == chunk_type)
        .map(|chunk| chunk.data)
        .collect()
}

/// The filtered scanlines, inflated back out of the `IDAT` chunks.
fn scanlines(bytes: &[u8]) -> Vec<u8> {
    decompress_to_vec_zlib(&chunk_data(bytes, b"IDAT").concat()).unwrap()
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn noise(seed: u32) -> impl FnMut() -> u8 {
    let mut state = seed;
    move || {
        state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        (state >> 16) as u8
    }
}

#[test]
fn two_by_two_rgb_end_to_end() {
    let colors = [
        Pixel::opaque(255, 0, 0),
        Pixel::opaque(0, 255, 0),
        Pixel::opaque(0, 0, 255),
        Pixel::opaque(255, 255, 0),
    ];
    let image = Image::from_pixels(2, 2, colors.to_vec()).unwrap();
    let options = EncoderOptions::builder()
        .color_type(ColorType::Rgb)
        .bit_depth(8)
        .filter(FilterType::None)
        .build();
    let bytes = encode(&image, options);

    assert_eq!(bytes[..8], *b"\x89PNG\r\n\x1a\n");
    insta::assert_snapshot!(hex(&bytes[8..33]), @"0000000d4948445200000002000000020802000000fdd49a73");
    assert_eq!(
        chunk_data(&bytes, b"IHDR")[0],
        [0, 0, 0, 2, 0, 0, 0, 2, 8, 2, 0, 0, 0]
    );
    assert_eq!(
        scanlines(&bytes),
        [0, 255, 0, 0, 0, 255, 0, 0, 0, 0, 255, 255, 255, 0]
    );
    assert_eq!(chunk_types(&bytes), ["IHDR", "IDAT", "IEND"]);
    assert_eq!(decode(&bytes).pixels(), colors);
}

#[test]
fn round_trips_every_color_type_and_depth() {
    let gray = |depth: u8| {
        move |x: u32, y: u32| {
            let levels = 1u32 << depth.min(8);
            let step = 255 / (levels - 1);
            let level = ((x * 7 + y * 3) % levels * step) as u8;
            Pixel::opaque(level, level, level)
        }
    };
    let gray_alpha = |x: u32, y: u32| {
        let level = (x * 19 + y * 5) as u8;
        Pixel::new(level, level, level, (x * 40 + y) as u8)
    };
    let rgb = |x: u32, y: u32| Pixel::opaque((x * 23) as u8, (y * 41) as u8, (x * y) as u8);
    let rgba = |x: u32, y: u32| {
        Pixel::new((x * 23) as u8, (y * 41) as u8, (x * y) as u8, (x + y * 17) as u8)
    };

    let (width, height) = (13, 7);
    let cases: Vec<(ColorType, u8, Image)> = vec![
        (ColorType::Grayscale, 1, image_from(width, height, gray(1))),
        (ColorType::Grayscale, 2, image_from(width, height, gray(2))),
        (ColorType::Grayscale, 4, image_from(width, height, gray(4))),
        (ColorType::Grayscale, 8, image_from(width, height, gray(8))),
        (ColorType::Grayscale, 16, image_from(width, height, gray(8))),
        (ColorType::GrayscaleAlpha, 8, image_from(width, height, gray_alpha)),
        (ColorType::GrayscaleAlpha, 16, image_from(width, height, gray_alpha)),
        (ColorType::Rgb, 8, image_from(width, height, rgb)),
        (ColorType::Rgb, 16, image_from(width, height, rgb)),
        (ColorType::RgbAlpha, 8, image_from(width, height, rgba)),
        (ColorType::RgbAlpha, 16, image_from(width, height, rgba)),
    ];

    for (color_type, bit_depth, image) in cases {
        for interlace in [Interlacing::None, Interlacing::Adam7] {
            let options = EncoderOptions::builder()
                .color_type(color_type)
                .bit_depth(bit_depth)
                .interlace(interlace)
                .build();
            let bytes = encode(&image, options);
            let header = PngDecoder::default().read_header(&bytes).unwrap();
            assert_eq!(
                (header.color_type, header.bit_depth, header.interlace_method),
                (color_type, bit_depth, interlace)
            );
            assert_eq!(
                decode(&bytes).pixels(),
                image.pixels(),
                "{color_type:?} at {bit_depth} bits, {interlace:?}"
            );
        }
    }
}

#[test]
fn palette_images_round_trip_exactly() {
    let image = image_from(9, 9, |x, y| match (x + y) % 5 {
        0 => Pixel::new(0, 0, 0, 0),
        1 => Pixel::new(255, 0, 0, 128),
        2 => Pixel::opaque(0, 255, 0),
        3 => Pixel::opaque(0, 0, 255),
        _ => Pixel::opaque(10, 20, 30),
    });
    for interlace in [Interlacing::None, Interlacing::Adam7] {
        let options = EncoderOptions::builder()
            .color_type(ColorType::Palette)
            .interlace(interlace)
            .build();
        let bytes = encode(&image, options);
        assert_eq!(decode(&bytes).pixels(), image.pixels(), "{interlace:?}");
        // Five colors need 3 bits, so 4; the first two entries carry alpha.
        assert_eq!(PngDecoder::default().read_header(&bytes).unwrap().bit_depth, 4);
        assert_eq!(chunk_data(&bytes, b"tRNS"), [&[0, 128][..]]);
    }
}

#[test]
fn palette_bit_depth_follows_the_color_count() {
    let options = EncoderOptions::builder()
        .color_type(ColorType::Palette)
        .build();
    for (colors, depth) in [(1u32, 1u8), (2, 1), (3, 2), (4, 2), (16, 4), (17, 8)] {
        let image = image_from(colors, 2, |x, _| Pixel::opaque(x as u8, 0, 0));
        let bytes = encode(&image, options);
        let header = PngDecoder::default().read_header(&bytes).unwrap();
        assert_eq!(header.bit_depth, depth, "{colors} colors");
        assert_eq!(chunk_data(&bytes, b"PLTE")[0].len(), colors as usize * 3);
        assert!(chunk_data(&bytes, b"tRNS").is_empty());
        assert_eq!(decode(&bytes).pixels(), image.pixels());
    }
}

#[test]
fn palettes_are_capped_at_max_colors() {
    let image = image_from(20, 15, |x, y| Pixel::opaque((x * 12) as u8, (y * 17) as u8, 7));
    let options = EncoderOptions::builder()
        .color_type(ColorType::Palette)
        .max_colors(256)
        .build();
    let bytes = encode(&image, options);
    assert_eq!(chunk_data(&bytes, b"PLTE")[0].len(), 256 * 3);
    assert_eq!(decode(&bytes).pixels().len(), 300);

    let options = EncoderOptions::builder()
        .color_type(ColorType::Palette)
        .max_colors(4)
        .build();
    let bytes = encode(&image, options);
    assert_eq!(chunk_data(&bytes, b"PLTE")[0].len(), 4 * 3);
    assert_eq!(PngDecoder::default().read_header(&bytes).unwrap().bit_depth, 2);
}

#[test]
fn invalid_bit_depths_are_rejected_before_writing() {
    let image = image_from(3, 1, |x, _| Pixel::opaque(x as u8, 0, 0));
    for (color_type, bit_depth) in [
        (ColorType::Rgb, 4),
        (ColorType::RgbAlpha, 1),
        (ColorType::GrayscaleAlpha, 2),
        (ColorType::Palette, 16),
        (ColorType::Grayscale, 3),
        // Three colors do not fit in one bit.
        (ColorType::Palette, 1),
    ] {
        let options = EncoderOptions::builder()
            .color_type(color_type)
            .bit_depth(bit_depth)
            .build();
        let mut sink = Vec::new();
        let result = PngEncoder::new(options)
            .encode(&image, &image.metadata, &mut sink)
            .map(|_| ());
        assert!(
            matches!(result, Err(PngError::UnsupportedFormat(_))),
            "{color_type:?} at {bit_depth}"
        );
        assert!(sink.is_empty());
    }
}

#[test]
fn chunks_follow_the_fixed_order() {
    let mut image = image_from(4, 4, |x, _| match x {
        0 => Pixel::new(0, 0, 0, 0),
        1 => Pixel::opaque(1, 1, 1),
        _ => Pixel::opaque(2, 2, 2),
    });
    image.metadata.horizontal_resolution = 72.0;
    image.metadata.vertical_resolution = 72.0;
    image.metadata.properties = vec![
        ImageProperty::new("Title", "Order"),
        ImageProperty::new("Software", "imagecore-png"),
    ];
    let options = EncoderOptions::builder()
        .color_type(ColorType::Palette)
        .gamma(2.2)
        .build();
    let bytes = encode(&image, options);
    assert_eq!(
        chunk_types(&bytes),
        ["IHDR", "PLTE", "tRNS", "pHYs", "gAMA", "tEXt", "tEXt", "IDAT", "IEND"]
    );
    assert_eq!(chunk_data(&bytes, b"gAMA")[0], 220_000u32.to_be_bytes());
    insta::assert_snapshot!(hex(chunk_data(&bytes, b"pHYs")[0]), @"00000b1300000b1301");

    let decoded = decode(&bytes);
    assert_eq!(decoded.metadata.properties, image.metadata.properties);
    assert!((decoded.metadata.gamma.unwrap() - 2.2).abs() < 1e-4);
}

#[test]
fn optional_chunks_are_left_out() {
    let mut image = image_from(2, 2, |x, y| Pixel::opaque(x as u8, y as u8, 0));
    image.metadata.horizontal_resolution = 96.0;
    image.metadata.properties = vec![ImageProperty::new("Title", "Hidden")];
    let options = EncoderOptions::builder().write_text(false).build();
    let bytes = encode(&image, options);
    // Only one axis has a resolution, so there is no pHYs either.
    assert_eq!(chunk_types(&bytes), ["IHDR", "IDAT", "IEND"]);
}

#[test]
fn large_images_split_image_data() {
    let mut next = noise(7);
    let image = image_from(200, 200, |_, _| Pixel::new(next(), next(), next(), next()));
    let options = EncoderOptions::builder().compression_level(0).build();
    let bytes = encode(&image, options);

    let blocks = chunk_data(&bytes, b"IDAT");
    assert!(blocks.len() >= 3, "{} blocks", blocks.len());
    let (last, full) = blocks.split_last().unwrap();
    assert!(full.iter().all(|block| block.len() == MAX_BLOCK_SIZE));
    assert!(!last.is_empty() && last.len() <= MAX_BLOCK_SIZE);
    assert_eq!(decode(&bytes).pixels(), image.pixels());
}

#[test]
fn forced_filter_is_used_on_every_row() {
    let image = image_from(5, 4, |x, y| Pixel::new(x as u8, y as u8, (x * y) as u8, 9));
    let options = EncoderOptions::builder().filter(FilterType::Paeth).build();
    let bytes = encode(&image, options);
    let data = scanlines(&bytes);
    let filters: Vec<_> = data.iter().step_by(5 * 4 + 1).copied().collect();
    assert_eq!(filters, [4, 4, 4, 4]);
    assert_eq!(decode(&bytes).pixels(), image.pixels());
}

#[test]
fn palette_and_low_depth_rows_are_not_filtered() {
    let image = image_from(6, 3, |x, y| {
        let level = if (x + y) % 2 == 0 { 0 } else { 255 };
        Pixel::opaque(level, level, level)
    });
    for (color_type, bit_depth, row_length) in
        [(ColorType::Palette, 1, 1), (ColorType::Grayscale, 2, 2)]
    {
        let options = EncoderOptions::builder()
            .color_type(color_type)
            .bit_depth(bit_depth)
            .build();
        let bytes = encode(&image, options);
        let data = scanlines(&bytes);
        assert_eq!(data.len(), 3 * (row_length + 1));
        assert!(data.iter().step_by(row_length + 1).all(|&f| f == 0));
        assert_eq!(decode(&bytes).pixels(), image.pixels());
    }
}

#[test]
fn adaptive_filtering_picks_up_for_repeated_rows() {
    let image = image_from(8, 3, |x, _| Pixel::new((x * 31) as u8, 200, (x * 3) as u8, 255));
    let bytes = encode(&image, EncoderOptions::default());
    let data = scanlines(&bytes);
    let filters: Vec<_> = data.iter().step_by(8 * 4 + 1).copied().collect();
    assert_eq!(filters[1..], [FilterType::Up as u8, FilterType::Up as u8]);
}

#[test]
fn text_can_be_written_as_utf16() {
    let mut image = image_from(1, 1, |_, _| Pixel::opaque(1, 2, 3));
    image.metadata.properties = vec![ImageProperty::new("Описание", "日本語")];
    let options = EncoderOptions::builder()
        .text_encoding(TextEncoding::Utf16Le)
        .build();
    let bytes = encode(&image, options);
    let decoder = PngDecoder::new(DecoderOptions {
        text_encoding: TextEncoding::Utf16Le,
        ..Default::default()
    });
    let decoded: Image = decoder.decode(&bytes).unwrap();
    assert_eq!(decoded.metadata.properties, image.metadata.properties);
}

#[test]
fn encoding_is_deterministic() {
    let mut next = noise(99);
    let image = image_from(17, 11, |_, _| Pixel::new(next(), next(), next(), 255));
    let options = EncoderOptions::builder()
        .color_type(ColorType::Palette)
        .max_colors(32)
        .interlace(Interlacing::Adam7)
        .build();
    assert_eq!(encode(&image, options), encode(&image, options));
}
