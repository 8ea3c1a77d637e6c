use anyhow::{bail, Context};
use imagecore_png::{
    ColorType, DecoderOptions, EncoderOptions, Image, Interlacing, PngDecoder, PngEncoder,
};
use log::info;

const USAGE: &str = "usage: process-image [-v] [--color gray|gray-alpha|rgb|rgba|palette] \
                     [--depth N] [--interlace] [--level N] <input.png> [output.png]";

fn main() -> anyhow::Result<()> {
    let args: Vec<_> = std::env::args().skip(1).collect();
    let verbosity = if args.iter().any(|arg| arg == "-v") {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    pretty_env_logger::formatted_builder()
        .filter_level(verbosity)
        .init();

    let mut options = EncoderOptions::builder();
    let mut files = Vec::new();
    let mut args = args.iter().map(String::as_str);
    while let Some(arg) = args.next() {
        match arg {
            "-v" => (),
            "--interlace" => options = options.interlace(Interlacing::Adam7),
            "--color" => {
                let color_type = match args.next() {
                    Some("gray") => ColorType::Grayscale,
                    Some("gray-alpha") => ColorType::GrayscaleAlpha,
                    Some("rgb") => ColorType::Rgb,
                    Some("rgba") => ColorType::RgbAlpha,
                    Some("palette") => ColorType::Palette,
                    other => bail!("unknown color type {other:?}\n{USAGE}"),
                };
                options = options.color_type(color_type);
            }
            "--depth" => {
                let depth = args.next().context(USAGE)?;
                options = options.bit_depth(depth.parse().context("--depth takes a number")?);
            }
            "--level" => {
                let level = args.next().context(USAGE)?;
                options =
                    options.compression_level(level.parse().context("--level takes a number")?);
            }
            file => files.push(file),
        }
    }
    let (input, output) = match files.as_slice() {
        [input] => (*input, "output.png"),
        [input, output] => (*input, *output),
        _ => bail!(USAGE),
    };

    let bytes = std::fs::read(input).with_context(|| format!("Failed to read {input}"))?;
    let image: Image = PngDecoder::new(DecoderOptions::default())
        .decode(&bytes)
        .with_context(|| format!("Failed to decode {input}"))?;
    info!("decoded {input}");

    let encoded = PngEncoder::new(options.build())
        .encode_to_vec(&image)
        .with_context(|| format!("Failed to encode {input}"))?;
    std::fs::write(output, &encoded).with_context(|| format!("Failed to write {output}"))?;
    info!("wrote {} bytes to {output}", encoded.len());
    Ok(())
}
