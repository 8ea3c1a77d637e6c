use anyhow::Context;
use imagecore_png::{PngError, PNG};
use log::{info, warn};
use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

/// Decodes and re-encodes every PNG in a directory, then checks that the
/// re-encoded file decodes to the same pixels. Files whose names start with
/// `x` are expected to fail decoding.
fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let input_dir = PathBuf::from(args.next().unwrap_or_else(|| "tests/png-suite".to_owned()));
    let output_dir = PathBuf::from(args.next().unwrap_or_else(|| "roundtrip".to_owned()));
    pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Info)
        .init();
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let mut test_images: Vec<PathBuf> = fs::read_dir(&input_dir)
        .with_context(|| format!("Failed to read {}", input_dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension() == Some(OsStr::new("png")))
        .collect();
    test_images.sort();

    let mut results = Vec::with_capacity(test_images.len());
    for image_path in &test_images {
        let name = image_path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
            .to_owned();
        let expect_failure = name.starts_with('x');
        let outcome = roundtrip(image_path, &output_dir.join(format!("{name}-roundtrip.png")));
        let (status, detail) = match (&outcome, expect_failure) {
            (Ok(()), false) => ("ok", String::new()),
            (Err(e), true) if e.downcast_ref::<PngError>().is_some() => {
                ("rejected", format!("{e:#}"))
            }
            (Ok(()), true) => ("unexpectedly-decoded", String::new()),
            (Err(e), _) => ("failed", format!("{e:#}")),
        };
        if matches!(status, "ok" | "rejected") {
            info!("{name}: {status}");
        } else {
            warn!("{name}: {status} {detail}");
        }
        results.push(serde_json::json!({
            "image": name,
            "status": status,
            "detail": detail,
        }));
    }

    let now = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Iso8601::DEFAULT)?;
    let report = serde_json::json!({
        "date": now,
        "input": input_dir.display().to_string(),
        "images": results,
    });
    fs::write(output_dir.join("report.json"), report.to_string())?;
    Ok(())
}

fn roundtrip(input: &Path, output: &Path) -> anyhow::Result<()> {
    let original = PNG::decode(&fs::read(input)?)?;
    let encoded = original.encode()?;
    fs::write(output, &encoded)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    let decoded = PNG::decode(&encoded).context("Failed to decode re-encoded image")?;
    anyhow::ensure!(
        decoded.image().pixels() == original.image().pixels(),
        "pixels changed in the round trip"
    );
    Ok(())
}
