use anyhow::Context;
use std::path::Path;

pub fn get_tqdm_style() -> indicatif::ProgressStyle {
    indicatif::ProgressStyle::with_template(
            "{percent:>3}% |{wide_bar}| {pos}/{len} [{elapsed_precise}<{eta_precise}, {custom_per_sec}] {msg}",
        )
        .unwrap_or_else(|_| indicatif::ProgressStyle::default_bar())
        .with_key(
            "custom_per_sec",
            Box::new(|s: &indicatif::ProgressState, w: &mut dyn std::fmt::Write| {
                let _ = write!(w, "{:.2} it/s", s.per_sec());
            }),
        ).progress_chars("██ ")
}

// read a simulator log, transparently decompressing .zst archives
pub fn read_log<P: AsRef<Path>>(path: P) -> anyhow::Result<String> {
    let path = path.as_ref();
    let content =
        std::fs::read(path).with_context(|| format!("cannot find {}", path.display()))?;
    let content = if path.extension().is_some_and(|ext| ext == "zst") {
        zstd::stream::decode_all(content.as_slice())
            .with_context(|| format!("cannot decompress {}", path.display()))?
    } else {
        content
    };
    Ok(String::from_utf8_lossy(&content).into_owned())
}
