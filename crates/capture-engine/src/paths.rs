//! Input resolution and collision-free output naming.
//!
//! Outputs live under `<output_root>/<input stem>/`. When the preferred name
//! is taken, a zero-padded counter is appended to its stem:
//! `draw.png`, `draw_001.png`, `draw_002.png`, ...

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use htmlshot_common::error::{HtmlshotError, HtmlshotResult};

/// Extension used when no `--output` override is given.
pub const DEFAULT_EXTENSION: &str = "png";

/// Join `filename` onto the input directory and make sure the result exists.
pub fn resolve_input(input_dir: &Path, filename: &str) -> HtmlshotResult<PathBuf> {
    let path = input_dir.join(filename);
    if !path.is_file() {
        return Err(HtmlshotError::FileNotFound { path });
    }
    Ok(path)
}

/// Build the `file://` URL the browser navigates to.
pub fn file_url(input: &Path) -> HtmlshotResult<String> {
    let absolute = std::fs::canonicalize(input)?;
    url::Url::from_file_path(&absolute)
        .map(String::from)
        .map_err(|()| {
            HtmlshotError::render(format!(
                "Cannot build a file URL for {}",
                absolute.display()
            ))
        })
}

/// Stem of the input file, used both as the output sub-directory and as the
/// default output name.
pub fn input_stem(input: &Path) -> HtmlshotResult<String> {
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| {
            HtmlshotError::config(format!("{} has no file name", input.display()))
        })
}

/// Output file name before collision avoidance.
///
/// An explicit override must name a file directly inside the per-input
/// directory. A leading `./` is dropped; directories, parent references and
/// absolute paths are rejected.
pub fn output_base_name(stem: &str, override_name: Option<&str>) -> HtmlshotResult<String> {
    let Some(name) = override_name else {
        return Ok(format!("{stem}.{DEFAULT_EXTENSION}"));
    };

    let path = Path::new(name);
    let names_directory = name.chars().last().is_some_and(std::path::is_separator);
    let in_place = path
        .parent()
        .map_or(true, |parent| parent.components().all(|c| c == Component::CurDir));

    match path.file_name() {
        Some(file_name) if in_place && !names_directory => {
            Ok(file_name.to_string_lossy().into_owned())
        }
        _ => Err(HtmlshotError::config(format!(
            "output name must be a plain file name, got {name:?}"
        ))),
    }
}

/// Directory that receives every capture of `stem`.
pub fn output_dir(output_root: &Path, stem: &str) -> PathBuf {
    output_root.join(stem)
}

/// Name for the `counter`-th collision of `base_name`.
///
/// `counter` starts at 1 and is zero-padded to three digits; the extension
/// (if any) is preserved.
pub fn numbered_name(base_name: &str, counter: u32) -> String {
    let path = Path::new(base_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| base_name.to_string());
    match path.extension() {
        Some(ext) => format!("{stem}_{counter:03}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{counter:03}"),
    }
}

/// First path in `dir` that does not exist yet: `base_name` itself, then
/// its numbered variants.
pub fn next_available_path(dir: &Path, base_name: &str) -> PathBuf {
    let candidate = dir.join(base_name);
    if !candidate.exists() {
        return candidate;
    }

    let mut counter = 1u32;
    loop {
        let candidate = dir.join(numbered_name(base_name, counter));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Create `dir` (with parents) and pick an unused output path in it.
pub fn prepare_output(dir: &Path, base_name: &str) -> HtmlshotResult<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| HtmlshotError::output(dir, e))?;
    Ok(next_available_path(dir, base_name))
}

/// Write `bytes` to a file that must not exist yet.
pub fn write_new(path: &Path, bytes: &[u8]) -> HtmlshotResult<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| HtmlshotError::output(path, e))?;
    file.write_all(bytes)
        .and_then(|()| file.sync_all())
        .map_err(|e| HtmlshotError::output(path, e))
}
