use std::{
    fs,
    io::{ErrorKind, Write},
    path::Path,
};

use anyhow::{Context, Result};
use tracing::debug;

/// Reads a text file as lines. A missing file is `None`, which opens as an
/// empty new document.
pub fn load_document(path: &Path) -> Result<Option<Vec<String>>> {
    let data = match fs::read_to_string(path) {
        Ok(d) => d,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("read document: {}", path.display()));
        }
    };
    debug!(target: "tui", "loaded {} ({} bytes)", path.display(), data.len());
    Ok(Some(data.lines().map(str::to_string).collect()))
}

/// Writes lines with a trailing newline through a temp file, returning the
/// byte count.
pub fn save_document(path: &Path, lines: &[String]) -> Result<usize> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create directory: {}", parent.display()))?;
        }
    }
    let mut data = lines.join("\n");
    data.push('\n');
    let mut tmp = path.to_path_buf();
    let ext = match path.extension() {
        Some(e) => format!("{}.tmp", e.to_string_lossy()),
        None => "tmp".to_string(),
    };
    tmp.set_extension(ext);
    {
        let mut f =
            fs::File::create(&tmp).with_context(|| format!("create tmp: {}", tmp.display()))?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
    }
    fs::rename(&tmp, path).with_context(|| format!("write document to {}", path.display()))?;
    Ok(data.len())
}
