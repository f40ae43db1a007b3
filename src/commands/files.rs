//! Reading operation inputs from disk and writing `--output` files.

use std::fs;
use std::io;
use std::path::Path;

use crate::textutil::truncate_with_suffix_by_bytes;
use crate::types::SourceFile;

/// Cap on how much of one file is attached to a request.
pub const MAX_SOURCE_BYTES: usize = 64 * 1024;
const TRUNCATED_MARKER: &str = "\n... [truncated]";

/// Read a file as (lossy) UTF-8, capped at [`MAX_SOURCE_BYTES`].
pub fn read_source_file(path: &Path) -> io::Result<SourceFile> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(SourceFile {
        path: path.display().to_string(),
        content: truncate_with_suffix_by_bytes(&text, MAX_SOURCE_BYTES, TRUNCATED_MARKER),
    })
}

/// Content of `target` when it names a regular file; `None` for symbolic
/// targets such as a module or function name.
pub fn read_target(target: &str) -> io::Result<Option<String>> {
    let path = Path::new(target);
    if !path.is_file() {
        return Ok(None);
    }
    read_source_file(path).map(|file| Some(file.content))
}

/// Write `content` to `path`, creating parent directories.
pub fn write_output(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, content)
}
