//! The digester (spec §4.9): SHA-1 and MD5 over publication files,
//! streaming, emitted as lowercase hex text into sibling `.sha1`/`.md5`
//! files with no trailing newline and no filename prefix.

use idx_util::errors::IndexerError;
use idx_util::fs::atomic_write;
use idx_util::hash::{md5_file, sha1_file};
use std::path::{Path, PathBuf};

/// Write `<file>.sha1` and `<file>.md5` siblings for `file` (spec §4.9).
pub fn write_checksums(file: &Path) -> Result<(), IndexerError> {
    let sha1 = sha1_file(file)?;
    atomic_write(&sibling(file, "sha1"), sha1.as_bytes())?;

    let md5 = md5_file(file)?;
    atomic_write(&sibling(file, "md5"), md5.as_bytes())?;
    Ok(())
}

fn sibling(file: &Path, extra_extension: &str) -> PathBuf {
    let mut name = file.as_os_str().to_os_string();
    name.push(".");
    name.push(extra_extension);
    PathBuf::from(name)
}
