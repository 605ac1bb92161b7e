//! # Archive Packaging
//!
//! Writes an archive into a single zip container for upload.
//!
//! Entries keep their archive order and get a canonical 1980-01-01
//! timestamp, so packaging the same archive twice yields identical bytes.

use std::io::{Cursor, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::{ArchiveEntry, ArchiveError};

/// Package archive entries into zip bytes.
///
/// # Returns
///
/// * `Ok(Vec<u8>)` - The zip container
/// * `Err(ArchiveError::Packaging)` - The zip writer failed
pub fn package(archive: &[ArchiveEntry]) -> Result<Vec<u8>, ArchiveError> {
    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
        let options = SimpleFileOptions::default()
            .last_modified_time(zip::DateTime::default())
            .compression_method(zip::CompressionMethod::Deflated);

        for entry in archive {
            zip.start_file(entry.path.as_str(), options)
                .map_err(|e| packaging_error(&entry.path, e))?;
            zip.write_all(&entry.content)
                .map_err(|e| packaging_error(&entry.path, e))?;
        }

        zip.finish().map_err(|e| ArchiveError::Packaging {
            message: format!("failed to finalize zip: {e}"),
        })?;
    }

    log::debug!(
        "Packaged {} entries into {} bytes",
        archive.len(),
        buffer.len()
    );
    Ok(buffer)
}

fn packaging_error(path: &str, err: impl std::fmt::Display) -> ArchiveError {
    ArchiveError::Packaging {
        message: format!("{path}: {err}"),
    }
}
