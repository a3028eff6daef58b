use crate::infrastructure::error::InfrastructureError;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Write content to a file atomically using a temporary file.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    atomic_write_with(path, |out| {
        out.write_all(content.as_ref())?;
        Ok(())
    })
}

/// Streams into a temporary file next to `path`, then renames it into place.
///
/// Missing parent directories are created. If `fill` fails, the target is
/// left untouched and the temporary file is removed on drop.
pub fn atomic_write_with<P, F>(path: P, fill: F) -> Result<(), InfrastructureError>
where
    P: AsRef<Path>,
    F: FnOnce(&mut dyn Write) -> Result<(), InfrastructureError>,
{
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    // Same directory as the target so the rename never crosses filesystems
    let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
    fill(temp_file.as_file_mut())?;
    temp_file.as_file_mut().flush()?;

    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    Ok(())
}
