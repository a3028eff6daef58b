// sieve-core/src/infrastructure/file_validation.rs
//
// Physical checks on an input file: extension, size, compression integrity,
// modification date. Results never influence row classification.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate};
use flate2::read::MultiGzDecoder;
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use crate::domain::file_check::{FileCheck, FileCheckResult};
use crate::infrastructure::error::InfrastructureError;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

pub struct FileValidator {
    path: PathBuf,
}

impl FileValidator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Runs `checks` in order. A missing or unreadable file is an error; a
    /// failing check is a result.
    #[instrument(skip(self, checks), fields(path = %self.path.display()))]
    pub fn validate(&self, checks: &[FileCheck]) -> Result<Vec<FileCheckResult>, InfrastructureError> {
        let metadata = fs::metadata(&self.path)?;
        if !metadata.is_file() {
            return Err(InfrastructureError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a file", self.path.display()),
            )));
        }

        let results: Vec<FileCheckResult> = checks
            .iter()
            .map(|check| {
                let result = match check {
                    FileCheck::ValidateFileFormat { allowed_extensions } => {
                        self.check_format(check, allowed_extensions)
                    }
                    FileCheck::ValidateFileSize { max_size_mb } => {
                        check_size(check, metadata.len(), *max_size_mb)
                    }
                    FileCheck::ValidateCompressed { allowed_compressions } => {
                        self.check_compressed(check, allowed_compressions)
                    }
                    FileCheck::ValidateFileDate { business_date } => {
                        check_date(check, &metadata, business_date.as_deref())
                    }
                };
                if !result.passed {
                    warn!(check = %result.check_name, details = %result.details, "File check failed");
                }
                result
            })
            .collect();

        Ok(results)
    }

    /// Lower-cased extension with its dot (`.csv`), empty when there is none.
    fn extension(&self) -> String {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
            .unwrap_or_default()
    }

    fn check_format(&self, check: &FileCheck, allowed: &[String]) -> FileCheckResult {
        let ext = self.extension();
        let ok = allowed.iter().any(|a| normalise_extension(a) == ext);
        if ok {
            FileCheckResult::new(check, true, format!("Valid format: {ext}"))
        } else {
            FileCheckResult::new(check, false, format!("Invalid format: {ext}"))
        }
    }

    fn check_compressed(&self, check: &FileCheck, allowed: &[String]) -> FileCheckResult {
        let allows = |kind: &str| {
            allowed
                .iter()
                .any(|a| a.trim().trim_start_matches('.').eq_ignore_ascii_case(kind))
        };

        let outcome = match self.extension().as_str() {
            ".zip" if allows("zip") => Some(verify_zip(&self.path).map(|()| "Valid zip file.")),
            ".gz" if allows("gz") => Some(verify_gzip(&self.path).map(|()| "Valid gzip file.")),
            _ => None,
        };

        match outcome {
            Some(Ok(details)) => FileCheckResult::new(check, true, details),
            Some(Err(e)) => FileCheckResult::new(check, false, format!("Compression failed: {e}")),
            None => FileCheckResult::new(check, false, "Not a valid compressed file."),
        }
    }
}

fn normalise_extension(raw: &str) -> String {
    let trimmed = raw.trim().to_lowercase();
    if trimmed.starts_with('.') {
        trimmed
    } else {
        format!(".{trimmed}")
    }
}

fn check_size(check: &FileCheck, bytes: u64, max_size_mb: f64) -> FileCheckResult {
    let size_mb = bytes as f64 / BYTES_PER_MB;
    if size_mb <= max_size_mb {
        FileCheckResult::new(check, true, format!("Acceptable size: {size_mb:.2} MB"))
    } else {
        FileCheckResult::new(
            check,
            false,
            format!("File size exceeds the limit: {size_mb:.2} MB"),
        )
    }
}

fn check_date(
    check: &FileCheck,
    metadata: &fs::Metadata,
    business_date: Option<&str>,
) -> FileCheckResult {
    let Some(raw) = business_date.filter(|d| !d.trim().is_empty()) else {
        return FileCheckResult::new(check, false, "Business date not provided in the config.");
    };
    let Ok(expected) = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") else {
        return FileCheckResult::new(check, false, format!("Invalid business date format: {raw}"));
    };
    let modified = match metadata.modified() {
        Ok(t) => DateTime::<Local>::from(t).date_naive(),
        Err(e) => {
            return FileCheckResult::new(check, false, format!("Modification time unavailable: {e}"));
        }
    };

    if modified == expected {
        FileCheckResult::new(
            check,
            true,
            format!("Modification date matches business date: {modified}"),
        )
    } else {
        FileCheckResult::new(
            check,
            false,
            format!("Modification date does not match business date: {modified}"),
        )
    }
}

/// Reads every entry to the end so each CRC is verified.
fn verify_zip(path: &Path) -> Result<(), String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    let mut archive = zip::ZipArchive::new(BufReader::new(file)).map_err(|e| e.to_string())?;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| e.to_string())?;
        let name = entry.name().to_string();
        io::copy(&mut entry, &mut io::sink()).map_err(|e| format!("{name}: {e}"))?;
    }
    debug!(entries = archive.len(), "Zip archive verified");
    Ok(())
}

fn verify_gzip(path: &Path) -> Result<(), String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    let mut decoder = MultiGzDecoder::new(BufReader::new(file));
    io::copy(&mut decoder, &mut io::sink()).map_err(|e| e.to_string())?;
    Ok(())
}

/// Every regular file under `root` (or `root` itself), sorted by path.
pub fn collect_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                warn!(error = %err, "Skipping unreadable entry");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use tempfile::tempdir;

    fn format_check(exts: &[&str]) -> FileCheck {
        FileCheck::ValidateFileFormat {
            allowed_extensions: exts.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn compressed(kinds: &[&str]) -> FileCheck {
        FileCheck::ValidateCompressed {
            allowed_compressions: kinds.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_format_and_size() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("AIS.CSV");
        fs::write(&path, "a,b\n1,2\n")?;

        let results = FileValidator::new(&path).validate(&[
            format_check(&[".csv"]),
            format_check(&["zip"]),
            FileCheck::ValidateFileSize { max_size_mb: 1.0 },
            FileCheck::ValidateFileSize { max_size_mb: 0.0 },
        ])?;

        assert!(results[0].passed);
        assert_eq!(results[0].details, "Valid format: .csv");
        assert!(!results[1].passed);
        assert!(results[2].passed);
        assert_eq!(results[2].check_name, "File Size");
        assert!(!results[3].passed);
        Ok(())
    }

    #[test]
    fn test_valid_and_corrupt_gzip() -> Result<()> {
        let dir = tempdir()?;
        let good = dir.path().join("ok.csv.gz");
        let mut enc = GzEncoder::new(File::create(&good)?, Compression::default());
        enc.write_all(b"a\n1\n")?;
        enc.finish()?;

        let bad = dir.path().join("bad.gz");
        fs::write(&bad, b"\x1f\x8b\x08\x00not really gzip")?;

        let ok = FileValidator::new(&good).validate(&[compressed(&["gz"])])?;
        assert!(ok[0].passed, "{}", ok[0].details);

        let ko = FileValidator::new(&bad).validate(&[compressed(&["gz"])])?;
        assert!(!ko[0].passed);
        assert!(ko[0].details.starts_with("Compression failed"));
        Ok(())
    }

    #[test]
    fn test_zip_archive_is_read_fully() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("batch.zip");
        let mut zip = zip::ZipWriter::new(File::create(&path)?);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        zip.start_file("ais.csv", options)?;
        zip.write_all(b"MMSI\n1\n")?;
        zip.finish()?;

        let results = FileValidator::new(&path).validate(&[compressed(&["zip"]), compressed(&["gz"])])?;
        assert!(results[0].passed);
        // zip not allowed by the second check
        assert_eq!(results[1].details, "Not a valid compressed file.");
        Ok(())
    }

    #[test]
    fn test_business_date() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("ais.csv");
        fs::write(&path, "x\n")?;
        let today = Local::now().date_naive().format("%Y-%m-%d").to_string();

        let results = FileValidator::new(&path).validate(&[
            FileCheck::ValidateFileDate { business_date: Some(today) },
            FileCheck::ValidateFileDate { business_date: Some("1999-01-01".into()) },
            FileCheck::ValidateFileDate { business_date: Some("01/02/2024".into()) },
            FileCheck::ValidateFileDate { business_date: None },
        ])?;

        assert!(results[0].passed);
        assert!(!results[1].passed);
        assert!(results[2].details.starts_with("Invalid business date format"));
        assert_eq!(results[3].details, "Business date not provided in the config.");
        Ok(())
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let res = FileValidator::new("/no/such/file.csv").validate(&[format_check(&[".csv"])]);
        assert!(matches!(res, Err(InfrastructureError::Io(_))));
    }

    #[test]
    fn test_collect_files_is_sorted() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir(dir.path().join("sub"))?;
        fs::write(dir.path().join("b.csv"), "")?;
        fs::write(dir.path().join("sub/a.csv"), "")?;

        let files = collect_files(dir.path());
        assert_eq!(files.len(), 2);
        assert!(files[0] < files[1]);
        Ok(())
    }
}
