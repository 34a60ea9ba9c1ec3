//! Downgrade shim for R2013 files via an external converter.
//!
//! Some deployments carry a vendor converter executable that can rewrite
//! an AC1027 drawing as AC1018. The shim invokes it with an input path, an
//! output directory, and a target-version flag, then picks up whichever
//! `.dwg` appears in the output directory with the requested magic. The
//! decoder treats the converter's output as an ordinary new input.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::document::DwgDocument;
use crate::error::{DwgError, Result};
use crate::io::dwg::reader::DwgFileReader;
use crate::types::DwgVersion;

/// Environment variable naming the converter executable.
pub const CONVERTER_ENV: &str = "DWG_CONVERTER";

/// Version flag passed to the converter for the AC1018 target.
const TARGET_VERSION_FLAG: &str = "ACAD2004";

/// Path of the configured converter executable, if any.
pub fn converter_path() -> Option<PathBuf> {
    std::env::var_os(CONVERTER_ENV).map(PathBuf::from)
}

/// Run the external converter to downgrade `input` into `output_dir`.
///
/// Success is exit code 0 plus an `AC1018` file appearing in the output
/// directory; the exact output filename is converter-specific, so the
/// directory is scanned for any `.dwg` carrying the right magic.
pub fn downgrade_to_ac1018<P, Q>(input: P, output_dir: Q) -> Result<PathBuf>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let converter = converter_path().ok_or_else(|| {
        DwgError::ConvertFailed(format!("{CONVERTER_ENV} is not set"))
    })?;

    let output_dir = output_dir.as_ref();
    std::fs::create_dir_all(output_dir)?;

    let status = Command::new(&converter)
        .arg(input.as_ref())
        .arg(output_dir)
        .arg(TARGET_VERSION_FLAG)
        .status()
        .map_err(|e| {
            DwgError::ConvertFailed(format!("failed to run {}: {e}", converter.display()))
        })?;

    if !status.success() {
        return Err(DwgError::ConvertFailed(format!(
            "converter exited with {status}"
        )));
    }

    find_converted_output(output_dir, DwgVersion::AC1018)?.ok_or_else(|| {
        DwgError::ConvertFailed(format!(
            "no {} file appeared in {}",
            DwgVersion::AC1018,
            output_dir.display()
        ))
    })
}

/// Scan a directory for a `.dwg` file whose magic matches `version`.
fn find_converted_output(dir: &Path, version: DwgVersion) -> Result<Option<PathBuf>> {
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case("dwg"))
                .unwrap_or(false)
        })
        .collect();
    candidates.sort();

    for path in candidates {
        let mut magic = [0u8; 6];
        let matches = std::fs::File::open(&path)
            .and_then(|mut f| std::io::Read::read_exact(&mut f, &mut magic))
            .is_ok()
            && DwgVersion::from_magic(&magic) == Some(version);
        if matches {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

/// Read a DWG file, shelling out to the downgrade converter for AC1027
/// inputs when one is configured.
///
/// AC1027 decodes natively; the converter path only runs when the native
/// decode fails and a converter is available. The returned document then
/// carries the converted stream's version tag (`AC1018`).
pub fn read_with_fallback<P: AsRef<Path>>(path: P) -> Result<DwgDocument> {
    let path = path.as_ref();
    let reader = DwgFileReader::from_file(path)?;
    let version = reader.version();

    match reader.read() {
        Ok(document) => Ok(document),
        Err(e) => {
            if version == DwgVersion::AC1027 && converter_path().is_some() {
                let output_dir = scratch_dir()?;
                let converted = downgrade_to_ac1018(path, &output_dir)?;
                DwgFileReader::from_file(converted)?.read()
            } else {
                Err(e)
            }
        }
    }
}

/// A per-process scratch directory for converter output.
fn scratch_dir() -> Result<PathBuf> {
    let dir = std::env::temp_dir().join(format!("dwg-convert-{}", std::process::id()));
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_converted_output_empty_dir() {
        let dir = std::env::temp_dir().join(format!("dwg-convert-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let found = find_converted_output(&dir, DwgVersion::AC1018).unwrap();
        assert!(found.is_none());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_find_converted_output_checks_magic() {
        let dir =
            std::env::temp_dir().join(format!("dwg-convert-magic-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        std::fs::write(dir.join("wrong.dwg"), b"AC1027xxxx").unwrap();
        assert!(find_converted_output(&dir, DwgVersion::AC1018)
            .unwrap()
            .is_none());

        std::fs::write(dir.join("right.dwg"), b"AC1018xxxx").unwrap();
        let found = find_converted_output(&dir, DwgVersion::AC1018)
            .unwrap()
            .unwrap();
        assert_eq!(found.file_name().unwrap(), "right.dwg");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
