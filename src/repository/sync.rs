// src/repository/sync.rs

//! Catalog synchronization
//!
//! Downloads the update-center document and stores it at the local
//! repository path. The document is validated before it replaces the
//! existing copy, so a bad download never clobbers a good catalog.

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::installer::Fetcher;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

/// Fetch the catalog from `url` and store it at `dest`
///
/// Returns the number of plugins in the downloaded catalog.
pub fn update_catalog<F: Fetcher + ?Sized>(fetcher: &F, url: &str, dest: &Path) -> Result<usize> {
    info!("Fetching catalog from {}", url);
    let bytes = fetcher.fetch(url)?;

    let document = String::from_utf8_lossy(&bytes);
    let catalog = Catalog::from_document(&document)?;

    let parent = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(&bytes)?;
    temp.persist(dest).map_err(|e| {
        Error::WriteError(format!("failed to store catalog at {}: {e}", dest.display()))
    })?;

    info!("Wrote {} plugins to {}", catalog.len(), dest.display());
    Ok(catalog.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DOCUMENT: &str = "updateCenter.post(\n{\"plugins\": {\"git\": {\"name\": \"git\", \"version\": \"2.0\", \"url\": \"https://x/git.hpi\"}}}\n);";

    #[test]
    fn test_update_writes_catalog() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("cache/update-center.json");
        let fetch = |_: &str| -> Result<Vec<u8>> { Ok(DOCUMENT.as_bytes().to_vec()) };

        let count = update_catalog(&fetch, "https://example/uc.json", &dest).unwrap();

        assert_eq!(count, 1);
        assert_eq!(fs::read_to_string(&dest).unwrap(), DOCUMENT);
        assert!(Catalog::load_from(&dest).unwrap().contains("git"));
    }

    #[test]
    fn test_invalid_download_keeps_existing_catalog() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("update-center.json");
        fs::write(&dest, DOCUMENT).unwrap();
        let fetch = |_: &str| -> Result<Vec<u8>> { Ok(b"<html>oops</html>".to_vec()) };

        let result = update_catalog(&fetch, "https://example/uc.json", &dest);

        assert!(matches!(result, Err(Error::InvalidCatalog(_))));
        assert_eq!(fs::read_to_string(&dest).unwrap(), DOCUMENT);
    }

    #[test]
    fn test_fetch_error_propagates() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("update-center.json");
        let fetch =
            |url: &str| -> Result<Vec<u8>> { Err(Error::FetchError(format!("HTTP 503 from {url}"))) };

        let result = update_catalog(&fetch, "https://example/uc.json", &dest);
        assert!(matches!(result, Err(Error::FetchError(_))));
        assert!(!dest.exists());
    }
}
