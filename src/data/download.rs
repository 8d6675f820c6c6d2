//! Fetching the raw dataset over HTTP

use crate::core::{Result, SVMError};
use log::{info, warn};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Location of the raw UCI Breast Cancer Wisconsin (Original) data
pub const DATASET_URL: &str = "https://archive.ics.uci.edu/ml/machine-learning-databases/breast-cancer-wisconsin/breast-cancer-wisconsin.data";

/// File name the raw data is stored under
pub const RAW_FILE_NAME: &str = "breast-cancer-wisconsin.data";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// What [`download_dataset`] ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStatus {
    /// The file was fetched and written
    Downloaded { bytes: usize },
    /// A file already existed at the destination; nothing was fetched
    AlreadyPresent,
}

/// Download `url` to `destination` unless the file already exists
///
/// Parent directories are created as needed. A non-success HTTP status
/// is reported as [`SVMError::DownloadError`] and nothing is written.
pub fn download_dataset<P: AsRef<Path>>(url: &str, destination: P) -> Result<DownloadStatus> {
    let destination = destination.as_ref();
    if destination.exists() {
        info!(
            "{} already exists, skipping download",
            destination.display()
        );
        return Ok(DownloadStatus::AlreadyPresent);
    }

    info!("Downloading {url}");
    let client = reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("bcw-svm/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| SVMError::DownloadError(e.to_string()))?;

    let response = client
        .get(url)
        .send()
        .map_err(|e| SVMError::DownloadError(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        warn!("Server answered {status} for {url}");
        return Err(SVMError::DownloadError(format!(
            "request to {url} failed with status {status}"
        )));
    }

    let body = response
        .bytes()
        .map_err(|e| SVMError::DownloadError(e.to_string()))?;

    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(destination, &body)?;

    info!("Saved {} bytes to {}", body.len(), destination.display());
    Ok(DownloadStatus::Downloaded { bytes: body.len() })
}
