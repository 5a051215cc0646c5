//! High-level scanning API.
//!
//! [`Scanner`] is the primary entry point for turning a puzzle photo into a
//! [`Board`](sudoscan_core::Board). It wraps a [`ScanConfig`] and provides
//! synchronous calls plus async variants that run the scan as a single
//! background unit of work.

use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::pipeline::{self, ScanConfig, ScanError, ScanOutcome};

/// Primary scanning interface.
///
/// Create once, scan many photos.
///
/// # Examples
///
/// ```no_run
/// use sudoscan::Scanner;
/// use std::path::Path;
///
/// let scanner = Scanner::new();
/// let outcome = scanner.scan_path(Path::new("puzzle.jpg")).unwrap();
/// println!("{} digits recognized", outcome.board.filled_count());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    config: ScanConfig,
}

impl Scanner {
    /// Create a scanner with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with full config control.
    pub fn with_config(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Access the current configuration.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Mutable access to configuration for post-construction tuning.
    pub fn config_mut(&mut self) -> &mut ScanConfig {
        &mut self.config
    }

    /// Scan a decoded image.
    pub fn scan_image(&self, image: &DynamicImage) -> Result<ScanOutcome, ScanError> {
        pipeline::scan_image(image, &self.config)
    }

    /// Decode an image file and scan it.
    pub fn scan_path(&self, path: &Path) -> Result<ScanOutcome, ScanError> {
        let image = image::open(path).map_err(|e| ScanError::ImageDecode(e.to_string()))?;
        pipeline::scan_image(&image, &self.config)
    }

    /// Scan a decoded image as one asynchronous unit of work.
    ///
    /// The blocking pipeline (including all 81 OCR calls) runs on the
    /// runtime's blocking pool, so the calling executor thread is never
    /// held up.
    pub async fn scan_image_async(&self, image: DynamicImage) -> Result<ScanOutcome, ScanError> {
        let config = self.config.clone();
        tokio::task::spawn_blocking(move || pipeline::scan_image(&image, &config))
            .await
            .map_err(|e| ScanError::ScanFailed(format!("scan task: {}", e)))?
    }

    /// Decode and scan an image file as one asynchronous unit of work.
    ///
    /// Both the decode and the per-cell OCR happen off the executor thread.
    pub async fn scan_path_async(&self, path: PathBuf) -> Result<ScanOutcome, ScanError> {
        let config = self.config.clone();
        tokio::task::spawn_blocking(move || {
            let image = image::open(&path).map_err(|e| ScanError::ImageDecode(e.to_string()))?;
            pipeline::scan_image(&image, &config)
        })
        .await
        .map_err(|e| ScanError::ScanFailed(format!("scan task: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reports_decode_failure() {
        let scanner = Scanner::new();
        let err = scanner
            .scan_path(Path::new("/nonexistent/puzzle.jpg"))
            .unwrap_err();
        assert!(matches!(err, ScanError::ImageDecode(_)));
    }

    #[test]
    fn config_mut_tunes_the_pipeline() {
        let mut scanner = Scanner::new();
        scanner.config_mut().rectify.canvas_size = 540;
        assert_eq!(scanner.config().rectify.canvas_size, 540);
    }

    #[test]
    fn async_scan_surfaces_the_same_errors() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let scanner = Scanner::new();
        let err = runtime
            .block_on(scanner.scan_path_async(PathBuf::from("/nonexistent/puzzle.jpg")))
            .unwrap_err();
        assert!(matches!(err, ScanError::ImageDecode(_)));
    }
}
