//! Image GPS extraction service

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared::{extract_gps, ExtractOptions, GpsExtractionResult};

use crate::config::Config;
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct ExifService {
    config: Arc<Config>,
}

/// Input for extracting GPS data from an uploaded image
#[derive(Debug, Deserialize)]
pub struct ExtractExifInput {
    pub image_path: Option<String>,
    pub filename: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExifResponse {
    pub success: bool,
    pub filename: String,
    pub gps_data: GpsExtractionResult,
    pub message: String,
}

impl ExifService {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    pub async fn extract(&self, input: ExtractExifInput) -> AppResult<ExifResponse> {
        let raw_path = input
            .image_path
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| AppError::InputMissing("image_path is required".to_string()))?;
        let path = self.resolve(Path::new(&raw_path))?;

        let filename = input.filename.unwrap_or_else(|| {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default()
        });

        let options = ExtractOptions {
            mtime_fallback: self.config.exif.mtime_fallback,
        };
        let gps_data = tokio::task::spawn_blocking(move || extract_gps(&path, &options))
            .await
            .map_err(|e| AppError::Internal(format!("EXIF extraction task failed: {}", e)))?;

        tracing::info!(
            filename = %filename,
            has_gps = gps_data.has_gps,
            verified = gps_data.verified,
            "EXIF extracted"
        );

        Ok(ExifResponse {
            success: true,
            filename,
            gps_data,
            message: "EXIF data extracted successfully".to_string(),
        })
    }

    /// Resolve the image path, confining it to the upload directory when one
    /// is configured
    ///
    /// Containment is decided before existence so that paths outside the
    /// directory are rejected the same way whether or not they exist.
    fn resolve(&self, path: &Path) -> AppResult<PathBuf> {
        let not_found = || AppError::ResourceNotFound("Image file not found".to_string());

        let Some(upload_dir) = &self.config.exif.upload_dir else {
            if !path.exists() {
                return Err(not_found());
            }
            return Ok(path.to_path_buf());
        };

        let root = upload_dir
            .canonicalize()
            .map_err(|e| AppError::Configuration(format!("Upload directory unavailable: {}", e)))?;
        // relative paths are taken relative to the upload directory
        let candidate = lexical_normalize(&root.join(path));
        if !(candidate.starts_with(&root) || candidate.starts_with(lexical_normalize(upload_dir))) {
            return Err(outside_upload_dir());
        }

        // symlinks may still point elsewhere
        let resolved = candidate.canonicalize().map_err(|_| not_found())?;
        if !resolved.starts_with(&root) {
            return Err(outside_upload_dir());
        }
        Ok(resolved)
    }
}

fn outside_upload_dir() -> AppError {
    AppError::invalid("image_path", "Image path is outside the upload directory")
}

/// Drop `.` and fold `..` components without touching the filesystem
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
