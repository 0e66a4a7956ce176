use image::DynamicImage;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::Rasterizer;
use crate::error::CaptureError;

/// File extensions tried for each region, in order
const EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Rasterizer reading pre-rendered section images from a directory
///
/// Region `item-3` resolves to `<dir>/item-3.png`, `.jpg` or `.jpeg`.
#[derive(Debug, Clone)]
pub struct DirectoryRasterizer {
    dir: PathBuf,
}

impl DirectoryRasterizer {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn find(&self, region_id: &str) -> Option<PathBuf> {
        EXTENSIONS
            .iter()
            .map(|ext| self.dir.join(format!("{}.{}", region_id, ext)))
            .find(|path| path.is_file())
    }
}

impl Rasterizer for DirectoryRasterizer {
    fn capture(&self, region_id: &str) -> Result<Option<DynamicImage>, CaptureError> {
        let Some(path) = self.find(region_id) else {
            return Ok(None);
        };

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CaptureError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        image::load_from_memory(&bytes)
            .map(Some)
            .map_err(|e| CaptureError::Decode {
                region: region_id.to_string(),
                message: e.to_string(),
            })
    }
}
