use image::DynamicImage;
use std::collections::HashMap;

use super::Rasterizer;
use crate::error::CaptureError;

/// Rasterizer backed by images already held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryRasterizer {
    regions: HashMap<String, DynamicImage>,
}

impl MemoryRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<S: Into<String>>(&mut self, region_id: S, image: DynamicImage) {
        self.regions.insert(region_id.into(), image);
    }

    pub fn with_region<S: Into<String>>(mut self, region_id: S, image: DynamicImage) -> Self {
        self.insert(region_id, image);
        self
    }
}

impl Rasterizer for MemoryRasterizer {
    fn capture(&self, region_id: &str) -> Result<Option<DynamicImage>, CaptureError> {
        Ok(self.regions.get(region_id).cloned())
    }
}
