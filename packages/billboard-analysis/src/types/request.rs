//! Inbound request types.

use crate::types::location::BillboardLocation;

/// An uploaded creative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

/// One analysis request.
///
/// Viewing distance precedence: `distance_m`, then the metadata setback,
/// then the 100 m default.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub image: ImageUpload,

    /// Catalog id or free-text location label
    pub location: String,

    pub distance_m: Option<f64>,

    /// Site metadata when the caller already has it
    pub metadata: Option<BillboardLocation>,
}

impl AnalysisRequest {
    pub fn new(image: ImageUpload, location: impl Into<String>) -> Self {
        Self {
            image,
            location: location.into(),
            distance_m: None,
            metadata: None,
        }
    }

    pub fn with_distance(mut self, distance_m: f64) -> Self {
        self.distance_m = Some(distance_m);
        self
    }

    pub fn with_metadata(mut self, location: BillboardLocation) -> Self {
        self.metadata = Some(location);
        self
    }
}
