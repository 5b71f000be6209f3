use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;

/// Frame size of the first video stream in a file.
///
/// Both axes are strictly positive; `new` refuses a zero on either side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MediaGeometry {
    width: u32,
    height: u32,
}

impl MediaGeometry {
    pub fn new(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

/// Coarse orientation bucket derived from the width-to-height ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AspectClass {
    Landscape,
    Portrait,
    Other,
}

impl AspectClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectClass::Landscape => "landscape",
            AspectClass::Portrait => "portrait",
            AspectClass::Other => "other",
        }
    }
}

impl Display for AspectClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_rejects_zero_axis() {
        assert!(MediaGeometry::new(0, 1080).is_none());
        assert!(MediaGeometry::new(1920, 0).is_none());
        assert!(MediaGeometry::new(1920, 1080).is_some());
    }

    #[test]
    fn test_aspect_class_serializes_lowercase() {
        let json = serde_json::to_string(&AspectClass::Portrait).unwrap();
        assert_eq!(json, "\"portrait\"");
        assert_eq!(AspectClass::Landscape.to_string(), "landscape");
    }
}
