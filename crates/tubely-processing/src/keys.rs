//! Object key derivation.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::TryRngCore;
use std::fmt::{Display, Formatter, Result as FmtResult};
use thiserror::Error;
use tubely_core::constants::{OBJECT_KEY_RANDOM_BYTES, VIDEO_EXTENSION};
use tubely_core::models::AspectClass;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("secure random source unavailable: {0}")]
    RandomSource(String),
}

/// Key of a stored video: `<class>/<random>.mp4`.
///
/// The class prefix is informational only and grants nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectKey {
    class: AspectClass,
    base_name: String,
}

impl ObjectKey {
    /// Draw a fresh key from the operating system's secure random source.
    pub fn generate(class: AspectClass) -> Result<Self, KeyError> {
        let mut random = [0u8; OBJECT_KEY_RANDOM_BYTES];
        OsRng
            .try_fill_bytes(&mut random)
            .map_err(|e| KeyError::RandomSource(e.to_string()))?;

        Ok(Self {
            class,
            base_name: URL_SAFE_NO_PAD.encode(random),
        })
    }

    pub fn class(&self) -> AspectClass {
        self.class
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }
}

impl Display for ObjectKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}/{}.{}", self.class, self.base_name, VIDEO_EXTENSION)
    }
}
