//! Versioned binary records for mappings, textures and parameter stores.
//!
//! Records are big-endian data streams: every mapping and texture record
//! begins with a version `short`, followed by kind-specific scalars.

mod registry;
mod stream;

pub use registry::TextureRegistry;
pub use stream::{DataReader, DataWriter};

use thiserror::Error;

/// Errors raised while reading or writing persisted records.
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported {kind} record version {version}")]
    UnsupportedVersion { kind: &'static str, version: i16 },

    #[error("corrupt {kind} record: {reason}")]
    Corrupt { kind: &'static str, reason: String },

    #[error("unknown mapping kind `{0}`")]
    UnknownMappingKind(String),

    #[error("texture index {index} is not in the scene registry ({count} textures)")]
    UnknownTextureIndex { index: i32, count: usize },

    #[error("texture `{0}` is not registered with the scene and cannot be referenced")]
    UnregisteredTexture(String),

    #[error("failed to reconstruct `{tag}` mapping: {source}")]
    Reconstruct {
        tag: String,
        #[source]
        source: Box<PersistError>,
    },
}

impl PersistError {
    pub(crate) fn corrupt(kind: &'static str, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            kind,
            reason: reason.into(),
        }
    }
}

/// Reads a version tag and fails unless it lies in `min..=max`.
pub(crate) fn read_version(
    input: &mut DataReader<'_>,
    kind: &'static str,
    min: i16,
    max: i16,
) -> Result<i16, PersistError> {
    let version = input.read_short()?;
    if version < min || version > max {
        return Err(PersistError::UnsupportedVersion { kind, version });
    }
    bevy::log::debug!("reading {kind} record, version {version}");
    Ok(version)
}
