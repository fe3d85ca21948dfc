//! Texture parameters and the stores that hold their per-mesh values.
//!
//! A [`TextureParameter`] describes one scalar channel a texture or mapping
//! reads. Its [`ParamId`] is the only stable cross-reference between the
//! descriptor and the values stored on a mesh; two parameters are equal when
//! their identifiers are equal.

mod value;

pub use value::{FaceVertexValues, ParameterError, ParameterValue};

use std::sync::atomic::{AtomicU64, Ordering};

use bevy::prelude::*;

use crate::mapping::MappingHandle;

/// Marks a coordinate channel whose values have not been authored yet.
///
/// Mappings bound to the surface fall back to position-derived coordinates
/// when the first coordinate channel holds this value.
pub const UNASSIGNED_COORDINATE: f64 = f64::MAX;

static NEXT_PARAM_ID: AtomicU64 = AtomicU64::new(1);

/// Derived identifiers carry this bit so they never collide with minted ones.
const DERIVED_BIT: u64 = 1 << 63;

/// Session-unique parameter identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub struct ParamId(u64);

impl ParamId {
    /// Mints a fresh identifier.
    pub fn mint() -> Self {
        Self(NEXT_PARAM_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Derives the identifier under which `owner` re-exposes `original`.
    ///
    /// The result depends only on its inputs, so the same mapping handle and
    /// original identifier always produce the same derived identifier.
    pub fn derived(owner: MappingHandle, original: ParamId) -> Self {
        let mixed = u64::from(owner.raw()).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        Self((original.0 ^ mixed.rotate_left(17)) | DERIVED_BIT)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    pub const fn is_derived(self) -> bool {
        self.0 & DERIVED_BIT != 0
    }
}

/// What a parameter's value means to the mapping that reads it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Reflect)]
pub enum ParamKind {
    #[default]
    Generic,
    XCoordinate,
    YCoordinate,
    ZCoordinate,
    Normal,
}

/// A named scalar channel descriptor.
#[derive(Clone, Debug, Reflect)]
pub struct TextureParameter {
    pub id: ParamId,
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub kind: ParamKind,
}

impl PartialEq for TextureParameter {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TextureParameter {}

impl TextureParameter {
    /// Creates a generic parameter with a freshly minted identifier.
    pub fn new(name: impl Into<String>, min: f64, max: f64, default: f64) -> Self {
        Self {
            id: ParamId::mint(),
            name: name.into(),
            min,
            max,
            default,
            kind: ParamKind::Generic,
        }
    }

    /// Creates an unbounded coordinate channel whose default is
    /// [`UNASSIGNED_COORDINATE`].
    pub fn coordinate(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            kind,
            ..Self::new(name, f64::MIN, f64::MAX, UNASSIGNED_COORDINATE)
        }
    }

    /// Creates a `[0, 1]` blend-fraction channel defaulting to fully opaque.
    pub fn blend_fraction(name: impl Into<String>) -> Self {
        Self::new(name, 0.0, 1.0, 1.0)
    }

    /// Returns a copy that `owner` exposes under a derived identifier.
    pub fn rewrapped(&self, owner: MappingHandle) -> Self {
        Self {
            id: ParamId::derived(owner, self.id),
            ..self.clone()
        }
    }
}
