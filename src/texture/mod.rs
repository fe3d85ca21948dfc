//! The texture contract consumed by coordinate mappings.
//!
//! Leaf textures (bitmaps, procedural graphs) live outside this crate and
//! implement [`Texture`]. A texture works in its own native space: uniform
//! textures ignore position, planar textures read `(x, y)` and solid
//! textures read `(x, y, z)`. Mappings convert surface positions into that
//! space and convert any bump gradient the texture reports back out of it.

mod layered;
mod uniform;

#[cfg(test)]
pub(crate) mod testing;

pub use layered::LayeredTexture;
pub use uniform::UniformTexture;

use std::fmt;

use bevy::math::DVec3;

use crate::param::TextureParameter;
use crate::persist::{DataWriter, PersistError};
use crate::surface::{Component, Rgb, SurfaceSpec};

/// The native coordinate space of a texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureDomain {
    /// No spatial variation.
    Uniform,
    /// Two-dimensional `(x, y)` coordinates.
    Planar,
    /// Three-dimensional `(x, y, z)` coordinates.
    Solid,
    /// A stack of other textures, evaluated by a layered mapping.
    Layered,
}

/// One texture-space evaluation request.
#[derive(Clone, Copy, Debug)]
pub struct TextureSample<'a> {
    /// Texture-space point. Planar textures ignore `z`.
    pub point: DVec3,
    /// Footprint size along each texture axis, for antialiasing.
    pub size: DVec3,
    /// Cosine of the view angle.
    pub angle: f64,
    pub time: f64,
    /// The mapping's parameter slice; the texture's own parameters come first.
    pub params: &'a [f64],
}

impl<'a> TextureSample<'a> {
    pub fn new(point: DVec3, size: DVec3, angle: f64, time: f64, params: &'a [f64]) -> Self {
        Self {
            point,
            size,
            angle,
            time,
            params,
        }
    }
}

/// A source of surface properties in its own native space.
///
/// Bump gradients written by [`Texture::spec`] are expressed in texture
/// coordinates (`(d/dx, d/dy, 0)` for planar textures); the calling mapping
/// re-projects them.
pub trait Texture: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn domain(&self) -> TextureDomain;

    /// Persisted type tag.
    fn type_tag(&self) -> &'static str;

    fn parameters(&self) -> Vec<TextureParameter> {
        Vec::new()
    }

    fn parameter_count(&self) -> usize {
        self.parameters().len()
    }

    fn has_component(&self, component: Component) -> bool;

    fn spec(&self, spec: &mut SurfaceSpec, sample: &TextureSample<'_>);

    fn transparency(&self, trans: &mut Rgb, sample: &TextureSample<'_>) {
        let mut spec = SurfaceSpec::NONE;
        self.spec(&mut spec, sample);
        *trans = spec.transparent;
    }

    fn displacement(&self, _sample: &TextureSample<'_>) -> f64 {
        0.0
    }

    /// Surface properties averaged over the whole texture.
    fn average_spec(&self, spec: &mut SurfaceSpec, time: f64, params: &[f64]);

    fn write(&self, out: &mut DataWriter<'_>) -> Result<(), PersistError>;
}
