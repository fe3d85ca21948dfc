//! Coordinate mappings: from surface positions into a texture's native space.
//!
//! Every mapping owns a texture, the object it is applied to and a face
//! applicability flag. Evaluation takes either a world-space position
//! ([`TextureMapping::spec`]) or a precomputed triangle
//! ([`TextureMapping::map_triangle`]).

mod composite;
mod cylindrical;
mod frame;
mod layered;
mod linear3d;
mod projection;
mod registry;
mod spherical;
mod uniform;
mod uv;

pub use composite::Coverage;
pub use cylindrical::CylindricalMapping;
pub use frame::{Basis, Orientation};
pub use layered::{BlendMode, Layer, LayerError, LayeredMapping};
pub use linear3d::Linear3DMapping;
pub use projection::ProjectionMapping;
pub use registry::{MappingContext, MappingLoader, MappingRegistry};
pub use spherical::SphericalMapping;
pub use uniform::UniformMapping;
pub use uv::UvMapping;

pub(crate) use composite::{composite_displacement, composite_spec, composite_transparency};
pub(crate) use layered::LayerSpan;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use bevy::math::DVec3;
use bevy::prelude::*;

use crate::mesh::MeshGeometry;
use crate::param::{ParameterValue, TextureParameter};
use crate::persist::{DataWriter, PersistError, TextureRegistry};
use crate::surface::{Rgb, SurfaceSpec};
use crate::texture::{Texture, TextureSample};
use crate::triangle::{RenderingTriangle, TriangleSource};

static NEXT_HANDLE: AtomicU32 = AtomicU32::new(1);

/// Stable per-instance identity of a mapping, assigned at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub struct MappingHandle(u32);

impl MappingHandle {
    pub fn mint() -> Self {
        Self(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Which faces a mapping applies to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub enum FaceSide {
    Front,
    Back,
    #[default]
    Both,
}

impl FaceSide {
    pub const fn includes(self, front: bool) -> bool {
        match self {
            Self::Front => front,
            Self::Back => !front,
            Self::Both => true,
        }
    }

    pub(crate) const fn to_int(self) -> i32 {
        match self {
            Self::Front => 0,
            Self::Back => 1,
            Self::Both => 2,
        }
    }

    pub(crate) fn from_int(value: i32) -> Result<Self, PersistError> {
        match value {
            0 => Ok(Self::Front),
            1 => Ok(Self::Back),
            2 => Ok(Self::Both),
            other => Err(PersistError::corrupt(
                "mapping",
                format!("face side {other}"),
            )),
        }
    }
}

/// The non-positional inputs of one position-based evaluation.
#[derive(Clone, Copy, Debug)]
pub struct SampleContext<'a> {
    /// Cosine of the view angle; positive on the front face.
    pub angle: f64,
    /// Footprint size in world units.
    pub size: f64,
    pub time: f64,
    /// The mapping's parameter values, in [`TextureMapping::parameters`] order.
    pub params: &'a [f64],
}

impl<'a> SampleContext<'a> {
    pub fn new(angle: f64, size: f64, time: f64, params: &'a [f64]) -> Self {
        Self {
            angle,
            size,
            time,
            params,
        }
    }

    pub fn front(&self) -> bool {
        self.angle > 0.0
    }

    pub fn with_params<'b>(&self, params: &'b [f64]) -> SampleContext<'b> {
        SampleContext::new(self.angle, self.size, self.time, params)
    }

    /// A texture request at `point` with footprint `size` in texture units.
    pub fn texture_sample(&self, point: DVec3, size: DVec3) -> TextureSample<'a> {
        TextureSample::new(point, size, self.angle, self.time, self.params)
    }
}

/// Concrete mapping kinds, named by their persisted tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MappingKind {
    Uniform,
    Projection,
    Linear3D,
    Spherical,
    Cylindrical,
    Uv,
    Layered,
}

impl MappingKind {
    pub const ALL: [Self; 7] = [
        Self::Uniform,
        Self::Projection,
        Self::Linear3D,
        Self::Spherical,
        Self::Cylindrical,
        Self::Uv,
        Self::Layered,
    ];

    pub const fn tag(self) -> &'static str {
        match self {
            Self::Uniform => "uniform",
            Self::Projection => "projection",
            Self::Linear3D => "linear3d",
            Self::Spherical => "spherical",
            Self::Cylindrical => "cylindrical",
            Self::Uv => "uv",
            Self::Layered => "layered",
        }
    }
}

/// Transforms surface locations into a texture's space and evaluates it.
///
/// Implementations provide the ungated `evaluate_*` methods; callers use
/// [`spec`](Self::spec) and [`transparency`](Self::transparency), which
/// report "no contribution" on faces the mapping does not apply to.
pub trait TextureMapping: fmt::Debug + Send + Sync {
    fn handle(&self) -> MappingHandle;

    fn kind(&self) -> MappingKind;

    fn texture(&self) -> &Arc<dyn Texture>;

    fn object(&self) -> &Arc<dyn MeshGeometry>;

    fn applies_to(&self) -> FaceSide;

    fn set_applies_to(&mut self, side: FaceSide);

    fn applies_to_face(&self, front: bool) -> bool {
        self.applies_to().includes(front)
    }

    /// The texture's parameters followed by the mapping's own.
    ///
    /// Rebuilt on every call; the composition can change with the texture.
    fn parameters(&self) -> Vec<TextureParameter> {
        self.texture().parameters()
    }

    fn parameter_count(&self) -> usize {
        self.parameters().len()
    }

    /// Index at which the mapping's own parameters begin.
    fn param_offset(&self) -> usize {
        self.texture().parameter_count()
    }

    fn evaluate_spec(&self, spec: &mut SurfaceSpec, pos: DVec3, ctx: &SampleContext<'_>);

    fn evaluate_transparency(&self, trans: &mut Rgb, pos: DVec3, ctx: &SampleContext<'_>) {
        let mut spec = SurfaceSpec::NONE;
        self.evaluate_spec(&mut spec, pos, ctx);
        *trans = spec.transparent;
    }

    /// Displacement height at `pos`. Never gated by face.
    fn displacement(&self, pos: DVec3, ctx: &SampleContext<'_>) -> f64;

    fn spec(&self, spec: &mut SurfaceSpec, pos: DVec3, ctx: &SampleContext<'_>) {
        if self.applies_to_face(ctx.front()) {
            self.evaluate_spec(spec, pos, ctx);
        } else {
            spec.clear();
        }
    }

    fn transparency(&self, trans: &mut Rgb, pos: DVec3, ctx: &SampleContext<'_>) {
        if self.applies_to_face(ctx.front()) {
            self.evaluate_transparency(trans, pos, ctx);
        } else {
            *trans = Rgb::WHITE;
        }
    }

    /// Average properties over the whole texture, given averaged parameters.
    fn average_spec(&self, spec: &mut SurfaceSpec, time: f64, params: &[f64]) {
        self.texture().average_spec(spec, time, params);
    }

    /// Precomputes the data for evaluating one mesh triangle.
    fn map_triangle<'a>(&'a self, source: &TriangleSource<'_>) -> Box<dyn RenderingTriangle + 'a>;

    /// Initial values for every parameter, aligned with
    /// [`parameters`](Self::parameters).
    fn initial_parameter_values(&self) -> Vec<ParameterValue> {
        default_values(&self.parameters())
    }

    /// A deep copy targeting `object` and `texture`, with a new handle.
    fn duplicate_for(
        &self,
        object: Arc<dyn MeshGeometry>,
        texture: Arc<dyn Texture>,
    ) -> Box<dyn TextureMapping>;

    fn duplicate(&self) -> Box<dyn TextureMapping> {
        self.duplicate_for(self.object().clone(), self.texture().clone())
    }

    /// Writes the mapping's record, without its kind tag.
    fn write(&self, out: &mut DataWriter<'_>, textures: &TextureRegistry) -> Result<(), PersistError>;

    fn as_layered(&self) -> Option<&LayeredMapping> {
        None
    }

    fn as_layered_mut(&mut self) -> Option<&mut LayeredMapping> {
        None
    }
}

/// State shared by every mapping kind.
#[derive(Clone, Debug)]
pub(crate) struct MappingCore {
    pub handle: MappingHandle,
    pub texture: Arc<dyn Texture>,
    pub object: Arc<dyn MeshGeometry>,
    pub side: FaceSide,
}

impl MappingCore {
    pub fn new(object: Arc<dyn MeshGeometry>, texture: Arc<dyn Texture>) -> Self {
        Self {
            handle: MappingHandle::mint(),
            texture,
            object,
            side: FaceSide::Both,
        }
    }

    /// A copy under a new handle.
    pub fn duplicate_for(&self, object: Arc<dyn MeshGeometry>, texture: Arc<dyn Texture>) -> Self {
        Self {
            handle: MappingHandle::mint(),
            texture,
            object,
            side: self.side,
        }
    }
}

/// Implements the bookkeeping accessors of [`TextureMapping`] by delegating
/// to a `core: MappingCore` field.
macro_rules! delegate_core {
    () => {
        fn handle(&self) -> $crate::mapping::MappingHandle {
            self.core.handle
        }

        fn texture(&self) -> &std::sync::Arc<dyn $crate::texture::Texture> {
            &self.core.texture
        }

        fn object(&self) -> &std::sync::Arc<dyn $crate::mesh::MeshGeometry> {
            &self.core.object
        }

        fn applies_to(&self) -> $crate::mapping::FaceSide {
            self.core.side
        }

        fn set_applies_to(&mut self, side: $crate::mapping::FaceSide) {
            self.core.side = side;
        }
    };
}
pub(crate) use delegate_core;

/// Constant stores holding each parameter's default.
pub(crate) fn default_values(params: &[TextureParameter]) -> Vec<ParameterValue> {
    params
        .iter()
        .map(|p| ParameterValue::Constant(p.default))
        .collect()
}

/// Reads the coordinate channels a bound mapping owns, or `None` when the
/// first channel has not been assigned.
pub(crate) fn bound_channels<const N: usize>(params: &[f64], offset: usize) -> Option<[f64; N]> {
    let channels: [f64; N] = params.get(offset..offset + N)?.try_into().ok()?;
    (channels[0] != crate::param::UNASSIGNED_COORDINATE).then_some(channels)
}

/// Corner coordinates of a triangle read from bound channels, or `None`
/// when any corner is unassigned.
pub(crate) fn bound_corners<const N: usize>(
    source: &TriangleSource<'_>,
    offset: usize,
) -> Option<[[f64; N]; 3]> {
    if source.params.len() < offset + N {
        return None;
    }
    let mut corners = [[0.0; N]; 3];
    for channel in 0..N {
        let values = source.corner_values(offset + channel);
        for (corner, value) in values.into_iter().enumerate() {
            corners[corner][channel] = value;
        }
    }
    corners
        .iter()
        .all(|c| c[0] != crate::param::UNASSIGNED_COORDINATE)
        .then_some(corners)
}

/// Default per-vertex coordinate stores for bound channels, computed from
/// vertex positions.
pub(crate) fn vertex_channels<const N: usize>(
    object: &dyn MeshGeometry,
    coord: impl Fn(DVec3) -> [f64; N],
) -> [ParameterValue; N] {
    let coords: Vec<[f64; N]> = object.vertices().iter().map(|p| coord(*p)).collect();
    std::array::from_fn(|channel| {
        ParameterValue::Vertex(coords.iter().map(|c| c[channel]).collect())
    })
}
