//! Per-triangle precomputed mapping data.
//!
//! A mapping turns each mesh triangle into a [`RenderingTriangle`] once;
//! renderers then evaluate it at many barycentric points. The parameter
//! slice travels with every [`BarycentricSample`], so a layered triangle can
//! hand each nested triangle its own sub-slice without any shared state.

mod coordinate;
mod explicit;
mod layered;

pub(crate) use coordinate::{Barycentric, CoordinateSampler, CoordinateTriangle};
pub(crate) use explicit::{UvTriangle, UvwTriangle};
pub(crate) use layered::LayeredTriangle;

use std::fmt;

use bevy::math::DVec3;

use crate::mapping::SampleContext;
use crate::param::ParameterValue;
use crate::surface::{Rgb, SurfaceSpec};

/// The mesh data a mapping needs to build one rendering triangle.
#[derive(Clone, Copy, Debug)]
pub struct TriangleSource<'a> {
    /// Index of the triangle in its render mesh.
    pub face: usize,
    /// Mesh vertex indices of the three corners.
    pub indices: [usize; 3],
    pub vertices: [DVec3; 3],
    pub normals: [DVec3; 3],
    /// Parameter stores, aligned with the building mapping's parameters.
    pub params: &'a [ParameterValue],
}

impl<'a> TriangleSource<'a> {
    /// Values of one parameter at the three corners.
    ///
    /// Missing stores read as [`UNASSIGNED_COORDINATE`](crate::param::UNASSIGNED_COORDINATE)
    /// so that bound mappings fall back to positions.
    pub fn corner_values(&self, param: usize) -> [f64; 3] {
        match self.params.get(param) {
            Some(store) => {
                [0, 1, 2].map(|c| store.corner_value(self.face, c, self.indices[c]))
            }
            None => [crate::param::UNASSIGNED_COORDINATE; 3],
        }
    }

    /// The same triangle seen through a sub-slice of the parameter stores.
    pub fn with_params<'b>(&self, params: &'b [ParameterValue]) -> TriangleSource<'b> {
        TriangleSource {
            face: self.face,
            indices: self.indices,
            vertices: self.vertices,
            normals: self.normals,
            params,
        }
    }
}

/// One barycentric evaluation request.
#[derive(Clone, Copy, Debug)]
pub struct BarycentricSample<'a> {
    /// Cosine of the view angle; positive on the front face.
    pub angle: f64,
    pub u: f64,
    pub v: f64,
    pub w: f64,
    /// Footprint size in world units.
    pub size: f64,
    pub time: f64,
    pub params: &'a [f64],
}

impl<'a> BarycentricSample<'a> {
    pub fn new(angle: f64, u: f64, v: f64, w: f64, size: f64, time: f64, params: &'a [f64]) -> Self {
        Self {
            angle,
            u,
            v,
            w,
            size,
            time,
            params,
        }
    }

    pub fn front(&self) -> bool {
        self.angle > 0.0
    }

    pub fn with_params<'b>(&self, params: &'b [f64]) -> BarycentricSample<'b> {
        BarycentricSample {
            angle: self.angle,
            u: self.u,
            v: self.v,
            w: self.w,
            size: self.size,
            time: self.time,
            params,
        }
    }

    pub fn context(&self) -> SampleContext<'a> {
        SampleContext::new(self.angle, self.size, self.time, self.params)
    }
}

/// Which precomputed data a rendering triangle carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TriangleKind {
    Uniform,
    Linear2D,
    Linear3D,
    UvMapped,
    UvwMapped,
    Nonlinear,
    Layered,
}

impl TriangleKind {
    /// Trivial triangles carry nothing beyond what their mapping derives from
    /// the interpolated position.
    pub const fn is_trivial(self) -> bool {
        matches!(self, Self::Uniform | Self::Linear2D | Self::Linear3D)
    }
}

/// A mesh triangle prepared for repeated evaluation by one mapping.
pub trait RenderingTriangle: fmt::Debug + Send + Sync {
    fn kind(&self) -> TriangleKind;

    fn vertices(&self) -> &[DVec3; 3];

    fn applies_to_face(&self, front: bool) -> bool;

    /// Evaluates without the face gate.
    fn evaluate_spec(&self, spec: &mut SurfaceSpec, sample: &BarycentricSample<'_>);

    fn evaluate_transparency(&self, trans: &mut Rgb, sample: &BarycentricSample<'_>) {
        let mut spec = SurfaceSpec::NONE;
        self.evaluate_spec(&mut spec, sample);
        *trans = spec.transparent;
    }

    /// Displacement height. Displacement has no facing, so it is never gated.
    fn displacement(&self, sample: &BarycentricSample<'_>) -> f64;

    fn spec(&self, spec: &mut SurfaceSpec, sample: &BarycentricSample<'_>) {
        if self.applies_to_face(sample.front()) {
            self.evaluate_spec(spec, sample);
        } else {
            spec.clear();
        }
    }

    fn transparency(&self, trans: &mut Rgb, sample: &BarycentricSample<'_>) {
        if self.applies_to_face(sample.front()) {
            self.evaluate_transparency(trans, sample);
        } else {
            *trans = Rgb::WHITE;
        }
    }

    fn position(&self, u: f64, v: f64, w: f64) -> DVec3 {
        let [a, b, c] = self.vertices();
        *a * u + *b * v + *c * w
    }
}
