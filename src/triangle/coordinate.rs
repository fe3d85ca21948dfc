//! Triangles that interpolate a per-vertex coordinate and hand it to their
//! mapping.

use std::fmt;

use bevy::math::{DVec2, DVec3};

use super::{BarycentricSample, RenderingTriangle, TriangleKind, TriangleSource};
use crate::mapping::{SampleContext, TextureMapping};
use crate::surface::{Rgb, SurfaceSpec};

/// A per-vertex quantity that can be barycentrically interpolated.
pub(crate) trait Barycentric: Copy + fmt::Debug + Send + Sync {
    fn blend(corners: &[Self; 3], u: f64, v: f64, w: f64) -> Self;
}

impl Barycentric for () {
    fn blend(_corners: &[Self; 3], _u: f64, _v: f64, _w: f64) -> Self {}
}

impl Barycentric for DVec2 {
    fn blend(c: &[Self; 3], u: f64, v: f64, w: f64) -> Self {
        c[0] * u + c[1] * v + c[2] * w
    }
}

impl Barycentric for DVec3 {
    fn blend(c: &[Self; 3], u: f64, v: f64, w: f64) -> Self {
        c[0] * u + c[1] * v + c[2] * w
    }
}

/// A mapping that splits evaluation into "position to intermediate
/// coordinate" and "coordinate to properties".
///
/// Linear mappings use texture coordinates as the intermediate, so
/// interpolating them is exact. Nonlinear mappings interpolate an
/// object-local point and apply their nonlinear step per sample.
pub(crate) trait CoordinateSampler: TextureMapping {
    type Coord: Barycentric;

    const KIND: TriangleKind;

    fn position_coord(&self, pos: DVec3, params: &[f64]) -> Self::Coord;

    fn sample_spec(&self, spec: &mut SurfaceSpec, coord: Self::Coord, ctx: &SampleContext<'_>);

    fn sample_transparency(&self, trans: &mut Rgb, coord: Self::Coord, ctx: &SampleContext<'_>);

    fn sample_displacement(&self, coord: Self::Coord, ctx: &SampleContext<'_>) -> f64;
}

#[derive(Debug)]
pub(crate) struct CoordinateTriangle<'a, M: CoordinateSampler> {
    mapping: &'a M,
    vertices: [DVec3; 3],
    coords: [M::Coord; 3],
}

impl<'a, M: CoordinateSampler> CoordinateTriangle<'a, M> {
    /// Derives the corner coordinates from the corner positions.
    pub fn from_positions(mapping: &'a M, source: &TriangleSource<'_>) -> Self {
        Self {
            mapping,
            vertices: source.vertices,
            coords: source.vertices.map(|p| mapping.position_coord(p, &[])),
        }
    }

    pub fn with_coords(mapping: &'a M, vertices: [DVec3; 3], coords: [M::Coord; 3]) -> Self {
        Self {
            mapping,
            vertices,
            coords,
        }
    }

    fn coord(&self, sample: &BarycentricSample<'_>) -> M::Coord {
        M::Coord::blend(&self.coords, sample.u, sample.v, sample.w)
    }
}

impl<M: CoordinateSampler> RenderingTriangle for CoordinateTriangle<'_, M> {
    fn kind(&self) -> TriangleKind {
        M::KIND
    }

    fn vertices(&self) -> &[DVec3; 3] {
        &self.vertices
    }

    fn applies_to_face(&self, front: bool) -> bool {
        self.mapping.applies_to_face(front)
    }

    fn evaluate_spec(&self, spec: &mut SurfaceSpec, sample: &BarycentricSample<'_>) {
        self.mapping
            .sample_spec(spec, self.coord(sample), &sample.context());
    }

    fn evaluate_transparency(&self, trans: &mut Rgb, sample: &BarycentricSample<'_>) {
        self.mapping
            .sample_transparency(trans, self.coord(sample), &sample.context());
    }

    fn displacement(&self, sample: &BarycentricSample<'_>) -> f64 {
        self.mapping
            .sample_displacement(self.coord(sample), &sample.context())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend() {
        let c = [DVec2::new(0.0, 0.0), DVec2::new(2.0, 0.0), DVec2::new(0.0, 4.0)];
        let p = DVec2::blend(&c, 0.5, 0.25, 0.25);
        assert!(p.abs_diff_eq(DVec2::new(0.5, 1.0), 1e-12));

        let c = [DVec3::X, DVec3::Y, DVec3::Z];
        let p = DVec3::blend(&c, 0.2, 0.3, 0.5);
        assert!(p.abs_diff_eq(DVec3::new(0.2, 0.3, 0.5), 1e-12));
    }
}
