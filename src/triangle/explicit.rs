//! Triangles carrying explicit texture coordinates per vertex.

use bevy::log::trace;
use bevy::math::{DVec2, DVec3};

use super::{BarycentricSample, RenderingTriangle, TriangleKind};
use crate::mapping::TextureMapping;
use crate::surface::{Component, Rgb, SurfaceSpec};
use crate::texture::TextureSample;

/// World-space gradient of a scalar given at the three corners, restricted
/// to the triangle's plane.
///
/// Degenerate triangles have no well-defined gradient and yield zero.
pub(crate) fn coordinate_gradient(vertices: &[DVec3; 3], values: [f64; 3]) -> DVec3 {
    let e1 = vertices[1] - vertices[0];
    let e2 = vertices[2] - vertices[0];
    let n = e1.cross(e2);
    let area2 = n.length_squared();
    if area2 <= f64::EPSILON * f64::EPSILON {
        trace!("degenerate triangle {vertices:?}, coordinate gradient set to zero");
        return DVec3::ZERO;
    }
    let d1 = values[1] - values[0];
    let d2 = values[2] - values[0];
    (e2.cross(n) * d1 + n.cross(e1) * d2) / area2
}

fn footprint(size: f64, gradients: &[DVec3]) -> DVec3 {
    let mut out = DVec3::ZERO;
    for (i, g) in gradients.iter().enumerate() {
        out[i] = size * g.length();
    }
    out
}

/// Surface-authored `(u, v)` coordinates for a planar texture.
#[derive(Debug)]
pub(crate) struct UvTriangle<'a> {
    mapping: &'a dyn TextureMapping,
    vertices: [DVec3; 3],
    coords: [DVec2; 3],
    gradients: [DVec3; 2],
}

impl<'a> UvTriangle<'a> {
    pub fn new(mapping: &'a dyn TextureMapping, vertices: [DVec3; 3], coords: [DVec2; 3]) -> Self {
        let gradients = [
            coordinate_gradient(&vertices, coords.map(|c| c.x)),
            coordinate_gradient(&vertices, coords.map(|c| c.y)),
        ];
        Self {
            mapping,
            vertices,
            coords,
            gradients,
        }
    }

    fn texture_sample<'s>(&self, sample: &BarycentricSample<'s>) -> TextureSample<'s> {
        let [a, b, c] = self.coords;
        let uv = a * sample.u + b * sample.v + c * sample.w;
        TextureSample::new(
            uv.extend(0.0),
            footprint(sample.size, &self.gradients),
            sample.angle,
            sample.time,
            sample.params,
        )
    }
}

impl RenderingTriangle for UvTriangle<'_> {
    fn kind(&self) -> TriangleKind {
        TriangleKind::UvMapped
    }

    fn vertices(&self) -> &[DVec3; 3] {
        &self.vertices
    }

    fn applies_to_face(&self, front: bool) -> bool {
        self.mapping.applies_to_face(front)
    }

    fn evaluate_spec(&self, spec: &mut SurfaceSpec, sample: &BarycentricSample<'_>) {
        let texture = self.mapping.texture();
        texture.spec(spec, &self.texture_sample(sample));
        if texture.has_component(Component::Bump) {
            let g = spec.bump;
            spec.bump = self.gradients[0] * g.x + self.gradients[1] * g.y;
        }
    }

    fn evaluate_transparency(&self, trans: &mut Rgb, sample: &BarycentricSample<'_>) {
        self.mapping
            .texture()
            .transparency(trans, &self.texture_sample(sample));
    }

    fn displacement(&self, sample: &BarycentricSample<'_>) -> f64 {
        self.mapping
            .texture()
            .displacement(&self.texture_sample(sample))
    }
}

/// Surface-authored `(u, v, w)` coordinates for a solid texture.
#[derive(Debug)]
pub(crate) struct UvwTriangle<'a> {
    mapping: &'a dyn TextureMapping,
    vertices: [DVec3; 3],
    coords: [DVec3; 3],
    gradients: [DVec3; 3],
}

impl<'a> UvwTriangle<'a> {
    pub fn new(mapping: &'a dyn TextureMapping, vertices: [DVec3; 3], coords: [DVec3; 3]) -> Self {
        let gradients = [
            coordinate_gradient(&vertices, coords.map(|c| c.x)),
            coordinate_gradient(&vertices, coords.map(|c| c.y)),
            coordinate_gradient(&vertices, coords.map(|c| c.z)),
        ];
        Self {
            mapping,
            vertices,
            coords,
            gradients,
        }
    }

    fn texture_sample<'s>(&self, sample: &BarycentricSample<'s>) -> TextureSample<'s> {
        let [a, b, c] = self.coords;
        TextureSample::new(
            a * sample.u + b * sample.v + c * sample.w,
            footprint(sample.size, &self.gradients),
            sample.angle,
            sample.time,
            sample.params,
        )
    }
}

impl RenderingTriangle for UvwTriangle<'_> {
    fn kind(&self) -> TriangleKind {
        TriangleKind::UvwMapped
    }

    fn vertices(&self) -> &[DVec3; 3] {
        &self.vertices
    }

    fn applies_to_face(&self, front: bool) -> bool {
        self.mapping.applies_to_face(front)
    }

    fn evaluate_spec(&self, spec: &mut SurfaceSpec, sample: &BarycentricSample<'_>) {
        let texture = self.mapping.texture();
        texture.spec(spec, &self.texture_sample(sample));
        if texture.has_component(Component::Bump) {
            let g = spec.bump;
            let [gu, gv, gw] = self.gradients;
            spec.bump = gu * g.x + gv * g.y + gw * g.z;
        }
    }

    fn evaluate_transparency(&self, trans: &mut Rgb, sample: &BarycentricSample<'_>) {
        self.mapping
            .texture()
            .transparency(trans, &self.texture_sample(sample));
    }

    fn displacement(&self, sample: &BarycentricSample<'_>) -> f64 {
        self.mapping
            .texture()
            .displacement(&self.texture_sample(sample))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_recovers_linear_field() {
        let vertices = [
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(2.0, 0.0, 0.0),
            DVec3::new(0.0, 1.0, 1.0),
        ];
        // f(p) = 3x + y - z restricted to the plane
        let f = |p: DVec3| 3.0 * p.x + p.y - p.z;
        let g = coordinate_gradient(&vertices, vertices.map(f));
        let e1 = vertices[1] - vertices[0];
        let e2 = vertices[2] - vertices[0];
        assert!((g.dot(e1) - (f(vertices[1]) - f(vertices[0]))).abs() < 1e-12);
        assert!((g.dot(e2) - (f(vertices[2]) - f(vertices[0]))).abs() < 1e-12);
        assert!(g.dot(e1.cross(e2)).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_gradient_is_zero() {
        let vertices = [DVec3::ZERO, DVec3::X, DVec3::X * 2.0];
        assert_eq!(coordinate_gradient(&vertices, [0.0, 1.0, 2.0]), DVec3::ZERO);
    }
}
