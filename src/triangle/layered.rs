use bevy::math::DVec3;

use super::{BarycentricSample, RenderingTriangle, TriangleKind, TriangleSource};
use crate::mapping::{
    LayeredMapping, TextureMapping, composite_displacement, composite_spec,
    composite_transparency,
};
use crate::surface::{Rgb, SurfaceSpec};

/// A triangle of a layered mapping.
///
/// Holds one nested triangle per layer whose mapping needs per-vertex data.
/// Layers with trivial triangles are evaluated at the interpolated position
/// instead. Each nested call receives its layer's parameter sub-slice
/// through the sample itself.
#[derive(Debug)]
pub(crate) struct LayeredTriangle<'a> {
    mapping: &'a LayeredMapping,
    vertices: [DVec3; 3],
    nested: Vec<Option<Box<dyn RenderingTriangle + 'a>>>,
}

impl<'a> LayeredTriangle<'a> {
    pub fn new(mapping: &'a LayeredMapping, source: &TriangleSource<'_>) -> Self {
        let nested = mapping
            .layers()
            .iter()
            .zip(mapping.spans())
            .map(|(layer, span)| {
                let triangle = layer
                    .mapping()
                    .map_triangle(&source.with_params(span.slice(source.params)));
                (!triangle.kind().is_trivial()).then_some(triangle)
            })
            .collect();
        Self {
            mapping,
            vertices: source.vertices,
            nested,
        }
    }

    /// Number of layers that kept a nested triangle.
    pub fn nested_count(&self) -> usize {
        self.nested.iter().filter(|n| n.is_some()).count()
    }
}

impl RenderingTriangle for LayeredTriangle<'_> {
    fn kind(&self) -> TriangleKind {
        TriangleKind::Layered
    }

    fn vertices(&self) -> &[DVec3; 3] {
        &self.vertices
    }

    fn applies_to_face(&self, front: bool) -> bool {
        self.mapping.applies_to_face(front)
    }

    fn evaluate_spec(&self, spec: &mut SurfaceSpec, sample: &BarycentricSample<'_>) {
        let layers = self.mapping.layers();
        let pos = self.position(sample.u, sample.v, sample.w);
        let ctx = sample.context();
        composite_spec(
            spec,
            layers,
            self.mapping.spans(),
            sample.params,
            sample.front(),
            |i, layer_spec, sub| match &self.nested[i] {
                Some(triangle) => triangle.evaluate_spec(layer_spec, &sample.with_params(sub)),
                None => layers[i]
                    .mapping()
                    .evaluate_spec(layer_spec, pos, &ctx.with_params(sub)),
            },
        );
    }

    fn evaluate_transparency(&self, trans: &mut Rgb, sample: &BarycentricSample<'_>) {
        let layers = self.mapping.layers();
        let pos = self.position(sample.u, sample.v, sample.w);
        let ctx = sample.context();
        composite_transparency(
            trans,
            layers,
            self.mapping.spans(),
            sample.params,
            sample.front(),
            |i, layer_trans, sub| match &self.nested[i] {
                Some(triangle) => {
                    triangle.evaluate_transparency(layer_trans, &sample.with_params(sub))
                }
                None => layers[i]
                    .mapping()
                    .evaluate_transparency(layer_trans, pos, &ctx.with_params(sub)),
            },
        );
    }

    fn displacement(&self, sample: &BarycentricSample<'_>) -> f64 {
        let layers = self.mapping.layers();
        let pos = self.position(sample.u, sample.v, sample.w);
        let ctx = sample.context();
        composite_displacement(
            layers,
            self.mapping.spans(),
            sample.params,
            |i, sub| match &self.nested[i] {
                Some(triangle) => triangle.displacement(&sample.with_params(sub)),
                None => layers[i].mapping().displacement(pos, &ctx.with_params(sub)),
            },
            |i, layer_trans, sub| match &self.nested[i] {
                Some(triangle) => {
                    triangle.evaluate_transparency(layer_trans, &sample.with_params(sub))
                }
                None => layers[i]
                    .mapping()
                    .evaluate_transparency(layer_trans, pos, &ctx.with_params(sub)),
            },
        )
    }
}
