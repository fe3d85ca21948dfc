//! Stacks of (texture, mapping, blend mode) layers composited into one surface.

use std::sync::{Arc, OnceLock};

use bevy::log::trace;
use bevy::math::DVec3;
use bevy::prelude::*;
use thiserror::Error;

use super::composite::{composite_displacement, composite_spec, composite_transparency};
use super::{
    FaceSide, MappingContext, MappingCore, MappingKind, SampleContext, TextureMapping,
    delegate_core,
};
use crate::assign::{TexturingSettings, default_mapping};
use crate::mesh::MeshGeometry;
use crate::param::{ParameterValue, TextureParameter};
use crate::persist::{DataReader, DataWriter, PersistError, TextureRegistry, read_version};
use crate::surface::{Rgb, SurfaceSpec};
use crate::texture::Texture;
use crate::triangle::{LayeredTriangle, RenderingTriangle, TriangleSource};

const RECORD: &str = "layered mapping";
const VERSION: i16 = 0;

/// How a layer combines with the layers beneath it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub enum BlendMode {
    /// Standard front-to-back coverage.
    #[default]
    Blend,
    /// Covers only where the layer itself is opaque; bumps blend.
    OverlayBlendBumps,
    /// Covers only where the layer itself is opaque; bumps add without
    /// consuming the scalar budget.
    OverlayAddBumps,
}

impl BlendMode {
    pub(crate) const fn to_int(self) -> i32 {
        match self {
            Self::Blend => 0,
            Self::OverlayBlendBumps => 1,
            Self::OverlayAddBumps => 2,
        }
    }

    pub(crate) fn from_int(value: i32) -> Result<Self, PersistError> {
        match value {
            0 => Ok(Self::Blend),
            1 => Ok(Self::OverlayBlendBumps),
            2 => Ok(Self::OverlayAddBumps),
            other => Err(PersistError::corrupt(RECORD, format!("blend mode {other}"))),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayerError {
    #[error("layer {index} is out of range for a stack of {count}")]
    OutOfRange { index: usize, count: usize },
}

/// One entry of a layer stack.
#[derive(Debug)]
pub struct Layer {
    texture: Arc<dyn Texture>,
    mapping: Box<dyn TextureMapping>,
    mode: BlendMode,
    fraction: TextureParameter,
}

impl Layer {
    pub fn new(texture: Arc<dyn Texture>, mapping: Box<dyn TextureMapping>, mode: BlendMode) -> Self {
        let fraction = TextureParameter::blend_fraction(texture.name());
        Self {
            texture,
            mapping,
            mode,
            fraction,
        }
    }

    pub fn texture(&self) -> &Arc<dyn Texture> {
        &self.texture
    }

    pub fn mapping(&self) -> &dyn TextureMapping {
        self.mapping.as_ref()
    }

    pub fn mode(&self) -> BlendMode {
        self.mode
    }

    /// The blend-fraction parameter exposed for this layer.
    pub fn fraction(&self) -> &TextureParameter {
        &self.fraction
    }

    /// The child mapping's parameters under this layer's derived identities.
    pub fn parameters(&self) -> Vec<TextureParameter> {
        let owner = self.mapping.handle();
        self.mapping
            .parameters()
            .iter()
            .map(|p| p.rewrapped(owner))
            .collect()
    }

    fn duplicate_for(&self, object: Arc<dyn MeshGeometry>) -> Self {
        Self {
            texture: self.texture.clone(),
            mapping: self.mapping.duplicate_for(object, self.texture.clone()),
            mode: self.mode,
            fraction: self.fraction.clone(),
        }
    }
}

/// Where one layer's values sit in the combined parameter array.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct LayerSpan {
    /// Index of the blend fraction.
    pub fraction: usize,
    /// First index of the child mapping's parameters.
    pub start: usize,
    pub len: usize,
}

impl LayerSpan {
    /// The child's sub-slice of `all`, or an empty slice when `all` is short.
    pub fn slice<'p, T>(&self, all: &'p [T]) -> &'p [T] {
        all.get(self.start..self.start + self.len).unwrap_or(&[])
    }
}

/// Composites an ordered stack of layers, index 0 on top.
///
/// The combined parameter list is, per layer, its blend fraction followed
/// by the child mapping's parameters. Layer offsets into that list are
/// cached and dropped on every structural edit.
#[derive(Debug)]
pub struct LayeredMapping {
    core: MappingCore,
    layers: Vec<Layer>,
    spans: OnceLock<Vec<LayerSpan>>,
}

impl LayeredMapping {
    pub fn new(object: Arc<dyn MeshGeometry>, texture: Arc<dyn Texture>) -> Self {
        Self {
            core: MappingCore::new(object, texture),
            layers: Vec::new(),
            spans: OnceLock::new(),
        }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    fn check(&self, index: usize) -> Result<(), LayerError> {
        if index < self.layers.len() {
            Ok(())
        } else {
            Err(LayerError::OutOfRange {
                index,
                count: self.layers.len(),
            })
        }
    }

    /// Adds `texture` on top of the stack with the default mapping for its
    /// domain.
    pub fn add_layer(&mut self, texture: Arc<dyn Texture>, settings: &TexturingSettings) {
        let mapping = default_mapping(texture.clone(), self.core.object.clone(), settings);
        self.layers.insert(0, Layer::new(texture, mapping, BlendMode::Blend));
        self.invalidate_layout();
    }

    /// Adds a layer at the bottom of the stack.
    pub fn push_layer(&mut self, texture: Arc<dyn Texture>, mapping: Box<dyn TextureMapping>, mode: BlendMode) {
        self.layers.push(Layer::new(texture, mapping, mode));
        self.invalidate_layout();
    }

    /// Inserts a layer so that it ends up at `index`.
    pub fn insert_layer(
        &mut self,
        index: usize,
        texture: Arc<dyn Texture>,
        mapping: Box<dyn TextureMapping>,
        mode: BlendMode,
    ) -> Result<(), LayerError> {
        if index > self.layers.len() {
            return Err(LayerError::OutOfRange {
                index,
                count: self.layers.len(),
            });
        }
        self.layers.insert(index, Layer::new(texture, mapping, mode));
        self.invalidate_layout();
        Ok(())
    }

    pub fn delete_layer(&mut self, index: usize) -> Result<Layer, LayerError> {
        self.check(index)?;
        let layer = self.layers.remove(index);
        self.invalidate_layout();
        Ok(layer)
    }

    /// Moves the layer at `from` so that it ends up at `to`.
    pub fn move_layer(&mut self, from: usize, to: usize) -> Result<(), LayerError> {
        self.check(from)?;
        self.check(to)?;
        let layer = self.layers.remove(from);
        self.layers.insert(to, layer);
        self.invalidate_layout();
        Ok(())
    }

    pub fn set_blend_mode(&mut self, index: usize, mode: BlendMode) -> Result<(), LayerError> {
        self.check(index)?;
        self.layers[index].mode = mode;
        Ok(())
    }

    /// Replaces a layer's mapping, returning the old one.
    pub fn set_layer_mapping(
        &mut self,
        index: usize,
        mapping: Box<dyn TextureMapping>,
    ) -> Result<Box<dyn TextureMapping>, LayerError> {
        self.check(index)?;
        let old = std::mem::replace(&mut self.layers[index].mapping, mapping);
        self.invalidate_layout();
        Ok(old)
    }

    /// Mutable access to a layer's mapping. Its parameter count may change,
    /// so the layout is dropped.
    pub fn layer_mapping_mut(&mut self, index: usize) -> Result<&mut dyn TextureMapping, LayerError> {
        self.check(index)?;
        self.invalidate_layout();
        Ok(self.layers[index].mapping.as_mut())
    }

    pub fn invalidate_layout(&mut self) {
        self.spans.take();
    }

    pub(crate) fn spans(&self) -> &[LayerSpan] {
        self.spans.get_or_init(|| {
            let mut next = 0;
            let spans: Vec<LayerSpan> = self
                .layers
                .iter()
                .map(|layer| {
                    let len = layer.mapping.parameter_count();
                    let span = LayerSpan {
                        fraction: next,
                        start: next + 1,
                        len,
                    };
                    next += 1 + len;
                    span
                })
                .collect();
            trace!(
                "rebuilt layer layout: {} layers, {next} parameters",
                spans.len()
            );
            spans
        })
    }

    pub fn read(
        input: &mut DataReader<'_>,
        ctx: &MappingContext<'_>,
    ) -> Result<Self, PersistError> {
        read_version(input, RECORD, 0, VERSION)?;
        let count = input.read_len(RECORD)?;
        let mut mapping = Self::new(ctx.object.clone(), ctx.texture.clone());
        for _ in 0..count {
            let texture = ctx.textures.resolve(input.read_int()?)?;
            let tag = input.read_utf()?;
            let child = ctx.mappings.read(&tag, input, &ctx.for_texture(texture.clone()))?;
            let mode = BlendMode::from_int(input.read_int()?)?;
            mapping.layers.push(Layer::new(texture, child, mode));
        }
        mapping.core.side = FaceSide::from_int(input.read_int()?)?;
        Ok(mapping)
    }
}

impl TextureMapping for LayeredMapping {
    delegate_core!();

    fn kind(&self) -> MappingKind {
        MappingKind::Layered
    }

    fn parameters(&self) -> Vec<TextureParameter> {
        let mut params = Vec::new();
        for layer in &self.layers {
            params.push(layer.fraction.clone());
            params.extend(layer.parameters());
        }
        params
    }

    fn param_offset(&self) -> usize {
        0
    }

    fn evaluate_spec(&self, spec: &mut SurfaceSpec, pos: DVec3, ctx: &SampleContext<'_>) {
        composite_spec(
            spec,
            &self.layers,
            self.spans(),
            ctx.params,
            ctx.front(),
            |i, layer_spec, sub| {
                self.layers[i]
                    .mapping
                    .evaluate_spec(layer_spec, pos, &ctx.with_params(sub));
            },
        );
    }

    fn evaluate_transparency(&self, trans: &mut Rgb, pos: DVec3, ctx: &SampleContext<'_>) {
        composite_transparency(
            trans,
            &self.layers,
            self.spans(),
            ctx.params,
            ctx.front(),
            |i, layer_trans, sub| {
                self.layers[i]
                    .mapping
                    .evaluate_transparency(layer_trans, pos, &ctx.with_params(sub));
            },
        );
    }

    fn displacement(&self, pos: DVec3, ctx: &SampleContext<'_>) -> f64 {
        composite_displacement(
            &self.layers,
            self.spans(),
            ctx.params,
            |i, sub| self.layers[i].mapping.displacement(pos, &ctx.with_params(sub)),
            |i, layer_trans, sub| {
                self.layers[i]
                    .mapping
                    .evaluate_transparency(layer_trans, pos, &ctx.with_params(sub));
            },
        )
    }

    fn average_spec(&self, spec: &mut SurfaceSpec, time: f64, params: &[f64]) {
        composite_spec(spec, &self.layers, self.spans(), params, true, |i, layer_spec, sub| {
            self.layers[i].mapping.average_spec(layer_spec, time, sub);
        });
    }

    fn map_triangle<'a>(&'a self, source: &TriangleSource<'_>) -> Box<dyn RenderingTriangle + 'a> {
        Box::new(LayeredTriangle::new(self, source))
    }

    fn initial_parameter_values(&self) -> Vec<ParameterValue> {
        let mut values = Vec::new();
        for layer in &self.layers {
            values.push(ParameterValue::Constant(layer.fraction.default));
            values.extend(layer.mapping.initial_parameter_values());
        }
        values
    }

    fn duplicate_for(
        &self,
        object: Arc<dyn MeshGeometry>,
        texture: Arc<dyn Texture>,
    ) -> Box<dyn TextureMapping> {
        Box::new(Self {
            core: self.core.duplicate_for(object.clone(), texture),
            layers: self
                .layers
                .iter()
                .map(|layer| layer.duplicate_for(object.clone()))
                .collect(),
            spans: OnceLock::new(),
        })
    }

    fn write(&self, out: &mut DataWriter<'_>, textures: &TextureRegistry) -> Result<(), PersistError> {
        out.write_short(VERSION)?;
        out.write_len(self.layers.len())?;
        for layer in &self.layers {
            out.write_int(textures.persisted_index(&layer.texture)?)?;
            out.write_utf(layer.mapping.kind().tag())?;
            layer.mapping.write(out, textures)?;
            out.write_int(layer.mode.to_int())?;
        }
        out.write_int(self.core.side.to_int())
    }

    fn as_layered(&self) -> Option<&LayeredMapping> {
        Some(self)
    }

    fn as_layered_mut(&mut self) -> Option<&mut LayeredMapping> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::tests_support::{back, front, triangle_mesh};
    use crate::mapping::{MappingRegistry, ProjectionMapping, UniformMapping};
    use crate::param::ParamId;
    use crate::texture::testing::GradientTexture;
    use crate::texture::{LayeredTexture, UniformTexture};

    fn uniform_layer(texture: UniformTexture) -> (Arc<dyn Texture>, Box<dyn TextureMapping>) {
        let texture: Arc<dyn Texture> = Arc::new(texture);
        let mapping = Box::new(UniformMapping::new(triangle_mesh(), texture.clone()));
        (texture, mapping)
    }

    fn stack() -> LayeredMapping {
        LayeredMapping::new(triangle_mesh(), Arc::new(LayeredTexture::default()))
    }

    fn red_over_blue() -> LayeredMapping {
        let mut m = stack();
        let (red, red_map) = uniform_layer(UniformTexture::colored("red", Rgb::new(1.0, 0.0, 0.0)));
        let (blue, blue_map) =
            uniform_layer(UniformTexture::colored("blue", Rgb::new(0.0, 0.0, 1.0)));
        m.push_layer(red, red_map, BlendMode::Blend);
        m.push_layer(blue, blue_map, BlendMode::Blend);
        m
    }

    #[test]
    fn test_half_red_over_blue() {
        let m = red_over_blue();
        let mut spec = SurfaceSpec::NONE;
        m.spec(&mut spec, DVec3::ZERO, &front(&[0.5, 1.0]));
        assert!(spec.diffuse.abs_diff_eq(Rgb::new(0.5, 0.0, 0.5), 1e-6));
        assert!(spec.transparent.abs_diff_eq(Rgb::BLACK, 1e-6));

        let mut trans = Rgb::WHITE;
        m.transparency(&mut trans, DVec3::ZERO, &front(&[0.5, 1.0]));
        assert!(trans.abs_diff_eq(Rgb::BLACK, 1e-6));
    }

    #[test]
    fn test_single_layer_identity() {
        let mut m = stack();
        let texture: Arc<dyn Texture> = Arc::new(GradientTexture::solid());
        let child = crate::mapping::Linear3DMapping::new(triangle_mesh(), texture.clone());
        let pos = DVec3::new(0.5, 1.5, 0.25);
        let mut expected = SurfaceSpec::NONE;
        child.spec(&mut expected, pos, &front(&[2.0]));
        m.push_layer(texture, Box::new(child), BlendMode::Blend);

        let mut spec = SurfaceSpec::NONE;
        m.spec(&mut spec, pos, &front(&[1.0, 2.0]));
        assert!(spec.abs_diff_eq(&expected, 1e-6));
    }

    #[test]
    fn test_parameter_layout() {
        let mut m = stack();
        let planar: Arc<dyn Texture> = Arc::new(GradientTexture::planar());
        let mut projection = ProjectionMapping::new(triangle_mesh(), planar.clone());
        projection.set_bind_to_surface(true);
        let projection_ids: Vec<ParamId> =
            projection.parameters().iter().map(|p| p.id).collect();
        let handle = projection.handle();
        m.push_layer(planar.clone(), Box::new(projection), BlendMode::Blend);
        let (tex, map) = uniform_layer(UniformTexture::new("flat"));
        m.push_layer(tex, map, BlendMode::OverlayAddBumps);

        let params = m.parameters();
        // fraction, gain, U, V, fraction
        assert_eq!(params.len(), 5);
        assert_eq!(params[0].name, planar.name());
        assert_eq!(params[0].default, 1.0);
        assert_eq!(params[4].name, "flat");
        for (exposed, original) in params[1..4].iter().zip(&projection_ids) {
            assert_eq!(exposed.id, ParamId::derived(handle, *original));
        }
        assert_eq!(
            m.spans(),
            &[
                LayerSpan { fraction: 0, start: 1, len: 3 },
                LayerSpan { fraction: 4, start: 5, len: 0 },
            ]
        );
        // rebuilt identically
        assert_eq!(m.parameters(), params);
        assert_eq!(m.initial_parameter_values().len(), 5);
    }

    #[test]
    fn test_reorder_updates_layout() {
        let mut m = red_over_blue();
        let planar: Arc<dyn Texture> = Arc::new(GradientTexture::planar());
        m.insert_layer(
            0,
            planar.clone(),
            Box::new(UniformMapping::new(triangle_mesh(), planar)),
            BlendMode::Blend,
        )
        .unwrap();
        assert_eq!(m.spans()[1].fraction, 2);
        m.move_layer(0, 2).unwrap();
        assert_eq!(m.layer(2).unwrap().texture().name(), "gradient");
        assert_eq!(m.spans()[1].fraction, 1);
        assert_eq!(m.spans()[2], LayerSpan { fraction: 2, start: 3, len: 1 });

        let removed = m.delete_layer(0).unwrap();
        assert_eq!(removed.texture().name(), "red");
        assert_eq!(m.layer_count(), 2);
        assert_eq!(m.spans()[1].fraction, 1);
    }

    #[test]
    fn test_out_of_range_edits() {
        let mut m = red_over_blue();
        assert_eq!(
            m.delete_layer(2).unwrap_err(),
            LayerError::OutOfRange { index: 2, count: 2 }
        );
        assert!(m.move_layer(0, 5).is_err());
        assert!(m.set_blend_mode(9, BlendMode::Blend).is_err());
        assert!(m.layer_mapping_mut(3).is_err());
        let (tex, map) = uniform_layer(UniformTexture::new("late"));
        assert!(m.insert_layer(3, tex, map, BlendMode::Blend).is_err());
        assert_eq!(m.layer_count(), 2);
    }

    #[test]
    fn test_add_layer_goes_on_top() {
        let mut m = red_over_blue();
        let solid: Arc<dyn Texture> = Arc::new(GradientTexture::solid());
        m.add_layer(solid, &TexturingSettings::default());
        let top = m.layer(0).unwrap();
        assert_eq!(top.mapping().kind(), MappingKind::Linear3D);
        assert_eq!(top.mode(), BlendMode::Blend);
        assert_eq!(m.layer_count(), 3);
    }

    #[test]
    fn test_face_gated_layers_are_skipped() {
        let mut m = red_over_blue();
        m.layer_mapping_mut(0)
            .unwrap()
            .set_applies_to(FaceSide::Front);
        let mut spec = SurfaceSpec::NONE;
        m.spec(&mut spec, DVec3::ZERO, &back(&[1.0, 1.0]));
        assert!(spec.diffuse.abs_diff_eq(Rgb::new(0.0, 0.0, 1.0), 1e-6));
        m.spec(&mut spec, DVec3::ZERO, &front(&[1.0, 1.0]));
        assert!(spec.diffuse.abs_diff_eq(Rgb::new(1.0, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn test_opaque_top_hides_lower_layers() {
        let mut m = red_over_blue();
        let bumpy: Arc<dyn Texture> =
            Arc::new(GradientTexture::solid().with_bump(DVec3::new(0.0, 0.0, 5.0)));
        m.push_layer(
            bumpy.clone(),
            Box::new(UniformMapping::new(triangle_mesh(), bumpy)),
            BlendMode::Blend,
        );
        let mut spec = SurfaceSpec::NONE;
        m.spec(&mut spec, DVec3::ZERO, &front(&[1.0, 1.0, 1.0, 1.0]));
        assert_eq!(spec.bump, DVec3::ZERO);
    }

    /// A uniform texture with a fixed height and half transparency.
    #[derive(Debug)]
    struct Raised(f64);

    impl Texture for Raised {
        fn name(&self) -> &str {
            "raised"
        }
        fn domain(&self) -> crate::texture::TextureDomain {
            crate::texture::TextureDomain::Uniform
        }
        fn type_tag(&self) -> &'static str {
            "raised"
        }
        fn has_component(&self, component: crate::surface::Component) -> bool {
            component == crate::surface::Component::Displacement
        }
        fn spec(&self, spec: &mut SurfaceSpec, _sample: &crate::texture::TextureSample<'_>) {
            *spec = SurfaceSpec {
                transparent: Rgb::splat(0.5),
                ..SurfaceSpec::NONE
            };
        }
        fn displacement(&self, _sample: &crate::texture::TextureSample<'_>) -> f64 {
            self.0
        }
        fn average_spec(&self, spec: &mut SurfaceSpec, _time: f64, _params: &[f64]) {
            spec.clear();
        }
        fn write(&self, _out: &mut DataWriter<'_>) -> Result<(), PersistError> {
            Ok(())
        }
    }

    fn raised_stack(layers: &[(f64, BlendMode)]) -> LayeredMapping {
        let mut m = stack();
        for &(height, mode) in layers {
            let texture: Arc<dyn Texture> = Arc::new(Raised(height));
            m.push_layer(
                texture.clone(),
                Box::new(UniformMapping::new(triangle_mesh(), texture)),
                mode,
            );
        }
        m
    }

    #[test]
    fn test_displacement() {
        let m = raised_stack(&[
            (2.0, BlendMode::Blend),
            (4.0, BlendMode::OverlayBlendBumps),
            (8.0, BlendMode::OverlayAddBumps),
        ]);
        // 2 * 0.5, then 4 * (0.5 * 0.5 * 0.5), then 8 * 0.375
        let height = m.displacement(DVec3::ZERO, &back(&[0.5, 1.0, 1.0]));
        assert!((height - 4.5).abs() < 1e-9);
    }

    #[test]
    fn test_overlay_displacement_discounts_by_remaining() {
        let m = raised_stack(&[
            (0.0, BlendMode::Blend),
            (1.0, BlendMode::OverlayBlendBumps),
        ]);
        // f = 1 * 0.5, discounted by 0.5 * (1 - 0.5)
        let height = m.displacement(DVec3::ZERO, &front(&[0.5, 1.0]));
        assert!((height - 0.125).abs() < 1e-9);
    }

    #[test]
    fn test_round_trip() {
        let mut textures = TextureRegistry::new();
        let planar: Arc<dyn Texture> = Arc::new(GradientTexture::planar());
        let flat: Arc<dyn Texture> = Arc::new(UniformTexture::new("flat"));
        textures.register(planar.clone());
        textures.register(flat.clone());

        let mut m = stack();
        let mut projection = ProjectionMapping::new(triangle_mesh(), planar.clone());
        projection.set_scale(bevy::math::DVec2::new(2.0, 3.0));
        m.push_layer(planar, Box::new(projection), BlendMode::OverlayBlendBumps);
        m.push_layer(
            flat.clone(),
            Box::new(UniformMapping::new(triangle_mesh(), flat)),
            BlendMode::Blend,
        );
        m.set_applies_to(FaceSide::Back);

        let mut bytes = Vec::new();
        m.write(&mut DataWriter::new(&mut bytes), &textures).unwrap();

        let mappings = MappingRegistry::default();
        let ctx = MappingContext::new(m.object().clone(), m.texture().clone(), &textures, &mappings);
        let mut slice = bytes.as_slice();
        let read = LayeredMapping::read(&mut DataReader::new(&mut slice), &ctx).unwrap();
        assert!(slice.is_empty());
        assert_eq!(read.layer_count(), 2);
        assert_eq!(read.applies_to(), FaceSide::Back);
        assert_eq!(read.layer(0).unwrap().mode(), BlendMode::OverlayBlendBumps);
        assert_eq!(read.layer(0).unwrap().mapping().kind(), MappingKind::Projection);
        assert_eq!(read.layer(1).unwrap().texture().name(), "flat");
        assert_eq!(read.parameters().len(), m.parameters().len());

        let pos = DVec3::new(0.3, 0.6, 0.0);
        let params = [0.7, 1.0, 1.0];
        let (mut a, mut b) = (SurfaceSpec::NONE, SurfaceSpec::NONE);
        m.spec(&mut a, pos, &back(&params));
        read.spec(&mut b, pos, &back(&params));
        assert!(a.abs_diff_eq(&b, 1e-9));
    }

    #[test]
    fn test_unregistered_texture_fails_write() {
        let m = red_over_blue();
        let mut bytes = Vec::new();
        let err = m
            .write(&mut DataWriter::new(&mut bytes), &TextureRegistry::new())
            .unwrap_err();
        assert!(matches!(err, PersistError::UnregisteredTexture(name) if name == "red"));
    }
}
