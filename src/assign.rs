//! Binding textures to objects: default mappings and parameter stores.

use std::sync::Arc;

use bevy::log::debug;
use bevy::math::DVec2;
use bevy::prelude::*;

use crate::mapping::{
    CylindricalMapping, FaceSide, LayeredMapping, Linear3DMapping, MappingKind,
    ProjectionMapping, SphericalMapping, TextureMapping, UniformMapping, UvMapping,
};
use crate::mesh::{MeshGeometry, RenderMesh};
use crate::param::{ParamId, ParameterValue, TextureParameter};
use crate::surface::SurfaceSpec;
use crate::texture::{Texture, TextureDomain};

/// Defaults applied to mappings created for newly assigned textures.
#[derive(Resource, Clone, Debug, Reflect)]
#[reflect(Resource)]
pub struct TexturingSettings {
    /// Faces new mappings apply to.
    /// Default: both
    pub applies_to: FaceSide,

    /// Whether new projection mappings fit their scale to the object.
    /// Default: true
    pub scale_planar_to_object: bool,

    /// Whether new linear 3D mappings fit their scale to the object.
    /// Default: false
    pub scale_solid_to_object: bool,

    /// Whether new mappings read coordinates from the surface.
    /// Default: false
    pub bind_to_surface: bool,

    /// Degrees of azimuth and elevation per texture unit.
    /// Default: (360, 180)
    pub spherical_scale: DVec2,

    /// Degrees of azimuth and height per texture unit.
    /// Default: (360, 1)
    pub cylindrical_scale: DVec2,
}

impl Default for TexturingSettings {
    fn default() -> Self {
        Self {
            applies_to: FaceSide::Both,
            scale_planar_to_object: true,
            scale_solid_to_object: false,
            bind_to_surface: false,
            spherical_scale: SphericalMapping::DEFAULT_SCALE,
            cylindrical_scale: CylindricalMapping::DEFAULT_SCALE,
        }
    }
}

/// The mapping kind a texture gets when first assigned.
pub fn default_kind(domain: TextureDomain) -> MappingKind {
    match domain {
        TextureDomain::Uniform => MappingKind::Uniform,
        TextureDomain::Planar => MappingKind::Projection,
        TextureDomain::Solid => MappingKind::Linear3D,
        TextureDomain::Layered => MappingKind::Layered,
    }
}

/// Creates the default mapping for `texture`'s domain.
pub fn default_mapping(
    texture: Arc<dyn Texture>,
    object: Arc<dyn MeshGeometry>,
    settings: &TexturingSettings,
) -> Box<dyn TextureMapping> {
    let kind = default_kind(texture.domain());
    debug!("creating {} mapping for texture `{}`", kind.tag(), texture.name());
    create_mapping(kind, texture, object, settings)
}

/// Creates a mapping of `kind` configured from `settings`.
pub fn create_mapping(
    kind: MappingKind,
    texture: Arc<dyn Texture>,
    object: Arc<dyn MeshGeometry>,
    settings: &TexturingSettings,
) -> Box<dyn TextureMapping> {
    let mut mapping: Box<dyn TextureMapping> = match kind {
        MappingKind::Uniform => Box::new(UniformMapping::new(object, texture)),
        MappingKind::Projection => {
            let mut m = ProjectionMapping::new(object, texture);
            m.set_scale_to_object(settings.scale_planar_to_object);
            m.set_bind_to_surface(settings.bind_to_surface);
            Box::new(m)
        }
        MappingKind::Linear3D => {
            let mut m = Linear3DMapping::new(object, texture);
            m.set_scale_to_object(settings.scale_solid_to_object);
            m.set_bind_to_surface(settings.bind_to_surface);
            Box::new(m)
        }
        MappingKind::Spherical => {
            let mut m = SphericalMapping::new(object, texture);
            m.set_scale(settings.spherical_scale);
            m.set_bind_to_surface(settings.bind_to_surface);
            Box::new(m)
        }
        MappingKind::Cylindrical => {
            let mut m = CylindricalMapping::new(object, texture);
            m.set_scale(settings.cylindrical_scale);
            m.set_bind_to_surface(settings.bind_to_surface);
            Box::new(m)
        }
        MappingKind::Uv => Box::new(UvMapping::new(object, texture)),
        MappingKind::Layered => Box::new(LayeredMapping::new(object, texture)),
    };
    mapping.set_applies_to(settings.applies_to);
    mapping
}

/// A texture applied to an object, with the mapping that places it and the
/// values of every parameter the mapping exposes.
///
/// Stored values stay matched to their parameters by identifier: when the
/// mapping's parameter list changes, surviving parameters keep their values
/// and only new ones start from their initial values.
#[derive(Debug)]
pub struct TextureAssignment {
    object: Arc<dyn MeshGeometry>,
    texture: Arc<dyn Texture>,
    mapping: Box<dyn TextureMapping>,
    param_ids: Vec<ParamId>,
    values: Vec<ParameterValue>,
}

impl TextureAssignment {
    /// Assigns `texture` to `object` with the default mapping for its domain.
    pub fn assign(
        texture: Arc<dyn Texture>,
        object: Arc<dyn MeshGeometry>,
        settings: &TexturingSettings,
    ) -> Self {
        let mapping = default_mapping(texture.clone(), object.clone(), settings);
        Self::with_mapping(object, texture, mapping)
    }

    /// Assigns with an explicit mapping; values start from its initial values.
    pub fn with_mapping(
        object: Arc<dyn MeshGeometry>,
        texture: Arc<dyn Texture>,
        mapping: Box<dyn TextureMapping>,
    ) -> Self {
        let param_ids = mapping.parameters().iter().map(|p| p.id).collect();
        let values = mapping.initial_parameter_values();
        Self {
            object,
            texture,
            mapping,
            param_ids,
            values,
        }
    }

    pub fn object(&self) -> &Arc<dyn MeshGeometry> {
        &self.object
    }

    pub fn texture(&self) -> &Arc<dyn Texture> {
        &self.texture
    }

    pub fn mapping(&self) -> &dyn TextureMapping {
        self.mapping.as_ref()
    }

    pub fn parameters(&self) -> Vec<TextureParameter> {
        self.mapping.parameters()
    }

    /// Stored values, aligned with [`parameters`](Self::parameters).
    pub fn values(&self) -> &[ParameterValue] {
        &self.values
    }

    pub fn value(&self, id: ParamId) -> Option<&ParameterValue> {
        let index = self.param_ids.iter().position(|p| *p == id)?;
        self.values.get(index)
    }

    /// Replaces the store of parameter `id`, returning the old one. Unknown
    /// identifiers leave the assignment unchanged.
    pub fn set_value(&mut self, id: ParamId, value: ParameterValue) -> Option<ParameterValue> {
        let index = self.param_ids.iter().position(|p| *p == id)?;
        Some(std::mem::replace(&mut self.values[index], value))
    }

    /// Switches to another texture with its default mapping.
    pub fn set_texture(&mut self, texture: Arc<dyn Texture>, settings: &TexturingSettings) {
        self.mapping = default_mapping(texture.clone(), self.object.clone(), settings);
        self.texture = texture;
        self.reconcile();
    }

    /// Replaces the mapping, keeping values of parameters it still exposes.
    pub fn set_mapping(&mut self, mapping: Box<dyn TextureMapping>) {
        self.mapping = mapping;
        self.reconcile();
    }

    /// Edits the mapping in place, then re-matches stored values.
    pub fn edit_mapping<R>(&mut self, edit: impl FnOnce(&mut dyn TextureMapping) -> R) -> R {
        let result = edit(self.mapping.as_mut());
        self.reconcile();
        result
    }

    /// Edits the layer stack of a layered mapping. Returns `None` when the
    /// mapping is not layered.
    pub fn edit_layers<R>(&mut self, edit: impl FnOnce(&mut LayeredMapping) -> R) -> Option<R> {
        let result = edit(self.mapping.as_layered_mut()?);
        self.reconcile();
        Some(result)
    }

    /// Re-matches stored values to the mapping's current parameters.
    pub fn reconcile(&mut self) {
        let params = self.mapping.parameters();
        let mut initial: Option<Vec<ParameterValue>> = None;
        let mut kept = 0;
        let values: Vec<ParameterValue> = params
            .iter()
            .enumerate()
            .map(|(i, param)| {
                if let Some(old) = self.param_ids.iter().position(|id| *id == param.id) {
                    kept += 1;
                    return self.values[old].clone();
                }
                initial
                    .get_or_insert_with(|| self.mapping.initial_parameter_values())
                    .get(i)
                    .cloned()
                    .unwrap_or(ParameterValue::Constant(param.default))
            })
            .collect();
        debug!(
            "reconciled parameter stores: {kept} kept, {} reset",
            params.len() - kept
        );
        self.values = values;
        self.param_ids = params.iter().map(|p| p.id).collect();
    }

    /// A deep copy whose mapping has a new handle.
    ///
    /// The copy's parameter list has the same shape, so values carry over
    /// by position.
    pub fn duplicate(&self) -> Self {
        let mapping = self.mapping.duplicate();
        let param_ids = mapping.parameters().iter().map(|p| p.id).collect();
        Self {
            object: self.object.clone(),
            texture: self.texture.clone(),
            mapping,
            param_ids,
            values: self.values.clone(),
        }
    }

    /// Triangulates the object with the current stores.
    pub fn render_mesh(&self) -> RenderMesh {
        RenderMesh::new(self.object.as_ref(), &self.values)
    }

    /// The texture's average surface properties over this object.
    pub fn average_spec(&self, spec: &mut SurfaceSpec, time: f64) {
        let params: Vec<f64> = self.values.iter().map(ParameterValue::average).collect();
        self.mapping.average_spec(spec, time, &params);
    }
}

#[cfg(test)]
mod tests {
    use bevy::math::DVec3;

    use super::*;
    use crate::mapping::BlendMode;
    use crate::mapping::tests_support::{cube_mesh, front};
    use crate::surface::Rgb;
    use crate::texture::testing::GradientTexture;
    use crate::texture::{LayeredTexture, UniformTexture};

    #[test]
    fn test_default_kinds() {
        let settings = TexturingSettings::default();
        let cases: [(Arc<dyn Texture>, MappingKind); 4] = [
            (Arc::new(UniformTexture::new("flat")), MappingKind::Uniform),
            (Arc::new(GradientTexture::planar()), MappingKind::Projection),
            (Arc::new(GradientTexture::solid()), MappingKind::Linear3D),
            (Arc::new(LayeredTexture::default()), MappingKind::Layered),
        ];
        for (texture, kind) in cases {
            let assignment = TextureAssignment::assign(texture, cube_mesh(), &settings);
            assert_eq!(assignment.mapping().kind(), kind);
            assert_eq!(assignment.values().len(), assignment.parameters().len());
        }
    }

    #[test]
    fn test_settings_configure_mappings() {
        let settings = TexturingSettings {
            applies_to: FaceSide::Back,
            bind_to_surface: true,
            ..default()
        };
        let planar: Arc<dyn Texture> = Arc::new(GradientTexture::planar());
        let mapping = create_mapping(MappingKind::Spherical, planar.clone(), cube_mesh(), &settings);
        assert_eq!(mapping.applies_to(), FaceSide::Back);
        // gain plus bound X/Y/Z
        assert_eq!(mapping.parameter_count(), 4);

        let assignment = TextureAssignment::assign(planar, cube_mesh(), &settings);
        let ParameterValue::Vertex(u) = &assignment.values()[1] else {
            panic!("bound coordinates should be per-vertex");
        };
        assert_eq!(u.len(), 8);
    }

    #[test]
    fn test_set_mapping_keeps_texture_values() {
        let planar: Arc<dyn Texture> = Arc::new(GradientTexture::planar());
        let mut assignment =
            TextureAssignment::assign(planar.clone(), cube_mesh(), &TexturingSettings::default());
        let gain = assignment.parameters()[0].id;
        assert_eq!(
            assignment.set_value(gain, ParameterValue::Constant(3.0)),
            Some(ParameterValue::Constant(1.0))
        );

        let mut uv = UvMapping::new(cube_mesh(), planar);
        uv.set_applies_to(FaceSide::Front);
        assignment.set_mapping(Box::new(uv));
        assert_eq!(assignment.value(gain), Some(&ParameterValue::Constant(3.0)));
        assert_eq!(assignment.values().len(), 3);
        assert!(matches!(assignment.values()[1], ParameterValue::Vertex(_)));
    }

    #[test]
    fn test_reorder_preserves_values() {
        let object = cube_mesh();
        let mut assignment = TextureAssignment::assign(
            Arc::new(LayeredTexture::default()),
            object.clone(),
            &TexturingSettings::default(),
        );
        let red: Arc<dyn Texture> = Arc::new(UniformTexture::colored("red", Rgb::new(1.0, 0.0, 0.0)));
        let solid: Arc<dyn Texture> = Arc::new(GradientTexture::solid());
        assignment
            .edit_layers(|layers| {
                layers.push_layer(
                    red.clone(),
                    Box::new(UniformMapping::new(object.clone(), red.clone())),
                    BlendMode::Blend,
                );
                layers.push_layer(
                    solid.clone(),
                    Box::new(Linear3DMapping::new(object.clone(), solid.clone())),
                    BlendMode::OverlayBlendBumps,
                );
            })
            .unwrap();
        let params = assignment.parameters();
        assert_eq!(params.len(), 3);
        let (red_fraction, gain) = (params[0].id, params[2].id);
        assignment.set_value(red_fraction, ParameterValue::Constant(0.25));
        assignment.set_value(gain, ParameterValue::Constant(4.0));

        assignment.edit_layers(|layers| layers.move_layer(0, 1)).unwrap().unwrap();
        let params = assignment.parameters();
        assert_eq!(params[2].id, red_fraction);
        assert_eq!(params[1].id, gain);
        assert_eq!(assignment.values()[2], ParameterValue::Constant(0.25));
        assert_eq!(assignment.values()[1], ParameterValue::Constant(4.0));

        assignment.edit_layers(|layers| layers.delete_layer(0)).unwrap().unwrap();
        assert_eq!(assignment.values(), &[ParameterValue::Constant(0.25)]);
    }

    #[test]
    fn test_edit_layers_requires_layered_mapping() {
        let mut assignment = TextureAssignment::assign(
            Arc::new(UniformTexture::new("flat")),
            cube_mesh(),
            &TexturingSettings::default(),
        );
        assert!(assignment.edit_layers(|layers| layers.layer_count()).is_none());
    }

    #[test]
    fn test_duplicate() {
        let solid: Arc<dyn Texture> = Arc::new(GradientTexture::solid());
        let mut assignment =
            TextureAssignment::assign(solid, cube_mesh(), &TexturingSettings::default());
        let gain = assignment.parameters()[0].id;
        assignment.set_value(gain, ParameterValue::Constant(2.0));

        let copy = assignment.duplicate();
        assert_ne!(copy.mapping().handle(), assignment.mapping().handle());
        assert_eq!(copy.values(), assignment.values());
        assert_eq!(copy.value(gain), Some(&ParameterValue::Constant(2.0)));

        let mut spec = SurfaceSpec::NONE;
        let mut params = Vec::new();
        let mesh = copy.render_mesh();
        mesh.sample_params(0, 1.0, 0.0, 0.0, &mut params);
        copy.mapping()
            .spec(&mut spec, DVec3::new(0.5, 0.5, 0.5), &front(&params));
        assert!((spec.diffuse.red - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_average_spec() {
        let planar: Arc<dyn Texture> = Arc::new(GradientTexture::planar());
        let mut assignment =
            TextureAssignment::assign(planar, cube_mesh(), &TexturingSettings::default());
        let gain = assignment.parameters()[0].id;
        assignment.set_value(gain, ParameterValue::Vertex(vec![1.0, 3.0, 1.0, 3.0, 1.0, 3.0, 1.0, 3.0]));
        let mut spec = SurfaceSpec::NONE;
        assignment.average_spec(&mut spec, 0.0);
        assert!((spec.diffuse.red - 1.0).abs() < 1e-6);
    }
}
