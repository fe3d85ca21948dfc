//! Plugin for layered texture mapping.
use bevy::prelude::*;

use crate::assign::TexturingSettings;
use crate::mapping::{BlendMode, FaceSide, MappingRegistry, Orientation};
use crate::param::{ParamKind, TextureParameter};
use crate::persist::TextureRegistry;
use crate::surface::{Rgb, SurfaceSpec};

/// Plugin that adds layered texture mapping support to Bevy.
///
/// This plugin registers:
/// - [`TextureRegistry`], [`MappingRegistry`] and [`TexturingSettings`] as resources
/// - Reflection for the settings and surface types
///
/// # Example
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_texture_layers::TextureLayersPlugin;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(TextureLayersPlugin)
///     .run();
/// ```
pub struct TextureLayersPlugin;

impl Plugin for TextureLayersPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TextureRegistry>()
            .init_resource::<MappingRegistry>()
            .init_resource::<TexturingSettings>()
            .register_type::<TexturingSettings>()
            .register_type::<FaceSide>()
            .register_type::<BlendMode>()
            .register_type::<Orientation>()
            .register_type::<Rgb>()
            .register_type::<SurfaceSpec>()
            .register_type::<ParamKind>()
            .register_type::<TextureParameter>();
    }
}
