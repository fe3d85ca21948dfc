//! Reconstruction of mappings from their persisted kind tags.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bevy::log::warn;
use bevy::prelude::*;

use super::{
    CylindricalMapping, LayeredMapping, Linear3DMapping, MappingKind, ProjectionMapping,
    SphericalMapping, TextureMapping, UniformMapping, UvMapping,
};
use crate::mesh::MeshGeometry;
use crate::persist::{DataReader, DataWriter, PersistError, TextureRegistry};
use crate::texture::Texture;

/// Everything a loader needs besides the byte stream.
#[derive(Clone)]
pub struct MappingContext<'a> {
    pub object: Arc<dyn MeshGeometry>,
    pub texture: Arc<dyn Texture>,
    pub textures: &'a TextureRegistry,
    pub mappings: &'a MappingRegistry,
}

impl<'a> MappingContext<'a> {
    pub fn new(
        object: Arc<dyn MeshGeometry>,
        texture: Arc<dyn Texture>,
        textures: &'a TextureRegistry,
        mappings: &'a MappingRegistry,
    ) -> Self {
        Self {
            object,
            texture,
            textures,
            mappings,
        }
    }

    /// The same context for a mapping of another texture.
    pub fn for_texture(&self, texture: Arc<dyn Texture>) -> Self {
        Self {
            texture,
            ..self.clone()
        }
    }
}

/// Reads one mapping record (without its tag).
pub type MappingLoader =
    fn(&mut DataReader<'_>, &MappingContext<'_>) -> Result<Box<dyn TextureMapping>, PersistError>;

/// Maps persisted kind tags to loaders.
///
/// The default registry knows every built-in kind; applications add their
/// own with [`register`](Self::register).
#[derive(Resource, Clone)]
pub struct MappingRegistry {
    loaders: HashMap<String, MappingLoader>,
}

impl Default for MappingRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for kind in MappingKind::ALL {
            registry.register(kind.tag(), builtin_loader(kind));
        }
        registry
    }
}

impl fmt::Debug for MappingRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&str> = self.loaders.keys().map(String::as_str).collect();
        tags.sort_unstable();
        f.debug_struct("MappingRegistry").field("tags", &tags).finish()
    }
}

fn builtin_loader(kind: MappingKind) -> MappingLoader {
    match kind {
        MappingKind::Uniform => load_uniform,
        MappingKind::Projection => load_projection,
        MappingKind::Linear3D => load_linear3d,
        MappingKind::Spherical => load_spherical,
        MappingKind::Cylindrical => load_cylindrical,
        MappingKind::Uv => load_uv,
        MappingKind::Layered => load_layered,
    }
}

macro_rules! leaf_loader {
    ($name:ident, $mapping:ty) => {
        fn $name(
            input: &mut DataReader<'_>,
            ctx: &MappingContext<'_>,
        ) -> Result<Box<dyn TextureMapping>, PersistError> {
            let mapping = <$mapping>::read(input, ctx.object.clone(), ctx.texture.clone())?;
            Ok(Box::new(mapping))
        }
    };
}

leaf_loader!(load_uniform, UniformMapping);
leaf_loader!(load_projection, ProjectionMapping);
leaf_loader!(load_linear3d, Linear3DMapping);
leaf_loader!(load_spherical, SphericalMapping);
leaf_loader!(load_cylindrical, CylindricalMapping);
leaf_loader!(load_uv, UvMapping);

fn load_layered(
    input: &mut DataReader<'_>,
    ctx: &MappingContext<'_>,
) -> Result<Box<dyn TextureMapping>, PersistError> {
    Ok(Box::new(LayeredMapping::read(input, ctx)?))
}

impl MappingRegistry {
    /// A registry with no loaders.
    pub fn empty() -> Self {
        Self {
            loaders: HashMap::new(),
        }
    }

    /// Registers `loader` under `tag`, replacing any previous one.
    pub fn register(&mut self, tag: impl Into<String>, loader: MappingLoader) {
        self.loaders.insert(tag.into(), loader);
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.loaders.contains_key(tag)
    }

    /// Reconstructs a mapping of kind `tag` from `input`.
    ///
    /// An unknown tag or a failing loader fails the whole read.
    pub fn read(
        &self,
        tag: &str,
        input: &mut DataReader<'_>,
        ctx: &MappingContext<'_>,
    ) -> Result<Box<dyn TextureMapping>, PersistError> {
        let Some(loader) = self.loaders.get(tag) else {
            warn!("no loader registered for mapping kind `{tag}`");
            return Err(PersistError::UnknownMappingKind(tag.to_owned()));
        };
        loader(input, ctx).map_err(|source| {
            warn!("failed to reconstruct `{tag}` mapping: {source}");
            PersistError::Reconstruct {
                tag: tag.to_owned(),
                source: Box::new(source),
            }
        })
    }

    /// Writes a mapping preceded by its kind tag.
    pub fn write_tagged(
        mapping: &dyn TextureMapping,
        out: &mut DataWriter<'_>,
        textures: &TextureRegistry,
    ) -> Result<(), PersistError> {
        out.write_utf(mapping.kind().tag())?;
        mapping.write(out, textures)
    }

    /// Reads a tag and the mapping record that follows it.
    pub fn read_tagged(
        &self,
        input: &mut DataReader<'_>,
        ctx: &MappingContext<'_>,
    ) -> Result<Box<dyn TextureMapping>, PersistError> {
        let tag = input.read_utf()?;
        self.read(&tag, input, ctx)
    }
}
