//! Scene-level texture list used to cross-reference textures by index.

use std::sync::Arc;

use bevy::prelude::*;

use super::PersistError;
use crate::texture::Texture;

/// The textures of a scene, in persisted order.
///
/// Only persistence consults the registry: layered mappings store each
/// layer's texture as an index into it. Evaluation never does.
#[derive(Resource, Default, Clone, Debug)]
pub struct TextureRegistry {
    textures: Vec<Arc<dyn Texture>>,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a texture, returning its index. Registering the same texture
    /// twice returns the existing index.
    pub fn register(&mut self, texture: Arc<dyn Texture>) -> usize {
        if let Some(index) = self.index_of(&texture) {
            return index;
        }
        self.textures.push(texture);
        self.textures.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Arc<dyn Texture>> {
        self.textures.get(index)
    }

    pub fn index_of(&self, texture: &Arc<dyn Texture>) -> Option<usize> {
        self.textures.iter().position(|t| Arc::ptr_eq(t, texture))
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Texture>> {
        self.textures.iter()
    }

    /// The persisted index of `texture`.
    pub(crate) fn persisted_index(&self, texture: &Arc<dyn Texture>) -> Result<i32, PersistError> {
        self.index_of(texture)
            .and_then(|i| i32::try_from(i).ok())
            .ok_or_else(|| PersistError::UnregisteredTexture(texture.name().to_owned()))
    }

    /// Resolves a persisted index.
    pub(crate) fn resolve(&self, index: i32) -> Result<Arc<dyn Texture>, PersistError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.get(i))
            .cloned()
            .ok_or(PersistError::UnknownTextureIndex {
                index,
                count: self.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::UniformTexture;

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = TextureRegistry::new();
        let a: Arc<dyn Texture> = Arc::new(UniformTexture::new("a"));
        let b: Arc<dyn Texture> = Arc::new(UniformTexture::new("b"));
        assert_eq!(registry.register(a.clone()), 0);
        assert_eq!(registry.register(b.clone()), 1);
        assert_eq!(registry.register(a.clone()), 0);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.persisted_index(&b).unwrap(), 1);
    }

    #[test]
    fn test_resolve_errors() {
        let registry = TextureRegistry::new();
        assert!(matches!(
            registry.resolve(3),
            Err(PersistError::UnknownTextureIndex { index: 3, count: 0 })
        ));
        assert!(matches!(
            registry.resolve(-1),
            Err(PersistError::UnknownTextureIndex { index: -1, .. })
        ));
        let stray: Arc<dyn Texture> = Arc::new(UniformTexture::new("stray"));
        assert!(matches!(
            registry.persisted_index(&stray),
            Err(PersistError::UnregisteredTexture(name)) if name == "stray"
        ));
    }
}
