//! Placeholder texture for layered surfaces.

use super::{Texture, TextureDomain, TextureSample};
use crate::persist::{DataReader, DataWriter, PersistError, read_version};
use crate::surface::{Component, SurfaceSpec};

const KIND: &str = "layered texture";
const VERSION: i16 = 0;

/// Marks an object whose surface is a stack of textures.
///
/// All behavior lives in the object's
/// [`LayeredMapping`](crate::mapping::LayeredMapping); sampling this texture
/// directly yields the "no contribution" spec.
#[derive(Clone, Debug, PartialEq)]
pub struct LayeredTexture {
    pub name: String,
}

impl Default for LayeredTexture {
    fn default() -> Self {
        Self::new("Layered Texture")
    }
}

impl LayeredTexture {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn read(input: &mut DataReader<'_>) -> Result<Self, PersistError> {
        read_version(input, KIND, 0, VERSION)?;
        Ok(Self::new(input.read_utf()?))
    }
}

impl Texture for LayeredTexture {
    fn name(&self) -> &str {
        &self.name
    }

    fn domain(&self) -> TextureDomain {
        TextureDomain::Layered
    }

    fn type_tag(&self) -> &'static str {
        "layered"
    }

    fn has_component(&self, _component: Component) -> bool {
        true
    }

    fn spec(&self, spec: &mut SurfaceSpec, _sample: &TextureSample<'_>) {
        spec.clear();
    }

    fn average_spec(&self, spec: &mut SurfaceSpec, _time: f64, _params: &[f64]) {
        spec.clear();
    }

    fn write(&self, out: &mut DataWriter<'_>) -> Result<(), PersistError> {
        out.write_short(VERSION)?;
        out.write_utf(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let tex = LayeredTexture::new("rusty paint");
        let mut bytes = Vec::new();
        tex.write(&mut DataWriter::new(&mut bytes)).unwrap();
        let mut slice = bytes.as_slice();
        assert_eq!(LayeredTexture::read(&mut DataReader::new(&mut slice)).unwrap(), tex);
    }

    #[test]
    fn test_unknown_version_fails() {
        let mut bytes = Vec::new();
        let mut out = DataWriter::new(&mut bytes);
        out.write_short(5).unwrap();
        out.write_utf("future").unwrap();
        let mut slice = bytes.as_slice();
        let err = LayeredTexture::read(&mut DataReader::new(&mut slice)).unwrap_err();
        assert!(matches!(err, PersistError::UnsupportedVersion { version: 5, .. }));
    }
}
