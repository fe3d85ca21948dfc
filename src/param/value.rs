//! Per-mesh storage of parameter values.

use thiserror::Error;

use crate::persist::{DataReader, DataWriter, PersistError};

/// Errors building a parameter store from raw parts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("offset table must start at 0 and have one entry more than the face count")]
    MalformedOffsets,

    #[error("offset table decreases at face {face}")]
    DecreasingOffsets { face: usize },

    #[error("offset table ends at {end} but {count} values are stored")]
    CountMismatch { end: usize, count: usize },
}

/// One value per (face, corner) pair.
///
/// Values are stored flat, with `offsets[f]..offsets[f + 1]` spanning face
/// `f`, so faces may have different vertex counts. The same mesh vertex may
/// carry different values on different faces, which allows hard seams.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceVertexValues {
    values: Vec<f64>,
    offsets: Vec<usize>,
}

impl FaceVertexValues {
    /// Builds the store from one value list per face.
    ///
    /// # Example
    /// ```
    /// use bevy_texture_layers::param::FaceVertexValues;
    ///
    /// let fv = FaceVertexValues::from_faces([vec![1.0, 2.0, 3.0], vec![4.0, 5.0]]);
    /// assert_eq!(fv.face_vertex_count(1), 2);
    /// assert_eq!(fv.value(1, 1), 5.0);
    /// ```
    pub fn from_faces<I, F>(faces: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: AsRef<[f64]>,
    {
        let mut values = Vec::new();
        let mut offsets = vec![0];
        for face in faces {
            values.extend_from_slice(face.as_ref());
            offsets.push(values.len());
        }
        Self { values, offsets }
    }

    /// Builds the store from a flat value array and its offset table.
    pub fn from_parts(values: Vec<f64>, offsets: Vec<usize>) -> Result<Self, ParameterError> {
        if offsets.first() != Some(&0) {
            return Err(ParameterError::MalformedOffsets);
        }
        if let Some(face) = offsets.windows(2).position(|w| w[1] < w[0]) {
            return Err(ParameterError::DecreasingOffsets { face });
        }
        let end = *offsets.last().unwrap_or(&0);
        if end != values.len() {
            return Err(ParameterError::CountMismatch {
                end,
                count: values.len(),
            });
        }
        Ok(Self { values, offsets })
    }

    /// Builds a store where every face is a triangle.
    pub fn triangles(values: Vec<[f64; 3]>) -> Self {
        let offsets = (0..=values.len()).map(|f| f * 3).collect();
        Self {
            values: values.into_iter().flatten().collect(),
            offsets,
        }
    }

    pub fn face_count(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn face_vertex_count(&self, face: usize) -> usize {
        self.offsets[face + 1] - self.offsets[face]
    }

    pub fn value(&self, face: usize, corner: usize) -> f64 {
        self.values[self.offsets[face] + corner]
    }

    pub fn set_value(&mut self, face: usize, corner: usize, value: f64) {
        self.values[self.offsets[face] + corner] = value;
    }

    /// The values of one face, in corner order.
    pub fn face(&self, face: usize) -> &[f64] {
        &self.values[self.offsets[face]..self.offsets[face + 1]]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Arithmetic mean of every stored value.
    pub fn average(&self) -> f64 {
        mean(&self.values)
    }
}

/// The values of one parameter over a mesh.
#[derive(Clone, Debug, PartialEq)]
pub enum ParameterValue {
    /// A single value everywhere.
    Constant(f64),
    /// One value per mesh vertex.
    Vertex(Vec<f64>),
    /// One value per face corner.
    FaceVertex(FaceVertexValues),
}

impl ParameterValue {
    const CONSTANT_TAG: &'static str = "constant";
    const VERTEX_TAG: &'static str = "vertex";
    const FACE_VERTEX_TAG: &'static str = "face-vertex";

    /// Interpolates the value at barycentric `(u, v, w)` of triangle `face`
    /// whose corners are the mesh vertices `vertices`.
    #[inline]
    pub fn value_at(&self, face: usize, vertices: [usize; 3], u: f64, v: f64, w: f64) -> f64 {
        match self {
            Self::Constant(value) => *value,
            Self::Vertex(values) => {
                u * values[vertices[0]] + v * values[vertices[1]] + w * values[vertices[2]]
            }
            Self::FaceVertex(fv) => {
                let face = fv.face(face);
                u * face[0] + v * face[1] + w * face[2]
            }
        }
    }

    /// The value at one corner of a face.
    #[inline]
    pub fn corner_value(&self, face: usize, corner: usize, vertex: usize) -> f64 {
        match self {
            Self::Constant(value) => *value,
            Self::Vertex(values) => values[vertex],
            Self::FaceVertex(fv) => fv.value(face, corner),
        }
    }

    /// The average over the whole surface.
    pub fn average(&self) -> f64 {
        match self {
            Self::Constant(value) => *value,
            Self::Vertex(values) => mean(values),
            Self::FaceVertex(fv) => fv.average(),
        }
    }

    pub fn write(&self, out: &mut DataWriter<'_>) -> Result<(), PersistError> {
        match self {
            Self::Constant(value) => {
                out.write_utf(Self::CONSTANT_TAG)?;
                out.write_double(*value)
            }
            Self::Vertex(values) => {
                out.write_utf(Self::VERTEX_TAG)?;
                out.write_len(values.len())?;
                values.iter().try_for_each(|v| out.write_double(*v))
            }
            Self::FaceVertex(fv) => {
                out.write_utf(Self::FACE_VERTEX_TAG)?;
                out.write_int(-1)?;
                out.write_len(fv.values.len())?;
                fv.values.iter().try_for_each(|v| out.write_double(*v))?;
                out.write_len(fv.offsets.len())?;
                fv.offsets.iter().try_for_each(|&o| out.write_len(o))
            }
        }
    }

    pub fn read(input: &mut DataReader<'_>) -> Result<Self, PersistError> {
        let tag = input.read_utf()?;
        match tag.as_str() {
            Self::CONSTANT_TAG => Ok(Self::Constant(input.read_double()?)),
            Self::VERTEX_TAG => {
                let count = input.read_len("vertex parameter")?;
                Ok(Self::Vertex(input.read_doubles(count)?))
            }
            Self::FACE_VERTEX_TAG => Ok(Self::FaceVertex(read_face_vertex(input)?)),
            other => Err(PersistError::corrupt(
                "parameter value",
                format!("unknown kind `{other}`"),
            )),
        }
    }
}

const FACE_VERTEX_KIND: &str = "face-vertex parameter";

/// Reads a face-vertex body.
///
/// Legacy records start with a positive face count followed by exactly
/// three values per face. Current records start with `-1`, then the value
/// count, the values, the offset table length and the offsets.
fn read_face_vertex(input: &mut DataReader<'_>) -> Result<FaceVertexValues, PersistError> {
    let first = input.read_int()?;
    if first >= 0 {
        let faces = first as usize;
        let values = input.read_doubles(faces * 3)?;
        let offsets = (0..=faces).map(|f| f * 3).collect();
        return Ok(FaceVertexValues { values, offsets });
    }
    if first != -1 {
        return Err(PersistError::corrupt(
            FACE_VERTEX_KIND,
            format!("unknown format marker {first}"),
        ));
    }
    let count = input.read_len(FACE_VERTEX_KIND)?;
    let values = input.read_doubles(count)?;
    let offset_count = input.read_len(FACE_VERTEX_KIND)?;
    let offsets = (0..offset_count)
        .map(|_| input.read_len(FACE_VERTEX_KIND))
        .collect::<Result<Vec<_>, _>>()?;
    FaceVertexValues::from_parts(values, offsets)
        .map_err(|e| PersistError::corrupt(FACE_VERTEX_KIND, e.to_string()))
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
