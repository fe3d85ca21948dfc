//! Evaluated surface properties at a single point.

use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use bevy::math::DVec3;
use bevy::prelude::*;

/// A linear RGB triplet. Channels are unbounded but conventionally 0-1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Reflect)]
pub struct Rgb {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    #[inline]
    pub const fn new(red: f32, green: f32, blue: f32) -> Self {
        Self { red, green, blue }
    }

    #[inline]
    pub const fn splat(value: f32) -> Self {
        Self::new(value, value, value)
    }

    /// Scales each channel by its own factor.
    #[inline]
    pub fn scaled(self, red: f32, green: f32, blue: f32) -> Self {
        Self::new(self.red * red, self.green * green, self.blue * blue)
    }

    /// Channel-wise multiply-accumulate: `self += other * (red, green, blue)`.
    #[inline]
    pub fn add_scaled(&mut self, other: Self, red: f32, green: f32, blue: f32) {
        self.red += other.red * red;
        self.green += other.green * green;
        self.blue += other.blue * blue;
    }

    #[inline]
    pub fn min_channel(self) -> f32 {
        self.red.min(self.green).min(self.blue)
    }

    #[inline]
    pub fn max_channel(self) -> f32 {
        self.red.max(self.green).max(self.blue)
    }

    /// Mean of the three channels.
    #[inline]
    pub fn average(self) -> f32 {
        (self.red + self.green + self.blue) / 3.0
    }

    pub fn abs_diff_eq(self, other: Self, epsilon: f32) -> bool {
        (self.red - other.red).abs() <= epsilon
            && (self.green - other.green).abs() <= epsilon
            && (self.blue - other.blue).abs() <= epsilon
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.red, self.green, self.blue]
    }
}

impl Add for Rgb {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.red + rhs.red, self.green + rhs.green, self.blue + rhs.blue)
    }
}

impl AddAssign for Rgb {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Rgb {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.red - rhs.red, self.green - rhs.green, self.blue - rhs.blue)
    }
}

impl SubAssign for Rgb {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul<f32> for Rgb {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.red * rhs, self.green * rhs, self.blue * rhs)
    }
}

impl From<[f32; 3]> for Rgb {
    fn from([red, green, blue]: [f32; 3]) -> Self {
        Self::new(red, green, blue)
    }
}

/// Texture components a [`Texture`](crate::texture::Texture) may contribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Component {
    Diffuse,
    Specular,
    Transparent,
    Hilight,
    Emissive,
    Bump,
    Displacement,
}

/// Material properties at one surface point.
///
/// This is an accumulator: callers own an instance and pass it by reference
/// into evaluation calls, typically reusing one per worker thread.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct SurfaceSpec {
    pub diffuse: Rgb,
    pub specular: Rgb,
    pub transparent: Rgb,
    pub emissive: Rgb,
    pub hilight: Rgb,
    /// In `[0, 1]`.
    pub roughness: f64,
    /// In `[0, 1]`.
    pub cloudiness: f64,
    /// Gradient of the height field, in whatever frame the producer works in.
    pub bump: DVec3,
}

impl Default for SurfaceSpec {
    fn default() -> Self {
        Self::NONE
    }
}

impl SurfaceSpec {
    /// The "no contribution" spec: black, fully transparent, flat.
    ///
    /// This is both the result of a face-rejected evaluation and the initial
    /// state of the layer compositing accumulator.
    pub const NONE: Self = Self {
        diffuse: Rgb::BLACK,
        specular: Rgb::BLACK,
        transparent: Rgb::WHITE,
        emissive: Rgb::BLACK,
        hilight: Rgb::BLACK,
        roughness: 0.0,
        cloudiness: 0.0,
        bump: DVec3::ZERO,
    };

    /// Resets to [`SurfaceSpec::NONE`].
    #[inline]
    pub fn clear(&mut self) {
        *self = Self::NONE;
    }

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }

    pub fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        let e = epsilon as f32;
        self.diffuse.abs_diff_eq(other.diffuse, e)
            && self.specular.abs_diff_eq(other.specular, e)
            && self.transparent.abs_diff_eq(other.transparent, e)
            && self.emissive.abs_diff_eq(other.emissive, e)
            && self.hilight.abs_diff_eq(other.hilight, e)
            && (self.roughness - other.roughness).abs() <= epsilon
            && (self.cloudiness - other.cloudiness).abs() <= epsilon
            && self.bump.abs_diff_eq(other.bump, epsilon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_spec() {
        let spec = SurfaceSpec::default();
        assert_eq!(spec.diffuse, Rgb::BLACK);
        assert_eq!(spec.transparent, Rgb::WHITE);
        assert_eq!(spec.bump, DVec3::ZERO);
        assert!(spec.is_none());
    }

    #[test]
    fn test_clear() {
        let mut spec = SurfaceSpec::default();
        spec.diffuse = Rgb::new(1.0, 0.5, 0.25);
        spec.roughness = 0.7;
        assert!(!spec.is_none());
        spec.clear();
        assert!(spec.is_none());
    }

    #[test]
    fn test_add_scaled() {
        let mut c = Rgb::BLACK;
        c.add_scaled(Rgb::new(1.0, 1.0, 1.0), 0.5, 0.25, 0.0);
        assert_eq!(c, Rgb::new(0.5, 0.25, 0.0));
        c.add_scaled(Rgb::new(0.0, 2.0, 4.0), 1.0, 1.0, 0.5);
        assert_eq!(c, Rgb::new(0.5, 2.25, 2.0));
    }

    #[test]
    fn test_channel_extremes() {
        let c = Rgb::new(0.3, 0.9, 0.1);
        assert_eq!(c.min_channel(), 0.1);
        assert_eq!(c.max_channel(), 0.9);
    }
}
