//! Orientation frames shared by the positional mapping kinds.

use std::f64::consts::{FRAC_PI_2, PI};
use std::sync::OnceLock;

use bevy::math::{DMat3, DVec2, DVec3, EulerRot};
use bevy::prelude::*;

use crate::mesh::BoundingBox;
use crate::param::{ParamKind, TextureParameter};
use crate::persist::{DataReader, DataWriter, PersistError};

/// A rotation given as angles in degrees about the x, y and z axes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Reflect)]
pub struct Orientation {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Orientation {
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn matrix(&self) -> DMat3 {
        DMat3::from_euler(
            EulerRot::YXZ,
            self.y.to_radians(),
            self.x.to_radians(),
            self.z.to_radians(),
        )
    }

    /// Orthonormal axes from the rotated view direction and up vector.
    pub fn basis(&self) -> Basis {
        let m = self.matrix();
        let z = m * DVec3::Z;
        let up = m * DVec3::Y;
        let x = up.cross(z).normalize();
        let y = z.cross(x);
        Basis { x, y, z }
    }

    pub(crate) fn read(input: &mut DataReader<'_>) -> Result<Self, PersistError> {
        Ok(Self::new(
            input.read_double()?,
            input.read_double()?,
            input.read_double()?,
        ))
    }

    pub(crate) fn write(&self, out: &mut DataWriter<'_>) -> Result<(), PersistError> {
        out.write_double(self.x)?;
        out.write_double(self.y)?;
        out.write_double(self.z)
    }
}

/// Three orthonormal axes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Basis {
    pub x: DVec3,
    pub y: DVec3,
    pub z: DVec3,
}

impl Basis {
    pub fn axes(&self) -> [DVec3; 3] {
        [self.x, self.y, self.z]
    }
}

/// An affine map from world space to texture space: one scaled axis per
/// texture coordinate, minus an offset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct LinearFrame {
    pub axes: [DVec3; 3],
    pub offset: DVec3,
}

impl LinearFrame {
    /// Scales each basis axis and, when `fit_to` is given, stretches it so
    /// the box spans `[0, 1 / scale]` along it. Axes along which the box has
    /// no extent are left unfitted.
    pub fn new(basis: &Basis, scale: DVec3, center: DVec3, fit_to: Option<&BoundingBox>) -> Self {
        let mut axes = [DVec3::ZERO; 3];
        let mut offset = center;
        for (i, axis) in basis.axes().into_iter().enumerate() {
            axes[i] = axis / scale[i];
            if let Some(bounds) = fit_to {
                let (lo, hi) = extent(axis, bounds);
                let len = hi - lo;
                if len > 0.0 {
                    let k = 1.0 / (len * scale[i]);
                    axes[i] = axis * k;
                    offset[i] += lo * k;
                }
            }
        }
        Self { axes, offset }
    }

    pub fn is_identity(&self) -> bool {
        self.axes == [DVec3::X, DVec3::Y, DVec3::Z] && self.offset == DVec3::ZERO
    }

    pub fn apply(&self, p: DVec3) -> DVec3 {
        DVec3::new(self.axes[0].dot(p), self.axes[1].dot(p), self.axes[2].dot(p)) - self.offset
    }

    /// Footprint along each texture axis for a world-space footprint `size`.
    pub fn footprint(&self, size: f64) -> DVec3 {
        DVec3::new(
            size * self.axes[0].length(),
            size * self.axes[1].length(),
            size * self.axes[2].length(),
        )
    }

    /// Re-expresses a texture-space gradient in world space.
    pub fn gradient_to_world(&self, g: DVec3) -> DVec3 {
        self.axes[0] * g.x + self.axes[1] * g.y + self.axes[2] * g.z
    }
}

/// The object-local frame of the angular (spherical, cylindrical) mappings.
///
/// `scale` is in degrees of azimuth per texture unit along `u`; `offset`
/// is subtracted after scaling.
#[derive(Clone, Debug)]
pub(crate) struct AngularFrame {
    pub orientation: Orientation,
    pub rotation: DMat3,
    pub center: DVec3,
    pub scale: DVec2,
    pub offset: DVec2,
    pub bind_to_surface: bool,
    coord_params: OnceLock<[TextureParameter; 3]>,
}

impl AngularFrame {
    pub fn new(center: DVec3, scale: DVec2) -> Self {
        Self {
            orientation: Orientation::IDENTITY,
            rotation: DMat3::IDENTITY,
            center,
            scale,
            offset: DVec2::ZERO,
            bind_to_surface: false,
            coord_params: OnceLock::new(),
        }
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
        self.rotation = orientation.matrix();
    }

    pub fn to_local(&self, p: DVec3) -> DVec3 {
        self.rotation.transpose() * (p - self.center)
    }

    /// Re-expresses a local-space gradient in world space.
    pub fn gradient_to_world(&self, g: DVec3) -> DVec3 {
        self.rotation * g
    }

    pub fn coord_params(&self) -> &[TextureParameter; 3] {
        self.coord_params.get_or_init(|| {
            [
                TextureParameter::coordinate("X", ParamKind::XCoordinate),
                TextureParameter::coordinate("Y", ParamKind::YCoordinate),
                TextureParameter::coordinate("Z", ParamKind::ZCoordinate),
            ]
        })
    }

    pub fn read(input: &mut DataReader<'_>) -> Result<Self, PersistError> {
        let orientation = Orientation::read(input)?;
        let center = DVec3::new(input.read_double()?, input.read_double()?, input.read_double()?);
        let scale = DVec2::new(input.read_double()?, input.read_double()?);
        let mut frame = Self::new(center, scale);
        frame.set_orientation(orientation);
        frame.offset = DVec2::new(input.read_double()?, input.read_double()?);
        frame.bind_to_surface = input.read_bool()?;
        Ok(frame)
    }

    pub fn write(&self, out: &mut DataWriter<'_>) -> Result<(), PersistError> {
        self.orientation.write(out)?;
        for v in self.center.to_array() {
            out.write_double(v)?;
        }
        out.write_double(self.scale.x)?;
        out.write_double(self.scale.y)?;
        out.write_double(self.offset.x)?;
        out.write_double(self.offset.y)?;
        out.write_bool(self.bind_to_surface)
    }
}

/// Range of `axis · p` over the corners of `bounds`.
pub(crate) fn extent(axis: DVec3, bounds: &BoundingBox) -> (f64, f64) {
    bounds
        .corners()
        .iter()
        .map(|c| axis.dot(*c))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), d| {
            (lo.min(d), hi.max(d))
        })
}

/// Angle of `(x, z)` about the y axis, in `[-π/2, 3π/2)`.
///
/// On the axis itself the limiting angle is taken from the sign of `z`.
pub(crate) fn azimuth(x: f64, z: f64) -> f64 {
    if x == 0.0 {
        if z < 0.0 { -FRAC_PI_2 } else { FRAC_PI_2 }
    } else if x < 0.0 {
        (z / x).atan() + PI
    } else {
        (z / x).atan()
    }
}

/// Gradient of [`azimuth`] with respect to a local point, or zero on the axis.
pub(crate) fn azimuth_gradient(q: DVec3) -> DVec3 {
    let r2 = q.x * q.x + q.z * q.z;
    if r2 < 1e-12 {
        return DVec3::ZERO;
    }
    DVec3::new(-q.z, 0.0, q.x) / r2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_basis() {
        let b = Orientation::IDENTITY.basis();
        assert!(b.x.abs_diff_eq(DVec3::X, 1e-12));
        assert!(b.y.abs_diff_eq(DVec3::Y, 1e-12));
        assert!(b.z.abs_diff_eq(DVec3::Z, 1e-12));
    }

    #[test]
    fn test_rotated_basis_is_orthonormal() {
        let b = Orientation::new(30.0, -45.0, 10.0).basis();
        for axis in b.axes() {
            assert!((axis.length() - 1.0).abs() < 1e-12);
        }
        assert!(b.x.dot(b.y).abs() < 1e-12);
        assert!(b.y.dot(b.z).abs() < 1e-12);
        assert!(b.x.cross(b.y).abs_diff_eq(b.z, 1e-12));
    }

    #[test]
    fn test_quarter_turn_about_y() {
        let b = Orientation::new(0.0, 90.0, 0.0).basis();
        assert!(b.z.abs_diff_eq(DVec3::X, 1e-12));
        assert!(b.x.abs_diff_eq(-DVec3::Z, 1e-12));
    }

    #[test]
    fn test_azimuth() {
        assert!((azimuth(0.0, 1.0) - FRAC_PI_2).abs() < 1e-12);
        assert!((azimuth(0.0, -1.0) + FRAC_PI_2).abs() < 1e-12);
        assert!(azimuth(1.0, 0.0).abs() < 1e-12);
        assert!((azimuth(-1.0, 0.0) - PI).abs() < 1e-12);
        assert!((azimuth(1.0, 1.0) - PI / 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_linear_frame_fit() {
        let bounds = BoundingBox::new(DVec3::new(-1.0, 0.0, 2.0), DVec3::new(3.0, 2.0, 2.0));
        let basis = Orientation::IDENTITY.basis();
        let frame = LinearFrame::new(&basis, DVec3::new(1.0, 2.0, 1.0), DVec3::ZERO, Some(&bounds));
        let lo = frame.apply(bounds.min);
        let hi = frame.apply(bounds.max);
        assert!(lo.truncate().abs_diff_eq(bevy::math::DVec2::ZERO, 1e-12));
        assert!((hi.x - 1.0).abs() < 1e-12);
        assert!((hi.y - 0.5).abs() < 1e-12);
        // zero extent along z: unfitted
        assert!((hi.z - 2.0).abs() < 1e-12);
        assert!(!frame.is_identity());

        let plain = LinearFrame::new(&basis, DVec3::ONE, DVec3::ZERO, None);
        assert!(plain.is_identity());
        assert_eq!(plain.apply(DVec3::new(1.0, 2.0, 3.0)), DVec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_extent() {
        let bounds = BoundingBox::new(DVec3::new(-1.0, 0.0, 0.0), DVec3::new(3.0, 2.0, 1.0));
        assert_eq!(extent(DVec3::X, &bounds), (-1.0, 3.0));
        assert_eq!(extent(DVec3::Y * 2.0, &bounds), (0.0, 4.0));
    }
}
