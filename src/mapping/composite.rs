//! Front-to-back compositing of layered surface properties.
//!
//! Layers are walked top (index 0) to bottom. [`Coverage`] tracks how much
//! of each color channel and of the scalar properties is still uncovered;
//! every layer adds its properties weighted by what remains and then
//! consumes its share.

use super::{BlendMode, Layer, LayerSpan};
use crate::surface::{Rgb, SurfaceSpec};

/// Uncovered fraction of each color channel and of the scalar properties.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coverage {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub scalar: f64,
}

impl Default for Coverage {
    fn default() -> Self {
        Self::FULL
    }
}

impl Coverage {
    /// Nothing covered yet.
    pub const FULL: Self = Self {
        red: 1.0,
        green: 1.0,
        blue: 1.0,
        scalar: 1.0,
    };

    /// All three color channels are fully covered; deeper layers can no
    /// longer show through.
    pub fn is_covered(&self) -> bool {
        self.red <= 0.0 && self.green <= 0.0 && self.blue <= 0.0
    }

    /// Per-channel weights of a layer with blend fraction `fraction`, and the
    /// scalar weight it carries forward.
    fn weights(&self, layer_trans: Rgb, mode: BlendMode, fraction: f64) -> (Rgb, f64) {
        let f = fraction as f32;
        let mut w = Rgb::new(self.red * f, self.green * f, self.blue * f);
        match mode {
            BlendMode::Blend => (w, self.scalar * fraction),
            BlendMode::OverlayBlendBumps | BlendMode::OverlayAddBumps => {
                w = w.scaled(
                    1.0 - layer_trans.red,
                    1.0 - layer_trans.green,
                    1.0 - layer_trans.blue,
                );
                (w, f64::from(w.max_channel()))
            }
        }
    }

    fn consume(&mut self, w: Rgb, forward: f64, mode: BlendMode) {
        self.red -= w.red;
        self.green -= w.green;
        self.blue -= w.blue;
        if mode != BlendMode::OverlayAddBumps {
            self.scalar -= forward;
        }
    }

    /// Composites one layer's properties into `out`.
    pub fn blend_spec(&mut self, out: &mut SurfaceSpec, layer: &SurfaceSpec, mode: BlendMode, fraction: f64) {
        let (w, forward) = self.weights(layer.transparent, mode, fraction);
        let (r, g, b) = (w.red, w.green, w.blue);

        out.diffuse.add_scaled(layer.diffuse, r, g, b);
        out.specular.add_scaled(layer.specular, r, g, b);
        out.hilight.add_scaled(layer.hilight, r, g, b);
        out.emissive.add_scaled(layer.emissive, r, g, b);

        out.transparent -= match mode {
            BlendMode::Blend => w.scaled(
                1.0 - layer.transparent.red,
                1.0 - layer.transparent.green,
                1.0 - layer.transparent.blue,
            ),
            BlendMode::OverlayBlendBumps | BlendMode::OverlayAddBumps => w,
        };

        out.roughness += forward * layer.roughness;
        out.cloudiness += forward * layer.cloudiness;
        let bump_weight = match mode {
            BlendMode::OverlayAddBumps => fraction,
            BlendMode::Blend | BlendMode::OverlayBlendBumps => forward,
        };
        out.bump += layer.bump * bump_weight;

        self.consume(w, forward, mode);
    }

    /// Composites only the transparency of one layer.
    pub fn blend_transparency(&mut self, out: &mut Rgb, layer_trans: Rgb, mode: BlendMode, fraction: f64) {
        let (w, forward) = self.weights(layer_trans, mode, fraction);
        *out -= match mode {
            BlendMode::Blend => w.scaled(
                1.0 - layer_trans.red,
                1.0 - layer_trans.green,
                1.0 - layer_trans.blue,
            ),
            BlendMode::OverlayBlendBumps | BlendMode::OverlayAddBumps => w,
        };
        self.consume(w, forward, mode);
    }
}

fn fraction(params: &[f64], span: &LayerSpan) -> f64 {
    params
        .get(span.fraction)
        .copied()
        .unwrap_or(1.0)
        .clamp(0.0, 1.0)
}

/// Composites a layer stack. `eval` fills the spec of layer `i` given its
/// parameter sub-slice.
pub(crate) fn composite_spec(
    out: &mut SurfaceSpec,
    layers: &[Layer],
    spans: &[LayerSpan],
    params: &[f64],
    front: bool,
    mut eval: impl FnMut(usize, &mut SurfaceSpec, &[f64]),
) {
    out.clear();
    let mut coverage = Coverage::FULL;
    let mut layer_spec = SurfaceSpec::NONE;
    for (i, (layer, span)) in layers.iter().zip(spans).enumerate() {
        if !layer.mapping().applies_to_face(front) {
            continue;
        }
        let f = fraction(params, span);
        eval(i, &mut layer_spec, span.slice(params));
        coverage.blend_spec(out, &layer_spec, layer.mode(), f);
        if coverage.is_covered() {
            break;
        }
    }
}

/// The transparency-only form of [`composite_spec`].
pub(crate) fn composite_transparency(
    out: &mut Rgb,
    layers: &[Layer],
    spans: &[LayerSpan],
    params: &[f64],
    front: bool,
    mut eval: impl FnMut(usize, &mut Rgb, &[f64]),
) {
    *out = Rgb::WHITE;
    let mut coverage = Coverage::FULL;
    let mut layer_trans = Rgb::WHITE;
    for (i, (layer, span)) in layers.iter().zip(spans).enumerate() {
        if !layer.mapping().applies_to_face(front) {
            continue;
        }
        let f = fraction(params, span);
        eval(i, &mut layer_trans, span.slice(params));
        coverage.blend_transparency(out, layer_trans, layer.mode(), f);
        if coverage.is_covered() {
            break;
        }
    }
}

/// Accumulates displacement heights. `trans` is only consulted for
/// overlay-blend-bumps layers, whose weight shrinks by the remaining budget
/// times their opacity.
pub(crate) fn composite_displacement(
    layers: &[Layer],
    spans: &[LayerSpan],
    params: &[f64],
    mut displacement: impl FnMut(usize, &[f64]) -> f64,
    mut trans: impl FnMut(usize, &mut Rgb, &[f64]),
) -> f64 {
    let mut height = 0.0;
    let mut remaining = 1.0;
    let mut layer_trans = Rgb::WHITE;
    for (i, (layer, span)) in layers.iter().zip(spans).enumerate() {
        let sub = span.slice(params);
        let mut f = fraction(params, span) * remaining;
        if layer.mode() == BlendMode::OverlayBlendBumps {
            trans(i, &mut layer_trans, sub);
            f *= remaining * (1.0 - f64::from(layer_trans.min_channel()));
        }
        if layer.mode() != BlendMode::OverlayAddBumps {
            remaining -= f;
        }
        height += displacement(i, sub) * f;
        if remaining <= 0.0 {
            break;
        }
    }
    height
}
