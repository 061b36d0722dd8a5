//! Ring Presentation State — layout and highlight state for both rings.
//!
//! Everything here is derived from the shift and the sequencer's highlight;
//! nothing is stored between renders.

use serde::Serialize;

use crate::cipher::{ALPHABET, DEGREES_PER_LETTER, Letter, Shift};
use crate::sequencer::Highlight;

/// Radius of the outer (ciphertext) ring, in rem.
pub const OUTER_RADIUS_REM: f64 = 12.0;
/// Radius of the inner (plaintext) ring, in rem.
pub const INNER_RADIUS_REM: f64 = 9.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RingKind {
    /// Ciphertext alphabet, rotated by the shift.
    Outer,
    /// Plaintext alphabet, fixed.
    Inner,
}

impl RingKind {
    pub fn radius_rem(self) -> f64 {
        match self {
            RingKind::Outer => OUTER_RADIUS_REM,
            RingKind::Inner => INNER_RADIUS_REM,
        }
    }
}

/// One letter slot on a ring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RingSlot {
    pub letter: char,
    pub index: usize,
    /// Slot angle, clockwise from 12 o'clock, before ring rotation.
    pub angle: f64,
    /// Slot centre relative to the ring centre, in rem (y grows downward).
    pub x: f64,
    pub y: f64,
    /// Rotation applied to the glyph so it reads upright once the ring
    /// itself is rotated.
    pub glyph_rotation: f64,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RingView {
    pub kind: RingKind,
    /// Ring rotation in degrees; renderers draw the ring at `-rotation`.
    pub rotation: f64,
    pub radius_rem: f64,
    pub slots: Vec<RingSlot>,
}

/// Outer-ring rotation for a shift.
pub fn outer_rotation(shift: Shift) -> f64 {
    shift.rotation_degrees()
}

/// Lay out one ring with `highlight` emphasized.
pub fn ring_view(kind: RingKind, rotation: f64, highlight: Option<Letter>) -> RingView {
    let radius = kind.radius_rem();
    let slots = ALPHABET
        .iter()
        .enumerate()
        .map(|(index, &letter)| {
            let angle = index as f64 * DEGREES_PER_LETTER;
            let rad = angle.to_radians();
            RingSlot {
                letter,
                index,
                angle,
                x: radius * rad.sin(),
                y: -radius * rad.cos(),
                glyph_rotation: rotation - angle,
                highlighted: highlight.is_some_and(|l| l.index() == index),
            }
        })
        .collect();

    RingView {
        kind,
        rotation,
        radius_rem: radius,
        slots,
    }
}

/// Both rings for the current shift and highlight: outer first, then inner.
pub fn ring_views(shift: Shift, highlight: Option<Highlight>) -> (RingView, RingView) {
    let outer = ring_view(
        RingKind::Outer,
        outer_rotation(shift),
        highlight.map(|h| h.cipher),
    );
    let inner = ring_view(RingKind::Inner, 0.0, highlight.map(|h| h.plain));
    (outer, inner)
}
