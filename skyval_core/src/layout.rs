//! Seeded sticker layout for a bouquet.
//!
//! Every placement is a pure function of `(id, index, total)`: the per-item
//! generator is seeded from `fnv1a32("{id}:{index}")`, so re-rendering the same
//! selection reproduces the same organic arrangement. The first flower sits in
//! the middle and comes forward; the rest form an ellipse around it.
//! Overlap between stickers is intended.

use serde::{Deserialize, Serialize};

use crate::catalog::Flower;
use crate::rng::{Entropy, Mulberry32};

pub const CENTER_X: f64 = 50.0;
pub const CENTER_Y: f64 = 55.0;
pub const CENTER_SCALE: f64 = 1.08;
/// Max absolute jitter, in percentage points, on each axis.
pub const JITTER: f64 = 1.5;
/// Max absolute rotation, in degrees.
pub const MAX_ROTATION: f64 = 6.0;

const RING_SCALE_MIN: f64 = 0.92;
const RING_SCALE_SPAN: f64 = 0.12;
const RING_BASE_RADIUS: f64 = 12.0;
const RING_RADIUS_PER_ITEM: f64 = 1.2;
const RING_VERTICAL_SQUASH: f64 = 0.8;
const BASE_STACK: i32 = 10;
const CENTER_STACK_FLOOR: i32 = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub flower: Flower,
    pub index: usize,
    /// Percent of container width.
    pub center_x: f64,
    /// Percent of container height.
    pub center_y: f64,
    pub rotation: f64,
    pub scale: f64,
    pub stack_order: i32,
    pub is_center: bool,
}

/// Structural angle of a ring item before jitter, in degrees.
///
/// Returns `None` for the center item and for single-item selections.
pub fn ring_angle_degrees(index: usize, total: usize) -> Option<f64> {
    if total <= 1 || index == 0 {
        return None;
    }
    let step = 360.0 / (total - 1) as f64;
    Some(step * (index - 1) as f64)
}

/// Stack order the center item receives for a selection of `total` ids.
pub fn center_stack_order(total: usize) -> i32 {
    let top_ring = ring_stack_order(total.saturating_sub(1));
    CENTER_STACK_FLOOR.max(top_ring + 1)
}

fn ring_stack_order(index: usize) -> i32 {
    BASE_STACK + 2 * index as i32
}

/// Lay out `ids` in order. Unknown ids are dropped but still count towards
/// `total`, so known items keep the position they would have had.
pub fn place<S: AsRef<str>>(ids: &[S]) -> Vec<Placement> {
    let total = ids.len();
    ids.iter()
        .enumerate()
        .filter_map(|(index, id)| {
            let flower = Flower::parse(id.as_ref())?;
            Some(place_one(flower, index, total))
        })
        .collect()
}

/// Same as [`place`] for an already-resolved selection.
pub fn place_flowers(flowers: &[Flower]) -> Vec<Placement> {
    let total = flowers.len();
    flowers
        .iter()
        .enumerate()
        .map(|(index, &flower)| place_one(flower, index, total))
        .collect()
}

fn place_one(flower: Flower, index: usize, total: usize) -> Placement {
    let mut r = Mulberry32::from_key(&format!("{}:{}", flower.id(), index));

    let mut cx = CENTER_X;
    let mut cy = CENTER_Y;
    let mut scale = 1.0;
    let mut stack_order = BASE_STACK + index as i32;
    let mut is_center = false;

    if total > 1 {
        if index == 0 {
            scale = CENTER_SCALE;
            stack_order = center_stack_order(total);
            is_center = true;
        } else {
            let ring_count = total - 1;
            let angle = ring_angle_degrees(index, total).unwrap_or(0.0);
            let rad = angle.to_radians();
            let radius = RING_BASE_RADIUS + ring_count as f64 * RING_RADIUS_PER_ITEM;

            cx = CENTER_X + rad.cos() * radius;
            cy = CENTER_Y + rad.sin() * (radius * RING_VERTICAL_SQUASH);
            scale = RING_SCALE_MIN + r.next_f64() * RING_SCALE_SPAN;
            stack_order = ring_stack_order(index);
        }
    }

    cx += r.next_f64() * (2.0 * JITTER) - JITTER;
    cy += r.next_f64() * (2.0 * JITTER) - JITTER;
    let rotation = round2(r.next_f64() * (2.0 * MAX_ROTATION) - MAX_ROTATION);

    Placement {
        flower,
        index,
        center_x: cx,
        center_y: cy,
        rotation,
        scale,
        stack_order,
        is_center,
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Pixel edge of a sticker inside a container whose shorter side is `container_min_px`.
pub fn sticker_size(container_min_px: f64, is_center: bool) -> u32 {
    let base = container_min_px.max(1.0);
    let size = (base * 0.35).round().max(96.0);
    if is_center {
        (size * 1.06).round() as u32
    } else {
        size as u32
    }
}
