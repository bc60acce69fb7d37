//! Pure calculation functions for image dimensions and placement.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::Anchor;

/// A rectangle placed on a canvas: size plus top-left offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub width: u32,
    pub height: u32,
    pub x: i64,
    pub y: i64,
}

/// Scale a ratio-derived edge, never collapsing to zero.
fn scaled_edge(value: f64) -> u32 {
    (value.round() as u32).max(1)
}

/// Resolve output dimensions when one side is left automatic.
///
/// The set dimension is honored exactly and the other is derived from the
/// source aspect ratio. Returns `None` when neither dimension is set.
///
/// # Examples
/// ```
/// # use image_variants::imaging::calculate_auto_dimensions;
/// // 800x600 with width 200 → 200x150
/// assert_eq!(calculate_auto_dimensions((800, 600), Some(200), None), Some((200, 150)));
///
/// // 800x600 with height 300 → 400x300
/// assert_eq!(calculate_auto_dimensions((800, 600), None, Some(300)), Some((400, 300)));
/// ```
pub fn calculate_auto_dimensions(
    source: (u32, u32),
    width: Option<u32>,
    height: Option<u32>,
) -> Option<(u32, u32)> {
    let (src_w, src_h) = source;
    match (width, height) {
        (Some(w), Some(h)) => Some((w, h)),
        (Some(w), None) => Some((w, scaled_edge(w as f64 * src_h as f64 / src_w as f64))),
        (None, Some(h)) => Some((scaled_edge(h as f64 * src_w as f64 / src_h as f64), h)),
        (None, None) => None,
    }
}

/// Calculate dimensions needed to fill a target area (resize before crop).
///
/// Returns dimensions that completely cover the target area while maintaining
/// the source aspect ratio. One dimension will match exactly, the other may exceed.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `target` - Target area dimensions (width, height)
///
/// # Returns
/// * `(width, height)` - Fill dimensions (at least one matches target)
pub fn calculate_fill_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let src_aspect = src_w as f64 / src_h as f64;
    let tgt_aspect = tgt_w as f64 / tgt_h as f64;

    if src_aspect > tgt_aspect {
        // Source is wider: height will match, width will exceed
        let h = tgt_h;
        let w = scaled_edge(h as f64 * src_aspect).max(tgt_w);
        (w, h)
    } else {
        // Source is taller: width will match, height will exceed
        let w = tgt_w;
        let h = scaled_edge(w as f64 / src_aspect).max(tgt_h);
        (w, h)
    }
}

/// Top-left corner of a centered `target` window inside a `fill` area.
pub fn calculate_center_crop(fill: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    (
        fill.0.saturating_sub(target.0) / 2,
        fill.1.saturating_sub(target.1) / 2,
    )
}

/// Place a source image inside a canvas without cropping (letterbox).
///
/// The source is scaled so it touches the canvas height when it is narrower
/// than the canvas, and the canvas width otherwise, then centered.
pub fn calculate_letterbox(source: (u32, u32), canvas: (u32, u32)) -> Placement {
    let (src_w, src_h) = source;
    let (can_w, can_h) = canvas;

    let src_aspect = src_w as f64 / src_h as f64;
    let can_aspect = can_w as f64 / can_h as f64;

    let (width, height) = if src_aspect < can_aspect {
        (scaled_edge(can_h as f64 * src_aspect).min(can_w), can_h)
    } else {
        (can_w, scaled_edge(can_w as f64 / src_aspect).min(can_h))
    };

    Placement {
        width,
        height,
        x: ((can_w - width) / 2) as i64,
        y: ((can_h - height) / 2) as i64,
    }
}

/// Top-left position of an overlay anchored on a canvas.
///
/// Offsets move the overlay inward from the anchored edge; on a centered
/// axis they are added to the centered position.
pub fn calculate_anchor_position(
    canvas: (u32, u32),
    overlay: (u32, u32),
    anchor: Anchor,
    offset: (i32, i32),
) -> (i64, i64) {
    let free_x = canvas.0 as i64 - overlay.0 as i64;
    let free_y = canvas.1 as i64 - overlay.1 as i64;
    let (off_x, off_y) = (offset.0 as i64, offset.1 as i64);

    let x = match anchor {
        Anchor::TopLeft | Anchor::Left | Anchor::BottomLeft => off_x,
        Anchor::Top | Anchor::Center | Anchor::Bottom => free_x / 2 + off_x,
        Anchor::TopRight | Anchor::Right | Anchor::BottomRight => free_x - off_x,
    };
    let y = match anchor {
        Anchor::TopLeft | Anchor::Top | Anchor::TopRight => off_y,
        Anchor::Left | Anchor::Center | Anchor::Right => free_y / 2 + off_y,
        Anchor::BottomLeft | Anchor::Bottom | Anchor::BottomRight => free_y - off_y,
    };
    (x, y)
}
