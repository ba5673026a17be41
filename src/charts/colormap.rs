//! Diverging red-white-blue colormap: dry readings render red, humid ones blue.

use eframe::egui::Color32;

const RED_WHITE_BLUE: [[u8; 3]; 5] = [
    [103, 0, 31],
    [214, 96, 77],
    [247, 247, 247],
    [67, 147, 195],
    [5, 48, 97],
];

/// Maps `t` in `0.0..=1.0` onto the colormap. Values outside the interval are clamped.
pub fn red_white_blue(t: f64) -> Color32 {
    let t = if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) };
    let segments = (RED_WHITE_BLUE.len() - 1) as f64;
    let position = t * segments;
    let index = (position.floor() as usize).min(RED_WHITE_BLUE.len() - 2);
    let fraction = position - index as f64;

    let from = RED_WHITE_BLUE[index];
    let to = RED_WHITE_BLUE[index + 1];
    let channel = |i: usize| {
        let value = from[i] as f64 + (to[i] as f64 - from[i] as f64) * fraction;
        value.round() as u8
    };
    Color32::from_rgb(channel(0), channel(1), channel(2))
}
