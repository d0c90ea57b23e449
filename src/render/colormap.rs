//! Colorization laws for score maps
//!
//! Three laws, one per map type:
//!
//! ```text
//! forgery      0 ─ blue ─ cyan ─ green ─ yellow ─ red ─ 1   (never black)
//! confidence   0.3 ─────── black → white ─────── 0.9        (contrast stretch)
//! noiseprint   0 ─────────── black → white ─────────── 1    (plain)
//! ```
//!
//! The forgery ramp has no black anywhere on [0, 1]; black is reserved for
//! pixels with no source cell.

/// Blue → cyan → green → yellow → red over four equal quartiles
pub fn smooth_colormap(value: f64) -> [f64; 3] {
    let v = value.clamp(0.0, 1.0);

    if v < 0.25 {
        let t = v * 4.0;
        [0.0, t, 1.0]
    } else if v < 0.5 {
        let t = (v - 0.25) * 4.0;
        [0.0, 1.0, 1.0 - t]
    } else if v < 0.75 {
        let t = (v - 0.5) * 4.0;
        [t, 1.0, 0.0]
    } else {
        let t = (v - 0.75) * 4.0;
        [1.0, 1.0 - t, 0.0]
    }
}

/// Grayscale intensity with [0.3, 0.9] stretched onto the full range
pub fn stretched_gray(value: f64) -> u8 {
    let v = value.clamp(0.0, 1.0);
    let enhanced = ((v - 0.3) / 0.6).clamp(0.0, 1.0);
    unit_to_byte(enhanced)
}

/// Grayscale intensity, no stretch
pub fn plain_gray(value: f64) -> u8 {
    unit_to_byte(value.clamp(0.0, 1.0))
}

/// [0, 1] → 0..=255, rounded
pub(crate) fn unit_to_byte(value: f64) -> u8 {
    (255.0 * value.clamp(0.0, 1.0)).round() as u8
}
