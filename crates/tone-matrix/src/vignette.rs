//! Radial vignette weights.
//!
//! A vignette is not a linear color transform: it is a black overlay whose
//! alpha grows from fully transparent at the image center to `intensity` at
//! the corners. Callers composite it after the color matrix.

/// Overlay alpha (0.0..=1.0) for the pixel at `(x, y)` in a `width × height`
/// image.
///
/// Distance is measured from the pixel center to the image center and
/// normalized by the center-to-corner distance, so the ramp is linear in
/// normalized radius.
pub fn vignette_alpha(x: u32, y: u32, width: u32, height: u32, intensity: f32) -> f32 {
    if intensity <= 0.0 || width == 0 || height == 0 {
        return 0.0;
    }
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    let dx = x as f32 + 0.5 - cx;
    let dy = y as f32 + 0.5 - cy;
    let radius = (cx * cx + cy * cy).sqrt();
    let t = ((dx * dx + dy * dy).sqrt() / radius).min(1.0);
    intensity.min(1.0) * t
}

/// Blend one RGBA pixel toward black by `alpha`, leaving its alpha channel.
#[inline]
pub fn darken_rgba(px: [u8; 4], alpha: f32) -> [u8; 4] {
    if alpha <= 0.0 {
        return px;
    }
    let keep = 1.0 - alpha.min(1.0);
    [
        (px[0] as f32 * keep).round() as u8,
        (px[1] as f32 * keep).round() as u8,
        (px[2] as f32 * keep).round() as u8,
        px[3],
    ]
}
