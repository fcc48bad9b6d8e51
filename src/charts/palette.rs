//! Chart colors shared by the live plots and the exported images.

/// Series colors for companies.
pub const PALETTE: [[u8; 3]; 10] = [
    [99, 110, 250],  // Blue
    [239, 85, 59],   // Red
    [0, 204, 150],   // Green
    [171, 99, 250],  // Purple
    [255, 161, 90],  // Orange
    [25, 211, 243],  // Cyan
    [255, 102, 146], // Pink
    [182, 232, 128], // Lime
    [255, 151, 255], // Magenta
    [254, 203, 82],  // Yellow
];

/// Open, High, Low, Close: light to dark shades of one blue.
pub const PRICE_SHADES: [[u8; 3]; 4] = [
    [158, 202, 225],
    [107, 174, 214],
    [49, 130, 189],
    [8, 81, 156],
];

const VIRIDIS: [[u8; 3]; 5] = [
    [68, 1, 84],
    [59, 82, 139],
    [33, 145, 140],
    [94, 201, 98],
    [253, 231, 37],
];

pub fn series_color(index: usize) -> [u8; 3] {
    PALETTE[index % PALETTE.len()]
}

pub fn price_shade(index: usize) -> [u8; 3] {
    PRICE_SHADES[index % PRICE_SHADES.len()]
}

/// Continuous Viridis scale, `t` clamped to [0, 1].
pub fn viridis(t: f64) -> [u8; 3] {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (VIRIDIS.len() - 1) as f64;
    let lower = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    let frac = scaled - lower as f64;
    let (a, b) = (VIRIDIS[lower], VIRIDIS[lower + 1]);
    let mix = |i: usize| (a[i] as f64 + (b[i] as f64 - a[i] as f64) * frac).round() as u8;
    [mix(0), mix(1), mix(2)]
}

/// Viridis color for `value` within `[min, max]`.
pub fn viridis_for(value: f64, min: f64, max: f64) -> [u8; 3] {
    if max > min {
        viridis((value - min) / (max - min))
    } else {
        viridis(1.0)
    }
}
