//! Colors as understood by the renderer: literal RGB values, palette names, and
//! per-element coloring.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Converts unit-interval channels, truncating toward zero.
    pub fn from_unit(r: f64, g: f64, b: f64) -> Self {
        let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0) as u8;
        Self::new(channel(r), channel(g), channel(b))
    }

    /// Hexadecimal form accepted by the renderer, e.g. `0x0000ff`.
    pub fn to_hex(&self) -> String {
        format!("0x{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Standard HSV to RGB conversion with all components in `[0, 1]`.
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (v, v, v);
    }
    let h6 = (h.rem_euclid(1.0)) * 6.0;
    let sector = h6.floor();
    let f = h6 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match sector as u8 % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorValue {
    Rgb(Rgb),
    /// A renderer palette name such as `grey80` or `white`.
    Named(String),
    /// Standard per-element coloring.
    ByElement,
}

impl ColorValue {
    pub fn named(name: impl Into<String>) -> Self {
        ColorValue::Named(name.into())
    }
}

impl fmt::Display for ColorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorValue::Rgb(rgb) => f.write_str(&rgb.to_hex()),
            ColorValue::Named(name) => f.write_str(name),
            ColorValue::ByElement => f.write_str("atomic"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb_of_hue(h: f64) -> Rgb {
        let (r, g, b) = hsv_to_rgb(h, 1.0, 1.0);
        Rgb::from_unit(r, g, b)
    }

    #[test]
    fn primary_hues_map_to_primary_colors() {
        assert_eq!(rgb_of_hue(0.0), Rgb::new(255, 0, 0));
        assert_eq!(rgb_of_hue(1.0 / 3.0), Rgb::new(0, 255, 0));
        assert_eq!(rgb_of_hue(2.0 / 3.0), Rgb::new(0, 0, 255));
    }

    #[test]
    fn intermediate_hue_truncates_channels() {
        // Hue 1/12 lies halfway between red and yellow.
        assert_eq!(rgb_of_hue(1.0 / 12.0), Rgb::new(255, 127, 0));
    }

    #[test]
    fn zero_saturation_is_grey() {
        assert_eq!(hsv_to_rgb(0.4, 0.0, 0.5), (0.5, 0.5, 0.5));
    }

    #[test]
    fn colors_render_in_renderer_syntax() {
        assert_eq!(ColorValue::Rgb(Rgb::new(0, 0, 255)).to_string(), "0x0000ff");
        assert_eq!(ColorValue::named("grey80").to_string(), "grey80");
        assert_eq!(ColorValue::ByElement.to_string(), "atomic");
        assert_eq!(Rgb::new(255, 8, 0).to_string(), "#FF0800");
    }
}
