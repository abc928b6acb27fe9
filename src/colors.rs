//! Pixel type, named colors and flag palettes.
//!
//! Pixels are 8-bit sRGB, the native format of WS2812-style strips. HSV
//! helpers go through `palette` in floating point and quantize at the end.

use palette::{FromColor, Hsv, Srgb};

/// One LED's color.
pub type Pixel = Srgb<u8>;

pub const OFF: Pixel = Srgb::new(0x00, 0x00, 0x00);
pub const WHITE: Pixel = Srgb::new(0xff, 0xff, 0xff);
pub const RED: Pixel = Srgb::new(0xff, 0x00, 0x00);
pub const GREEN: Pixel = Srgb::new(0x00, 0x80, 0x00);
pub const BLUE: Pixel = Srgb::new(0x00, 0x00, 0xff);
pub const YELLOW: Pixel = Srgb::new(0xff, 0xff, 0x00);
pub const DARK_GRAY: Pixel = Srgb::new(0xa9, 0xa9, 0xa9);
pub const ORANGE: Pixel = Srgb::new(0xff, 0x33, 0x00);
pub const PINK: Pixel = Srgb::new(0xff, 0x10, 0x10);
pub const PURPLE: Pixel = Srgb::new(0x66, 0x00, 0xff);
pub const TRANS_BLUE: Pixel = Srgb::new(0x00, 0x0a, 0xff);
pub const TRANS_PINK: Pixel = Srgb::new(0xff, 0x0a, 0x82);
pub const BATTERY_GREEN: Pixel = Srgb::new(0x00, 0xff, 0x00);

/// Stripe palettes, listed from the outer edge of the ornament inward.
pub mod flags {
    use super::*;

    pub const TRANS: [Pixel; 5] = [TRANS_BLUE, TRANS_PINK, WHITE, TRANS_PINK, TRANS_BLUE];
    pub const GENDERQUEER: [Pixel; 5] = [GREEN, WHITE, PURPLE, PURPLE, PURPLE];
    pub const LGBT: [Pixel; 6] = [RED, ORANGE, YELLOW, GREEN, BLUE, PURPLE];
    pub const NONBINARY: [Pixel; 5] = [DARK_GRAY, OFF, PURPLE, WHITE, YELLOW];
}

/// Creates a pixel from HSV components (hue in degrees, saturation and value in 0.0-1.0).
#[inline]
pub fn hsv(hue: f32, saturation: f32, value: f32) -> Pixel {
    let rgb: Srgb<f32> = Srgb::from_color(Hsv::new(hue, saturation, value));
    rgb.into_format()
}

/// Creates a fully saturated pixel from a 0-255 color-wheel position.
///
/// 256 steps cover the full wheel, so 0 and 255 are adjacent reds.
#[inline]
pub fn wheel(position: u8) -> Pixel {
    hsv(position as f32 * (360.0 / 256.0), 1.0, 1.0)
}
