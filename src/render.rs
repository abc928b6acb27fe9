//! Stateless animation rendering.
//!
//! [`render`] maps a pattern, an animation phase and the battery level to a
//! full frame. The phase (`progress`) is a free-running 0-254 counter owned by
//! the caller, so the same inputs always produce the same frame. Brightness is
//! not applied here; the LED driver scales the whole frame.

use crate::battery::BatteryLevel;
use crate::colors::{self, OFF, Pixel};

/// Inclusive progress windows during which [`Pattern::Blink`] is lit.
///
/// Two short beats followed by a long pause, like a heartbeat.
pub const BLINK_WINDOWS: [(u8, u8); 2] = [(0, 29), (61, 89)];

/// Visual content of a mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pattern {
    /// All pixels dark.
    Off,

    /// Every pixel the same color.
    Solid(Pixel),

    /// Stripes mirrored around the ornament: the first half of the strip runs
    /// through the palette outward-in, the second half inward-out.
    Stripes(&'static [Pixel]),

    /// Hue wheel spread across the strip, rotating with progress.
    Rainbow,

    /// Solid color during [`BLINK_WINDOWS`], dark otherwise.
    Blink(Pixel),

    /// Battery gauge: pixels below the level lit, the next one flickering
    /// on even progress values when a fractional part remains.
    BatteryBar(Pixel),
}

/// Inputs that come from outside the mode table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderParams {
    pub battery: BatteryLevel,
}

/// Converts elapsed animation time to a progress value.
///
/// `ms_per_step` sets the speed; zero is treated as one.
#[inline]
pub fn progress_at(elapsed_ms: u64, ms_per_step: u32) -> u8 {
    ((elapsed_ms / ms_per_step.max(1) as u64) % 255) as u8
}

/// Renders one frame.
pub fn render<const N: usize>(
    pattern: &Pattern,
    progress: u8,
    params: &RenderParams,
) -> [Pixel; N] {
    let mut frame = [OFF; N];

    match *pattern {
        Pattern::Off => {}
        Pattern::Solid(color) => frame.fill(color),
        Pattern::Stripes(stripes) => {
            if stripes.is_empty() {
                return frame;
            }
            let half = N.div_ceil(2);
            for (index, pixel) in frame.iter_mut().enumerate() {
                let position = if index < half { index } else { N - 1 - index };
                *pixel = stripes[position * stripes.len() / half];
            }
        }
        Pattern::Rainbow => {
            for (index, pixel) in frame.iter_mut().enumerate() {
                let offset = (index * 255 / N) as u8;
                *pixel = colors::wheel(offset.wrapping_add(progress));
            }
        }
        Pattern::Blink(color) => {
            let lit = BLINK_WINDOWS
                .iter()
                .any(|&(start, end)| (start..=end).contains(&progress));
            if lit {
                frame.fill(color);
            }
        }
        Pattern::BatteryBar(color) => {
            let lit = (params.battery.lit as usize).min(N);
            frame[..lit].fill(color);
            if lit < N && params.battery.fraction > 0 && progress % 2 == 0 {
                frame[lit] = color;
            }
        }
    }

    frame
}
