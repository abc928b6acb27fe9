//! Battery level quantization and charge detection.
//!
//! The supply voltage is sampled in short bursts with the sampling peripheral
//! powered only for the duration of the burst. Readings are mapped onto the
//! LED count through a [`LevelCurve`] and clamped, so a garbage ADC result can
//! never produce a level outside `0..=leds`.
//!
//! Charging is detected through a pluggable [`ChargeDetect`] strategy: older
//! boards infer it from a jump in supply voltage, newer ones read a dedicated
//! charger status pin.

use crate::time::{Interval, TimeInstant};
use embedded_hal::digital::v2::InputPin;

/// Trait for abstracting the supply-voltage sampler.
///
/// Reads incur a fixed settling delay inside the implementation.
pub trait VoltageSampler {
    /// Powers up the sampling peripheral.
    fn enable(&mut self);

    /// Powers down the sampling peripheral.
    fn disable(&mut self);

    /// Reads the supply voltage in millivolts.
    fn read_millivolts(&mut self) -> u16;
}

/// Quantized battery level.
///
/// `lit` is the number of fully lit pixels in `0..=leds`; `fraction` is the
/// sub-pixel remainder scaled to `0..=255` and is always zero when full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatteryLevel {
    pub lit: u8,
    pub fraction: u8,
}

impl BatteryLevel {
    /// Creates a level with no fractional part.
    pub const fn whole(lit: u8) -> Self {
        Self { lit, fraction: 0 }
    }

    /// Level assumed before the first sample.
    pub const fn midpoint(leds: u8) -> Self {
        Self::whole(leds / 2)
    }

    /// Builds a level from a 0-1000 charge estimate.
    pub fn from_permille(permille: u16, leds: u8) -> Self {
        let permille = permille.min(1000) as u32;
        let scaled = permille * leds as u32;
        let lit = (scaled / 1000) as u8;
        if lit >= leds {
            return Self::whole(leds);
        }

        let fraction = ((scaled % 1000) * 256 / 1000) as u8;
        Self { lit, fraction }
    }
}

/// Single-cell Li-ion discharge curve, millivolts to percent.
pub const LIPO_CURVE: [(u16, u8); 10] = [
    (3300, 0),
    (3500, 5),
    (3600, 10),
    (3700, 30),
    (3750, 50),
    (3800, 60),
    (3900, 75),
    (4000, 85),
    (4100, 95),
    (4200, 100),
];

/// Mapping from supply voltage to charge estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelCurve {
    /// Straight line between an empty and a full voltage.
    Linear { empty_mv: u16, full_mv: u16 },

    /// Piecewise-linear `(millivolts, percent)` points in ascending voltage order.
    Curved(&'static [(u16, u8)]),
}

impl LevelCurve {
    /// Estimates charge in permille, clamped to `0..=1000`.
    pub fn permille(&self, millivolts: u16) -> u16 {
        match *self {
            LevelCurve::Linear { empty_mv, full_mv } => {
                if full_mv <= empty_mv {
                    return if millivolts >= full_mv { 1000 } else { 0 };
                }
                if millivolts <= empty_mv {
                    return 0;
                }
                let above = (millivolts.min(full_mv) - empty_mv) as u32;
                (above * 1000 / (full_mv - empty_mv) as u32) as u16
            }
            LevelCurve::Curved(points) => curve_permille(points, millivolts),
        }
    }

    /// Quantizes a reading onto `leds` pixels.
    pub fn level(&self, millivolts: u16, leds: u8) -> BatteryLevel {
        BatteryLevel::from_permille(self.permille(millivolts), leds)
    }
}

fn curve_permille(points: &[(u16, u8)], millivolts: u16) -> u16 {
    let percent_permille = |percent: u8| percent.min(100) as u16 * 10;

    let Some(&(first_mv, first_pct)) = points.first() else {
        return 0;
    };
    if millivolts <= first_mv {
        return percent_permille(first_pct);
    }

    for pair in points.windows(2) {
        let (low_mv, low_pct) = pair[0];
        let (high_mv, high_pct) = pair[1];
        if millivolts <= high_mv {
            if high_mv <= low_mv {
                return percent_permille(high_pct);
            }
            let low = percent_permille(low_pct) as i32;
            let high = percent_permille(high_pct) as i32;
            let span = (high_mv - low_mv) as i32;
            let offset = (millivolts - low_mv) as i32;
            return (low + (high - low) * offset / span).clamp(0, 1000) as u16;
        }
    }

    points
        .last()
        .map_or(0, |&(_, last_pct)| percent_permille(last_pct))
}

/// Strategy for deciding whether the battery is charging.
pub trait ChargeDetect {
    /// Called once per sample with the averaged reading.
    fn is_charging(&mut self, millivolts: u16) -> bool;
}

/// Infers charging from a sudden rise in supply voltage.
///
/// A rise of at least `jump_mv` between consecutive samples latches
/// "charging"; a fall of the same size releases it.
#[derive(Debug, Clone, Copy)]
pub struct VoltageJump {
    jump_mv: u16,
    previous: Option<u16>,
    charging: bool,
}

impl VoltageJump {
    pub const fn new(jump_mv: u16) -> Self {
        Self {
            jump_mv,
            previous: None,
            charging: false,
        }
    }
}

impl ChargeDetect for VoltageJump {
    fn is_charging(&mut self, millivolts: u16) -> bool {
        if let Some(previous) = self.previous {
            if millivolts >= previous.saturating_add(self.jump_mv) {
                self.charging = true;
            } else if millivolts.saturating_add(self.jump_mv) <= previous {
                self.charging = false;
            }
        }
        self.previous = Some(millivolts);
        self.charging
    }
}

/// Reads a charger status pin.
pub struct ChargePin<P> {
    pin: P,
    active_low: bool,
}

impl<P: InputPin> ChargePin<P> {
    /// Creates a detector; `active_low` for open-drain charger status outputs.
    pub fn new(pin: P, active_low: bool) -> Self {
        Self { pin, active_low }
    }
}

impl<P: InputPin> ChargeDetect for ChargePin<P> {
    fn is_charging(&mut self, _millivolts: u16) -> bool {
        // A pin read error counts as "not charging".
        let asserted = if self.active_low {
            self.pin.is_low()
        } else {
            self.pin.is_high()
        };
        asserted.unwrap_or(false)
    }
}

/// For boards without any charge sensing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoChargeDetect;

impl ChargeDetect for NoChargeDetect {
    fn is_charging(&mut self, _millivolts: u16) -> bool {
        false
    }
}

/// Charging transitions reported by [`BatteryMonitor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BatteryEvent {
    /// Not charging on the previous sample, charging on this one.
    ChargeStarted,

    /// Charging on the previous sample, not charging on this one.
    ChargeStopped,
}

/// Samples the battery at a fixed rate and tracks level and charge state.
pub struct BatteryMonitor<S, C, I> {
    sampler: S,
    detector: C,
    curve: LevelCurve,
    leds: u8,
    interval: Interval<I>,
    level: BatteryLevel,
    millivolts: Option<u16>,
    charging: bool,
}

impl<S, C, I> BatteryMonitor<S, C, I>
where
    S: VoltageSampler,
    C: ChargeDetect,
    I: TimeInstant,
{
    /// Number of reads averaged per sample.
    pub const BURST: u8 = 4;

    /// Creates a monitor; the first [`poll`](Self::poll) samples immediately.
    ///
    /// The sampler is left disabled between bursts.
    pub fn new(mut sampler: S, detector: C, curve: LevelCurve, leds: u8, period_ms: u64) -> Self {
        sampler.disable();
        Self {
            sampler,
            detector,
            curve,
            leds,
            interval: Interval::new(period_ms),
            level: BatteryLevel::midpoint(leds),
            millivolts: None,
            charging: false,
        }
    }

    /// Samples if the sampling period has elapsed.
    pub fn poll(&mut self, now: I) -> Option<BatteryEvent> {
        if self.interval.due(now) {
            self.sample()
        } else {
            None
        }
    }

    /// Takes a sample now, regardless of the sampling period.
    pub fn sample(&mut self) -> Option<BatteryEvent> {
        self.sampler.enable();
        let mut total: u32 = 0;
        for _ in 0..Self::BURST {
            total += self.sampler.read_millivolts() as u32;
        }
        self.sampler.disable();

        let millivolts = (total / Self::BURST as u32) as u16;
        self.millivolts = Some(millivolts);
        self.level = self.curve.level(millivolts, self.leds);

        let charging = self.detector.is_charging(millivolts);
        let event = match (self.charging, charging) {
            (false, true) => Some(BatteryEvent::ChargeStarted),
            (true, false) => Some(BatteryEvent::ChargeStopped),
            _ => None,
        };
        self.charging = charging;

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "battery: {} mV, level {}/{}, charging {}",
            millivolts,
            self.level.lit,
            self.leds,
            charging
        );

        event
    }

    /// Returns the most recent level.
    pub fn level(&self) -> BatteryLevel {
        self.level
    }

    /// Returns the most recent averaged reading, if any.
    pub fn millivolts(&self) -> Option<u16> {
        self.millivolts
    }

    /// Returns true if the last sample reported charging.
    pub fn is_charging(&self) -> bool {
        self.charging
    }

    /// Returns the sampler.
    pub fn sampler(&self) -> &S {
        &self.sampler
    }
}
