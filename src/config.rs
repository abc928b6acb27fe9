//! Runtime configuration.
//!
//! [`Config::default`] reproduces the shipped firmware constants. Every field
//! is public so a board crate can adjust individual values; the combination
//! with a mode table is checked once by [`Config::validate`].

use crate::button::ButtonConfig;
use crate::modes::ModeTable;
use crate::types::{ConfigError, ModeId, ModeKind, PowerProfile, TimeoutClass};

/// Base and extended idle timeout for one [`TimeoutClass`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeoutPair {
    pub base_secs: u32,
    pub extended_secs: u32,
}

impl TimeoutPair {
    pub const fn new(base_secs: u32, extended_secs: u32) -> Self {
        Self {
            base_secs,
            extended_secs,
        }
    }

    /// Seconds for the given profile.
    #[inline]
    pub fn secs(&self, profile: PowerProfile) -> u32 {
        match profile {
            PowerProfile::Normal => self.base_secs,
            PowerProfile::Extended => self.extended_secs,
        }
    }
}

/// Idle timeout per mode family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeoutTable {
    pub torch: TimeoutPair,
    pub off: TimeoutPair,
    pub alert: TimeoutPair,
    pub default: TimeoutPair,
}

impl TimeoutTable {
    /// Torch 10/20 min, off 20 s, alert 45/90 min, everything else 5/45 min.
    pub const STANDARD: TimeoutTable = TimeoutTable {
        torch: TimeoutPair::new(10 * 60, 20 * 60),
        off: TimeoutPair::new(20, 20),
        alert: TimeoutPair::new(45 * 60, 90 * 60),
        default: TimeoutPair::new(5 * 60, 45 * 60),
    };

    /// Returns the pair for a class.
    pub fn pair(&self, class: TimeoutClass) -> TimeoutPair {
        match class {
            TimeoutClass::Torch => self.torch,
            TimeoutClass::Off => self.off,
            TimeoutClass::Alert => self.alert,
            TimeoutClass::Default => self.default,
        }
    }

    /// Idle timeout in milliseconds.
    pub fn millis(&self, class: TimeoutClass, profile: PowerProfile) -> u64 {
        self.pair(class).secs(profile) as u64 * 1000
    }
}

impl Default for TimeoutTable {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// What a short press does after the device sat idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShortPressPolicy {
    /// Always advance to the next mode.
    #[default]
    Cycle,

    /// If no interaction happened for longer than `grace_ms`, switch to the
    /// table's dark mode instead of advancing. Already dark: advance.
    OffAfterIdle { grace_ms: u32 },
}

/// Ornament configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub timeouts: TimeoutTable,
    pub short_press: ShortPressPolicy,

    /// Divisor for [`Brightness::Scaled`](crate::types::Brightness) in the extended profile.
    pub power_save_divisor: u8,

    /// Sleep only once the button has been released this long.
    pub sleep_release_gate_ms: Option<u32>,

    /// Battery levels at or below this force the battery gauge.
    pub low_battery_level: u8,
    pub low_battery_check_ms: u32,
    pub battery_sample_ms: u32,

    /// Holding the button this long previews the battery gauge.
    ///
    /// While a preview is possible (this is set and the table has a battery
    /// mode) the long-press profile toggle moves from the long-press instant
    /// to the release, and is skipped if the hold reached the preview.
    pub battery_preview_hold_ms: Option<u32>,

    pub button: ButtonConfig,

    /// Milliseconds per animation progress step.
    pub animation_step_ms: u32,

    /// Delay between frames of the charge-start animation.
    pub charge_animation_step_ms: u16,
}

impl Config {
    /// Shipped firmware values.
    pub const STANDARD: Config = Config {
        timeouts: TimeoutTable::STANDARD,
        short_press: ShortPressPolicy::Cycle,
        power_save_divisor: 10,
        sleep_release_gate_ms: Some(5_000),
        low_battery_level: 1,
        low_battery_check_ms: 3 * 60 * 1000,
        battery_sample_ms: 10_000,
        battery_preview_hold_ms: Some(3_000),
        button: ButtonConfig::STANDARD,
        animation_step_ms: 18,
        charge_animation_step_ms: 60,
    };

    /// Idle timeout of `id` in milliseconds.
    ///
    /// Ids outside the table get the short "off" timeout.
    pub fn timeout_ms<const M: usize>(
        &self,
        table: &ModeTable<M>,
        id: ModeId,
        profile: PowerProfile,
    ) -> u64 {
        let class = table.entry_or_fallback(id).timeout;
        self.timeouts.millis(class, profile)
    }

    /// Checks this configuration against a mode table.
    ///
    /// # Errors
    /// * `ExtendedShorterThanBase` - A class would sleep sooner in power-save
    /// * `ShortSpecialTimeout` - A special mode would sleep sooner than a
    ///   default normal mode under the same profile
    /// * `InvalidButtonTiming` - Zero long-press time or a sequence of fewer than two presses
    pub fn validate<const M: usize>(&self, table: &ModeTable<M>) -> Result<(), ConfigError> {
        for class in [
            TimeoutClass::Torch,
            TimeoutClass::Off,
            TimeoutClass::Alert,
            TimeoutClass::Default,
        ] {
            let pair = self.timeouts.pair(class);
            if pair.extended_secs < pair.base_secs {
                return Err(ConfigError::ExtendedShorterThanBase(class));
            }
        }

        for (id, entry) in table.iter() {
            if entry.kind != ModeKind::Special {
                continue;
            }
            for profile in [PowerProfile::Normal, PowerProfile::Extended] {
                let floor = self.timeouts.millis(TimeoutClass::Default, profile);
                if self.timeouts.millis(entry.timeout, profile) < floor {
                    return Err(ConfigError::ShortSpecialTimeout(id));
                }
            }
        }

        if self.button.long_press_ms == 0 || self.button.sequence_count < 2 {
            return Err(ConfigError::InvalidButtonTiming);
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::STANDARD
    }
}
