//! Mode, timeout and power-profile state machine.
//!
//! [`ModeMachine`] owns everything the ornament remembers between loop
//! iterations: the selected mode, the power profile and the time of the last
//! user interaction. All inputs are total: every method accepts any state and
//! any argument, and nothing is ever rejected at runtime.
//!
//! Only genuine user input ([`on_short_press`](ModeMachine::on_short_press),
//! [`on_long_press`](ModeMachine::on_long_press),
//! [`on_double_press`](ModeMachine::on_double_press),
//! [`on_hold_released`](ModeMachine::on_hold_released)) and waking from sleep
//! refresh the interaction clock. Automatic overrides (low battery, charge
//! start, battery preview) change what is shown but never postpone sleep.

use crate::battery::BatteryLevel;
use crate::config::{Config, ShortPressPolicy};
use crate::modes::{ModeEntry, ModeTable};
use crate::time::{TimeInstant, elapsed_millis};
use crate::types::{ConfigError, Directive, ModeId, PowerProfile};

/// Result of an idle check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SleepDecision {
    /// Keep running.
    Awake,

    /// Idle timeout expired and the button is released; power down.
    Sleep,
}

/// The ornament's mode/timeout/power state machine.
///
/// # Type Parameters
/// * `I` - Time instant type
/// * `M` - Mode table capacity
#[derive(Debug, Clone)]
pub struct ModeMachine<I, const M: usize> {
    table: ModeTable<M>,
    config: Config,
    mode: ModeId,
    profile: PowerProfile,
    last_interaction: I,
    battery_preview: bool,
}

impl<I: TimeInstant, const M: usize> ModeMachine<I, M> {
    /// Creates a machine in mode 0 with the normal profile.
    ///
    /// # Errors
    /// Any error from [`Config::validate`].
    pub fn new(table: ModeTable<M>, config: Config, now: I) -> Result<Self, ConfigError> {
        config.validate(&table)?;

        Ok(Self {
            table,
            config,
            mode: ModeId::FIRST,
            profile: PowerProfile::Normal,
            last_interaction: now,
            battery_preview: false,
        })
    }

    /// Records a user interaction.
    fn touch(&mut self, now: I) {
        self.last_interaction = now;
    }

    /// Short press: advance the mode, or go dark after a long idle when the
    /// [`ShortPressPolicy::OffAfterIdle`] policy is configured.
    pub fn on_short_press(&mut self, now: I) {
        let idle_ms = elapsed_millis(now, self.last_interaction);
        self.touch(now);

        if let ShortPressPolicy::OffAfterIdle { grace_ms } = self.config.short_press {
            if idle_ms > grace_ms as u64 {
                if let Some(off) = self.table.off_mode().filter(|&off| off != self.mode) {
                    self.set_mode(off);
                    return;
                }
            }
        }

        let next = self.table.next(self.mode);
        self.set_mode(next);
    }

    /// Long press: toggle the power profile. The mode is unchanged.
    pub fn on_long_press(&mut self, now: I) {
        self.touch(now);
        self.profile = self.profile.toggled();

        #[cfg(feature = "defmt")]
        defmt::info!("power profile: {}", self.profile);
    }

    /// Double press: a diagnostic reboot when built with `diagnostic-reboot`,
    /// otherwise only an interaction.
    pub fn on_double_press(&mut self, now: I) -> Directive {
        self.touch(now);

        if cfg!(feature = "diagnostic-reboot") {
            Directive::Reboot
        } else {
            Directive::Continue
        }
    }

    /// Periodic low-battery check. Forces the battery gauge when the level
    /// is at or below the configured threshold.
    ///
    /// Returns true if the mode was forced.
    pub fn on_battery_check(&mut self, level: BatteryLevel) -> bool {
        if level.lit > self.config.low_battery_level {
            return false;
        }

        #[cfg(feature = "defmt")]
        defmt::warn!("battery low: {}", level.lit);

        self.force_battery_mode()
    }

    /// Charger connected: show the battery gauge.
    ///
    /// The one-shot charge animation is played by the caller.
    pub fn on_charge_start(&mut self) -> bool {
        self.force_battery_mode()
    }

    /// Level-triggered battery preview, evaluated every tick.
    ///
    /// While `held` is true the battery gauge is displayed in place of the
    /// selected mode; the selected mode itself is untouched.
    pub fn set_press_held(&mut self, held: bool) {
        self.battery_preview = held && self.table.battery_mode().is_some();
    }

    /// A hold that ended as a battery preview: counts as an interaction but
    /// leaves the power profile alone.
    pub fn on_hold_released(&mut self, now: I) {
        self.touch(now);
    }

    /// Back from sleep: counts as an interaction.
    pub fn on_wake(&mut self, now: I) {
        self.touch(now);
        self.battery_preview = false;
    }

    /// Idle check.
    ///
    /// Sleeps once more than the active timeout has passed since the last
    /// interaction and the button has been released for at least the
    /// configured gate.
    pub fn tick(&self, now: I, released_ms: u64) -> SleepDecision {
        let idle_ms = elapsed_millis(now, self.last_interaction);
        let gate_open = self
            .config
            .sleep_release_gate_ms
            .is_none_or(|gate| released_ms >= gate as u64);

        if idle_ms > self.timeout_ms() && gate_open {
            SleepDecision::Sleep
        } else {
            SleepDecision::Awake
        }
    }

    /// Jumps to `id` without counting as an interaction.
    ///
    /// Returns false (and changes nothing) if `id` is not in the table.
    pub fn force_mode(&mut self, id: ModeId) -> bool {
        if self.table.get(id).is_none() {
            return false;
        }
        self.set_mode(id);
        true
    }

    fn force_battery_mode(&mut self) -> bool {
        match self.table.battery_mode() {
            Some(battery) => self.force_mode(battery),
            None => false,
        }
    }

    fn set_mode(&mut self, id: ModeId) {
        self.mode = id;

        #[cfg(feature = "defmt")]
        defmt::info!("mode {} ({})", id, self.table.entry_or_fallback(id).name);
    }

    /// Selected mode.
    pub fn mode(&self) -> ModeId {
        self.mode
    }

    /// Mode on screen: the battery gauge during a preview, else the selected mode.
    pub fn displayed_mode(&self) -> ModeId {
        if self.battery_preview {
            self.table.battery_mode().unwrap_or(self.mode)
        } else {
            self.mode
        }
    }

    /// Entry of the displayed mode.
    pub fn displayed_entry(&self) -> &ModeEntry {
        self.table.entry_or_fallback(self.displayed_mode())
    }

    /// Output brightness of the displayed mode under the current profile.
    pub fn brightness(&self) -> u8 {
        self.displayed_entry()
            .brightness
            .resolve(self.profile, self.config.power_save_divisor)
    }

    /// Idle timeout of the selected mode under the current profile.
    pub fn timeout_ms(&self) -> u64 {
        self.config.timeout_ms(&self.table, self.mode, self.profile)
    }

    pub fn power_profile(&self) -> PowerProfile {
        self.profile
    }

    pub fn last_interaction(&self) -> I {
        self.last_interaction
    }

    pub fn is_previewing_battery(&self) -> bool {
        self.battery_preview
    }

    pub fn table(&self) -> &ModeTable<M> {
        &self.table
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
