//! The ornament's cooperative poll loop.
//!
//! One [`Ornament::poll`] is one loop iteration:
//!
//! ```text
//! read button ─▶ update state machine ─▶ render ─▶ brightness + show
//!             ─▶ battery (rate limited) ─▶ sleep check
//! ```
//!
//! Nothing blocks except the deliberate deep sleep and the short, bounded
//! charge-start animation.

use crate::battery::{BatteryEvent, BatteryMonitor, ChargeDetect, LevelCurve, VoltageSampler};
use crate::button::{Button, ButtonEvent};
use crate::colors::{OFF, Pixel};
use crate::config::Config;
use crate::machine::{ModeMachine, SleepDecision};
use crate::modes::ModeTable;
use crate::render::{Pattern, RenderParams, progress_at, render};
use crate::sleep::{PowerControl, SleepReport, WakeLatch, enter_sleep};
use crate::time::{Interval, TimeInstant, TimeSource, elapsed_millis};
use crate::types::{ConfigError, Directive};
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::InputPin;

/// Trait for abstracting an addressable LED strip.
///
/// Implementations should handle hardware errors internally; these methods
/// cannot fail.
pub trait LedStrip<const N: usize> {
    /// Stages a full frame.
    fn set_pixels(&mut self, pixels: &[Pixel; N]);

    /// Sets global brightness (0-255) applied to the staged frame.
    fn set_brightness(&mut self, brightness: u8);

    /// Pushes the staged frame to the LEDs. Blocks until written.
    fn show(&mut self);
}

/// Hardware handed to [`Ornament::new`].
pub struct Parts<B, L, S, C, P, D> {
    /// Button input.
    pub button: B,
    pub strip: L,
    pub sampler: S,
    pub charge: C,
    pub curve: LevelCurve,
    pub power: P,
    /// Blocking delay for the charge-start animation.
    pub delay: D,
}

/// What a poll did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollOutcome {
    /// Normal iteration.
    Running,

    /// The device slept and has woken up again.
    Slept(SleepReport),
}

/// A complete ornament: button, LEDs, battery monitor, sleep control and
/// the mode state machine.
///
/// # Type Parameters
/// * `'t` - Lifetime of the time source and wake latch references
/// * `I` - Time instant type
/// * `T` - Time source implementation type
/// * `B` - Button pin
/// * `L` - LED strip
/// * `S` - Voltage sampler
/// * `C` - Charge detection strategy
/// * `P` - Power control
/// * `D` - Blocking delay
/// * `N` - Number of LEDs
/// * `M` - Mode table capacity
pub struct Ornament<'t, I, T, B, L, S, C, P, D, const N: usize, const M: usize>
where
    I: TimeInstant,
    T: TimeSource<I>,
{
    time_source: &'t T,
    wake: &'t WakeLatch,
    button_pin: B,
    button: Button<I>,
    strip: L,
    battery: BatteryMonitor<S, C, I>,
    power: P,
    delay: D,
    machine: ModeMachine<I, M>,
    low_battery_check: Interval<I>,
    long_press_pending: bool,
    animation_epoch: I,
    frame: [Pixel; N],
}

impl<'t, I, T, B, L, S, C, P, D, const N: usize, const M: usize>
    Ornament<'t, I, T, B, L, S, C, P, D, N, M>
where
    I: TimeInstant,
    T: TimeSource<I>,
    B: InputPin,
    L: LedStrip<N>,
    S: VoltageSampler,
    C: ChargeDetect,
    P: PowerControl,
    D: DelayMs<u16>,
{
    /// Wires up the ornament. Starts in mode 0, normal profile, LEDs powered.
    ///
    /// # Errors
    /// * `TooManyLeds` - `N` exceeds 255
    /// * Any error from [`Config::validate`]
    pub fn new(
        parts: Parts<B, L, S, C, P, D>,
        table: ModeTable<M>,
        config: Config,
        time_source: &'t T,
        wake: &'t WakeLatch,
    ) -> Result<Self, ConfigError> {
        let leds = u8::try_from(N).map_err(|_| ConfigError::TooManyLeds)?;
        let now = time_source.now();
        let machine = ModeMachine::new(table, config, now)?;

        let mut power = parts.power;
        power.enable_peripherals();

        Ok(Self {
            time_source,
            wake,
            button_pin: parts.button,
            button: Button::new(config.button, now),
            strip: parts.strip,
            battery: BatteryMonitor::new(
                parts.sampler,
                parts.charge,
                parts.curve,
                leds,
                config.battery_sample_ms as u64,
            ),
            power,
            delay: parts.delay,
            machine,
            low_battery_check: Interval::starting_at(config.low_battery_check_ms as u64, now),
            long_press_pending: false,
            animation_epoch: now,
            frame: [OFF; N],
        })
    }

    /// Runs one loop iteration.
    pub fn poll(&mut self) -> PollOutcome {
        let now = self.time_source.now();

        self.handle_button(now);
        self.show_frame(now);
        self.check_battery(now);

        let released_ms = self.button.released_ms(now);
        match self.machine.tick(now, released_ms) {
            SleepDecision::Awake => PollOutcome::Running,
            SleepDecision::Sleep => PollOutcome::Slept(self.sleep()),
        }
    }

    /// Runs the loop forever.
    pub fn run(&mut self) -> ! {
        loop {
            self.poll();
        }
    }

    fn handle_button(&mut self, now: I) {
        // A pin read error counts as "not pressed".
        let pin_high = self.button_pin.is_high().unwrap_or(self.button.config().active_low);
        let pressed = self.button.level_is_pressed(pin_high);
        let sequence_count = self.button.config().sequence_count;

        for event in self.button.read(pressed, now) {
            match event {
                ButtonEvent::ShortPress => self.machine.on_short_press(now),
                // The same hold may still become a battery preview; decide on release.
                ButtonEvent::LongPress if self.preview_available() => {
                    self.long_press_pending = true;
                }
                ButtonEvent::LongPress => self.machine.on_long_press(now),
                ButtonEvent::Released if self.long_press_pending => {
                    self.long_press_pending = false;
                    if self.machine.is_previewing_battery() {
                        self.machine.on_hold_released(now);
                    } else {
                        self.machine.on_long_press(now);
                    }
                }
                ButtonEvent::Sequence(count) if count == sequence_count => {
                    if self.machine.on_double_press(now) == Directive::Reboot {
                        #[cfg(feature = "defmt")]
                        defmt::warn!("diagnostic reboot");
                        self.power.reboot();
                    }
                }
                ButtonEvent::Pressed | ButtonEvent::Released | ButtonEvent::Sequence(_) => {}
            }
        }

        let held = self
            .machine
            .config()
            .battery_preview_hold_ms
            .is_some_and(|hold_ms| self.button.pressed_for(hold_ms, now));
        self.machine.set_press_held(held);
    }

    fn preview_available(&self) -> bool {
        self.machine.config().battery_preview_hold_ms.is_some()
            && self.machine.table().battery_mode().is_some()
    }

    fn show_frame(&mut self, now: I) {
        let step_ms = self.machine.config().animation_step_ms;
        let progress = progress_at(elapsed_millis(now, self.animation_epoch), step_ms);
        let params = RenderParams {
            battery: self.battery.level(),
        };

        self.frame = render(&self.machine.displayed_entry().pattern, progress, &params);
        self.strip.set_pixels(&self.frame);
        self.strip.set_brightness(self.machine.brightness());
        self.strip.show();
    }

    fn check_battery(&mut self, now: I) {
        match self.battery.poll(now) {
            Some(BatteryEvent::ChargeStarted) => {
                #[cfg(feature = "defmt")]
                defmt::info!("charging started");

                if self.machine.on_charge_start() {
                    self.play_charge_animation();
                }
            }
            Some(BatteryEvent::ChargeStopped) => {
                #[cfg(feature = "defmt")]
                defmt::info!("charging stopped");
            }
            None => {}
        }

        if self.low_battery_check.due(now) {
            self.machine.on_battery_check(self.battery.level());
        }
    }

    /// Fills the strip one pixel at a time in the battery gauge color.
    ///
    /// Blocks for `N * charge_animation_step_ms`.
    fn play_charge_animation(&mut self) {
        let color = match self.machine.displayed_entry().pattern {
            Pattern::BatteryBar(color) => color,
            _ => return,
        };
        let step_ms = self.machine.config().charge_animation_step_ms;

        self.frame = [OFF; N];
        self.strip.set_brightness(self.machine.brightness());
        for index in 0..N {
            self.frame[index] = color;
            self.strip.set_pixels(&self.frame);
            self.strip.show();
            self.delay.delay_ms(step_ms);
        }
    }

    fn sleep(&mut self) -> SleepReport {
        self.long_press_pending = false;
        self.frame = [OFF; N];
        self.strip.set_pixels(&self.frame);
        self.strip.set_brightness(0);
        self.strip.show();

        let report = enter_sleep(&mut self.power, self.wake);

        let now = self.time_source.now();
        self.machine.on_wake(now);
        report
    }

    pub fn machine(&self) -> &ModeMachine<I, M> {
        &self.machine
    }

    pub fn battery(&self) -> &BatteryMonitor<S, C, I> {
        &self.battery
    }

    pub fn button(&self) -> &Button<I> {
        &self.button
    }

    /// Last frame sent to the strip.
    pub fn frame(&self) -> &[Pixel; N] {
        &self.frame
    }

    pub fn strip(&self) -> &L {
        &self.strip
    }

    pub fn power(&self) -> &P {
        &self.power
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }
}
