//! Debounced button adapter.
//!
//! [`Button::read`] must be called once per loop iteration with the raw pin
//! state. It filters contact bounce and turns stable edges into
//! [`ButtonEvent`]s:
//!
//! ```text
//! press ──▶ Pressed [+ Sequence(n) on the n-th press inside the window]
//! held past long_press_ms ──▶ LongPress (once per hold)
//! release ──▶ Released [+ ShortPress unless LongPress fired]
//! ```
//!
//! The adapter takes pin levels as plain booleans, so it has no HAL
//! dependency and can be driven directly from tests.

use crate::time::{TimeInstant, elapsed_millis};
use heapless::Vec;

/// Upper bound on events produced by a single read.
pub const MAX_EVENTS_PER_READ: usize = 3;

/// Events produced by one read.
pub type ButtonEvents = Vec<ButtonEvent, MAX_EVENTS_PER_READ>;

/// Button timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonConfig {
    /// Raw level must hold this long before it is accepted.
    pub debounce_ms: u32,

    /// Hold time that turns a press into a long press.
    pub long_press_ms: u32,

    /// Presses needed to report a [`ButtonEvent::Sequence`].
    pub sequence_count: u8,

    /// All presses of a sequence must start within this window.
    pub sequence_window_ms: u32,

    /// Pin reads low while pressed (button to ground, pull-up enabled).
    pub active_low: bool,
}

impl ButtonConfig {
    /// 35 ms debounce, 1.5 s long press, double press within 200 ms, active low.
    pub const STANDARD: ButtonConfig = ButtonConfig {
        debounce_ms: 35,
        long_press_ms: 1_500,
        sequence_count: 2,
        sequence_window_ms: 200,
        active_low: true,
    };
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Debounced button events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEvent {
    /// Stable transition to pressed.
    Pressed,

    /// Stable transition to released.
    Released,

    /// Released before the long-press time.
    ShortPress,

    /// Held past the long-press time. Fires while still held.
    LongPress,

    /// The given number of presses started within the sequence window.
    Sequence(u8),
}

/// Debounced button state machine.
#[derive(Debug, Clone)]
pub struct Button<I> {
    config: ButtonConfig,
    raw: bool,
    raw_changed_at: I,
    pressed: bool,
    changed_at: I,
    long_fired: bool,
    sequence_presses: u8,
    sequence_started_at: I,
}

impl<I: TimeInstant> Button<I> {
    /// Creates a released button.
    pub fn new(config: ButtonConfig, now: I) -> Self {
        Self {
            config,
            raw: false,
            raw_changed_at: now,
            pressed: false,
            changed_at: now,
            long_fired: false,
            sequence_presses: 0,
            sequence_started_at: now,
        }
    }

    /// Converts a pin level to a pressed flag using the configured polarity.
    #[inline]
    pub fn level_is_pressed(&self, pin_high: bool) -> bool {
        pin_high != self.config.active_low
    }

    /// Feeds one raw sample (`true` = pressed) and returns the resulting events.
    pub fn read(&mut self, raw_pressed: bool, now: I) -> ButtonEvents {
        let mut events = ButtonEvents::new();

        if raw_pressed != self.raw {
            self.raw = raw_pressed;
            self.raw_changed_at = now;
        }

        let settled = elapsed_millis(now, self.raw_changed_at) >= self.config.debounce_ms as u64;
        if self.raw != self.pressed && settled {
            self.pressed = self.raw;
            self.changed_at = now;

            if self.pressed {
                self.long_fired = false;
                let _ = events.push(ButtonEvent::Pressed);
                if let Some(count) = self.count_sequence_press(now) {
                    let _ = events.push(ButtonEvent::Sequence(count));
                }
            } else {
                let _ = events.push(ButtonEvent::Released);
                if !self.long_fired {
                    let _ = events.push(ButtonEvent::ShortPress);
                }
            }
        }

        if self.pressed
            && !self.long_fired
            && elapsed_millis(now, self.changed_at) >= self.config.long_press_ms as u64
        {
            self.long_fired = true;
            let _ = events.push(ButtonEvent::LongPress);
        }

        events
    }

    fn count_sequence_press(&mut self, now: I) -> Option<u8> {
        let window_open = self.sequence_presses > 0
            && elapsed_millis(now, self.sequence_started_at)
                <= self.config.sequence_window_ms as u64;

        if window_open {
            self.sequence_presses += 1;
        } else {
            self.sequence_presses = 1;
            self.sequence_started_at = now;
        }

        if self.sequence_presses >= self.config.sequence_count {
            let count = self.sequence_presses;
            self.sequence_presses = 0;
            Some(count)
        } else {
            None
        }
    }

    /// Returns the debounced state.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Returns true if the button has been held for at least `duration_ms`.
    pub fn pressed_for(&self, duration_ms: u32, now: I) -> bool {
        self.pressed && elapsed_millis(now, self.changed_at) >= duration_ms as u64
    }

    /// Returns true if the button has been released for at least `duration_ms`.
    pub fn released_for(&self, duration_ms: u32, now: I) -> bool {
        !self.pressed && elapsed_millis(now, self.changed_at) >= duration_ms as u64
    }

    /// Milliseconds since release, or zero while pressed.
    pub fn released_ms(&self, now: I) -> u64 {
        if self.pressed {
            0
        } else {
            elapsed_millis(now, self.changed_at)
        }
    }

    /// Returns the timing configuration.
    pub fn config(&self) -> &ButtonConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::TickInstant;

    fn button() -> Button<TickInstant> {
        Button::new(ButtonConfig::STANDARD, TickInstant(0))
    }

    /// Holds `level` from `from` to `to` (inclusive) in 5 ms steps, collecting events.
    fn hold(
        button: &mut Button<TickInstant>,
        level: bool,
        from: u32,
        to: u32,
    ) -> heapless::Vec<ButtonEvent, 16> {
        let mut all = heapless::Vec::new();
        let mut now = from;
        while now <= to {
            for event in button.read(level, TickInstant(now)) {
                all.push(event).unwrap();
            }
            now += 5;
        }
        all
    }

    #[test]
    fn bounce_shorter_than_debounce_is_ignored() {
        let mut button = button();
        assert!(button.read(true, TickInstant(100)).is_empty());
        assert!(button.read(false, TickInstant(110)).is_empty());
        assert!(button.read(true, TickInstant(120)).is_empty());
        assert!(button.read(false, TickInstant(130)).is_empty());
        assert!(hold(&mut button, false, 135, 300).is_empty());
        assert!(!button.is_pressed());
    }

    #[test]
    fn short_press_fires_on_release() {
        let mut button = button();
        let pressed = hold(&mut button, true, 100, 300);
        assert_eq!(pressed.as_slice(), &[ButtonEvent::Pressed]);

        let released = hold(&mut button, false, 305, 500);
        assert_eq!(
            released.as_slice(),
            &[ButtonEvent::Released, ButtonEvent::ShortPress]
        );
    }

    #[test]
    fn long_press_fires_once_while_held_and_suppresses_short_press() {
        let mut button = button();
        let held = hold(&mut button, true, 100, 4_000);
        assert_eq!(
            held.as_slice(),
            &[ButtonEvent::Pressed, ButtonEvent::LongPress]
        );

        let released = hold(&mut button, false, 4_005, 4_200);
        assert_eq!(released.as_slice(), &[ButtonEvent::Released]);
    }

    #[test]
    fn two_quick_presses_report_a_sequence() {
        let mut button = button();
        let mut events = hold(&mut button, true, 0, 60);
        events.extend(hold(&mut button, false, 65, 120));
        events.extend(hold(&mut button, true, 125, 180));

        assert_eq!(
            events.as_slice(),
            &[
                ButtonEvent::Pressed,
                ButtonEvent::Released,
                ButtonEvent::ShortPress,
                ButtonEvent::Pressed,
                ButtonEvent::Sequence(2),
            ]
        );
    }

    #[test]
    fn slow_presses_do_not_form_a_sequence() {
        let mut button = button();
        let mut events = hold(&mut button, true, 0, 60);
        events.extend(hold(&mut button, false, 65, 400));
        events.extend(hold(&mut button, true, 405, 460));
        assert!(!events.iter().any(|event| matches!(event, ButtonEvent::Sequence(_))));
    }

    #[test]
    fn pressed_for_and_released_for_track_stable_state() {
        let mut button = button();
        hold(&mut button, true, 0, 1_000);
        assert!(button.pressed_for(900, TickInstant(1_000)));
        assert!(!button.released_for(0, TickInstant(1_000)));
        assert_eq!(button.released_ms(TickInstant(1_000)), 0);

        hold(&mut button, false, 1_005, 7_000);
        assert!(button.released_for(5_000, TickInstant(7_000)));
        assert!(!button.pressed_for(0, TickInstant(7_000)));
    }

    #[test]
    fn polarity_maps_pin_levels() {
        let button = button();
        assert!(button.level_is_pressed(false));
        assert!(!button.level_is_pressed(true));
    }
}
