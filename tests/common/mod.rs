//! Shared test infrastructure for led-ornament integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use core::cell::Cell;
use core::convert::Infallible;
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::InputPin;
use led_ornament::colors::OFF;
use led_ornament::{
    LedStrip, Pixel, PowerControl, SleepError, TickInstant, TimeSource, VoltageSampler, WakeLatch,
};

// ============================================================================
// Mock Time Source
// ============================================================================

/// Mock time source with controllable time advancement
pub struct MockTimeSource {
    current_time: Cell<TickInstant>,
}

impl MockTimeSource {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(millis: u32) -> Self {
        Self {
            current_time: Cell::new(TickInstant(millis)),
        }
    }

    /// Advance time by the given number of milliseconds (wrapping)
    pub fn advance(&self, millis: u32) {
        let current = self.current_time.get();
        self.current_time.set(TickInstant(current.0.wrapping_add(millis)));
    }

    pub fn set_time(&self, millis: u32) {
        self.current_time.set(TickInstant(millis));
    }
}

impl TimeSource<TickInstant> for MockTimeSource {
    fn now(&self) -> TickInstant {
        self.current_time.get()
    }
}

// ============================================================================
// Mock Pins
// ============================================================================

/// Input pin whose level is controlled through a shared cell
pub struct MockPin<'a> {
    high: &'a Cell<bool>,
}

impl<'a> MockPin<'a> {
    pub fn new(high: &'a Cell<bool>) -> Self {
        Self { high }
    }
}

impl InputPin for MockPin<'_> {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Self::Error> {
        Ok(self.high.get())
    }

    fn is_low(&self) -> Result<bool, Self::Error> {
        Ok(!self.high.get())
    }
}

// ============================================================================
// Mock LED Strip
// ============================================================================

/// LED strip that records what was shown
pub struct MockStrip<const N: usize> {
    staged: [Pixel; N],
    brightness: u8,
    shown: [Pixel; N],
    shown_brightness: u8,
    show_count: usize,
}

impl<const N: usize> MockStrip<N> {
    pub fn new() -> Self {
        Self {
            staged: [OFF; N],
            brightness: 0,
            shown: [OFF; N],
            shown_brightness: 0,
            show_count: 0,
        }
    }

    pub fn shown(&self) -> &[Pixel; N] {
        &self.shown
    }

    pub fn shown_brightness(&self) -> u8 {
        self.shown_brightness
    }

    pub fn show_count(&self) -> usize {
        self.show_count
    }
}

impl<const N: usize> LedStrip<N> for MockStrip<N> {
    fn set_pixels(&mut self, pixels: &[Pixel; N]) {
        self.staged = *pixels;
    }

    fn set_brightness(&mut self, brightness: u8) {
        self.brightness = brightness;
    }

    fn show(&mut self) {
        self.shown = self.staged;
        self.shown_brightness = self.brightness;
        self.show_count += 1;
    }
}

// ============================================================================
// Mock Voltage Sampler
// ============================================================================

/// Sampler returning whatever the shared cell holds
pub struct MockSampler<'a> {
    millivolts: &'a Cell<u16>,
    enabled: bool,
    reads: usize,
    reads_while_disabled: usize,
}

impl<'a> MockSampler<'a> {
    pub fn new(millivolts: &'a Cell<u16>) -> Self {
        Self {
            millivolts,
            enabled: false,
            reads: 0,
            reads_while_disabled: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn reads(&self) -> usize {
        self.reads
    }

    pub fn reads_while_disabled(&self) -> usize {
        self.reads_while_disabled
    }
}

impl VoltageSampler for MockSampler<'_> {
    fn enable(&mut self) {
        self.enabled = true;
    }

    fn disable(&mut self) {
        self.enabled = false;
    }

    fn read_millivolts(&mut self) -> u16 {
        self.reads += 1;
        if !self.enabled {
            self.reads_while_disabled += 1;
        }
        self.millivolts.get()
    }
}

// ============================================================================
// Mock Power Control
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerCall {
    DisablePeripherals,
    EnablePeripherals,
    ArmWake,
    DisarmWake,
    PowerDown,
}

/// Power control that "sleeps" by advancing the mock clock and firing the wake latch
pub struct MockPower<'a> {
    time: &'a MockTimeSource,
    latch: &'a WakeLatch,
    sleep_ms: u32,
    refuse: bool,
    calls: heapless::Vec<PowerCall, 64>,
}

impl<'a> MockPower<'a> {
    pub fn new(time: &'a MockTimeSource, latch: &'a WakeLatch) -> Self {
        Self {
            time,
            latch,
            sleep_ms: 60_000,
            refuse: false,
            calls: heapless::Vec::new(),
        }
    }

    /// Makes `power_down` fail without sleeping
    pub fn refusing(mut self) -> Self {
        self.refuse = true;
        self
    }

    pub fn calls(&self) -> &[PowerCall] {
        &self.calls
    }

    pub fn count(&self, call: PowerCall) -> usize {
        self.calls.iter().filter(|&&c| c == call).count()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl PowerControl for MockPower<'_> {
    fn disable_peripherals(&mut self) {
        let _ = self.calls.push(PowerCall::DisablePeripherals);
    }

    fn enable_peripherals(&mut self) {
        let _ = self.calls.push(PowerCall::EnablePeripherals);
    }

    fn arm_wake(&mut self) {
        let _ = self.calls.push(PowerCall::ArmWake);
    }

    fn disarm_wake(&mut self) {
        let _ = self.calls.push(PowerCall::DisarmWake);
    }

    fn power_down(&mut self) -> Result<(), SleepError> {
        let _ = self.calls.push(PowerCall::PowerDown);
        if self.refuse {
            return Err(SleepError::NotEntered);
        }
        self.time.advance(self.sleep_ms);
        self.latch.signal();
        Ok(())
    }

    fn reboot(&mut self) -> ! {
        panic!("reboot requested");
    }
}

// ============================================================================
// Mock Delay
// ============================================================================

/// Delay that only records how long it was asked to block
pub struct MockDelay {
    total_ms: u32,
    calls: usize,
}

impl MockDelay {
    pub fn new() -> Self {
        Self {
            total_ms: 0,
            calls: 0,
        }
    }

    pub fn total_ms(&self) -> u32 {
        self.total_ms
    }

    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl DelayMs<u16> for MockDelay {
    fn delay_ms(&mut self, ms: u16) {
        self.total_ms += ms as u32;
        self.calls += 1;
    }
}
