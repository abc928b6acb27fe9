//! Deep sleep with a button wake interrupt.
//!
//! Entering sleep is a three-phase protocol: arm the wake source, block in
//! the power-down state, disarm on return. Arming is tied to the lifetime of
//! a guard, so the wake interrupt is disarmed on every exit path, including
//! when the hardware refuses to power down.
//!
//! The interrupt handler only calls [`WakeLatch::signal`]; the interaction
//! clock is refreshed by the poll loop once [`enter_sleep`] returns.

use core::cell::Cell;
use critical_section::Mutex;

/// Hardware hooks used around deep sleep.
///
/// Implementations own the LED power rail, the sampling peripheral, the wake
/// interrupt and the MCU sleep controller.
pub trait PowerControl {
    /// Turns off everything not needed while asleep (LED rail, ADC).
    fn disable_peripherals(&mut self);

    /// Restores what [`disable_peripherals`](Self::disable_peripherals) turned off.
    fn enable_peripherals(&mut self);

    /// Attaches the edge-triggered wake interrupt to the button line.
    fn arm_wake(&mut self);

    /// Detaches the wake interrupt.
    fn disarm_wake(&mut self);

    /// Blocks in the power-down state until the wake interrupt fires.
    fn power_down(&mut self) -> Result<(), SleepError>;

    /// Jumps to the bootloader.
    fn reboot(&mut self) -> !;
}

/// Errors from [`PowerControl::power_down`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SleepError {
    /// The MCU did not enter the power-down state.
    NotEntered,
}

impl core::fmt::Display for SleepError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SleepError::NotEntered => write!(f, "power-down state was not entered"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SleepError {}

/// Wake flag shared between the wake interrupt and the poll loop.
///
/// Place in a `static`; the interrupt handler calls [`signal`](Self::signal).
pub struct WakeLatch {
    pending: Mutex<Cell<bool>>,
}

impl WakeLatch {
    pub const fn new() -> Self {
        Self {
            pending: Mutex::new(Cell::new(false)),
        }
    }

    /// Marks a wake. Safe to call from interrupt context.
    pub fn signal(&self) {
        critical_section::with(|cs| self.pending.borrow(cs).set(true));
    }

    /// Returns and clears the wake flag.
    pub fn take(&self) -> bool {
        critical_section::with(|cs| self.pending.borrow(cs).replace(false))
    }
}

impl Default for WakeLatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps the wake interrupt armed for its lifetime.
struct ArmedWake<'a, P: PowerControl> {
    power: &'a mut P,
}

impl<'a, P: PowerControl> ArmedWake<'a, P> {
    fn arm(power: &'a mut P) -> Self {
        power.arm_wake();
        Self { power }
    }

    fn power_down(&mut self) -> Result<(), SleepError> {
        self.power.power_down()
    }
}

impl<P: PowerControl> Drop for ArmedWake<'_, P> {
    fn drop(&mut self) {
        self.power.disarm_wake();
    }
}

/// How a sleep attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SleepReport {
    pub result: Result<(), SleepError>,

    /// The wake interrupt fired while armed.
    pub woken_by_button: bool,
}

/// Powers down until the button wakes the device.
///
/// Peripherals are disabled first and re-enabled on return; the wake
/// interrupt is armed only for the blocking call.
pub fn enter_sleep<P: PowerControl>(power: &mut P, latch: &WakeLatch) -> SleepReport {
    #[cfg(feature = "defmt")]
    defmt::info!("entering deep sleep");

    power.disable_peripherals();
    latch.take();

    let result = {
        let mut armed = ArmedWake::arm(power);
        armed.power_down()
    };

    power.enable_peripherals();
    let woken_by_button = latch.take();

    #[cfg(feature = "defmt")]
    defmt::info!("awake (button: {})", woken_by_button);

    SleepReport {
        result,
        woken_by_button,
    }
}
