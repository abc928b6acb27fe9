#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`ModeTable`**: Ordered list of displayable modes, normal modes first, special modes after
//! - **`ModeMachine`**: Owns the selected mode, power profile and interaction clock;
//!   decides when to sleep
//! - **`Pattern`** / **`render`**: Stateless mapping from mode and animation progress to a frame
//! - **`Button`**: Debounces raw pin samples into press, long-press and sequence events
//! - **`BatteryMonitor`**: Rate-limited voltage sampling, level quantization and charge detection
//! - **`enter_sleep`**: Arms the wake interrupt, powers down, disarms on return
//! - **`Ornament`**: The cooperative poll loop tying everything to the hardware traits
//! - **`LedStrip`**, **`VoltageSampler`**, **`PowerControl`**, **`TimeSource`**:
//!   Traits to implement for your board
//!
//! Pixels are `Srgb<u8>`; brightness is applied by the LED driver after rendering.

// Re-export Srgb from palette for user convenience
pub use palette::Srgb;

pub mod battery;
pub mod button;
pub mod colors;
pub mod config;
pub mod device;
pub mod machine;
pub mod modes;
pub mod render;
pub mod sleep;
pub mod time;
pub mod types;

pub use battery::{
    BatteryEvent, BatteryLevel, BatteryMonitor, ChargeDetect, ChargePin, LIPO_CURVE, LevelCurve,
    NoChargeDetect, VoltageJump, VoltageSampler,
};
pub use button::{Button, ButtonConfig, ButtonEvent};
pub use colors::Pixel;
pub use config::{Config, ShortPressPolicy, TimeoutPair, TimeoutTable};
pub use device::{LedStrip, Ornament, Parts, PollOutcome};
pub use machine::{ModeMachine, SleepDecision};
pub use modes::{ModeEntry, ModeTable, ModeTableBuilder, presets};
pub use render::{Pattern, RenderParams, progress_at, render};
pub use sleep::{PowerControl, SleepError, SleepReport, WakeLatch, enter_sleep};
pub use time::{Interval, Millis, TickInstant, TimeDuration, TimeInstant, TimeSource};
pub use types::{Brightness, ConfigError, Directive, ModeId, ModeKind, PowerProfile, TimeoutClass};
