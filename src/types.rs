//! Core types shared by the mode table, state machine and renderer.

/// Position of a mode in a [`ModeTable`](crate::modes::ModeTable).
///
/// Normal modes occupy `0..available_modes()`, special modes follow them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModeId(pub u8);

impl ModeId {
    /// The first normal mode; also the target of every cycle wrap.
    pub const FIRST: ModeId = ModeId(0);

    /// Returns the mode's table index.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Whether a mode takes part in short-press cycling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModeKind {
    /// Reached by ordinary short presses.
    Normal,

    /// Reached only through overrides (battery, charging) or a direct jump.
    Special,
}

/// Idle-timeout family of a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeoutClass {
    /// Bright white light, long timeout.
    Torch,

    /// Dark mode, short timeout.
    Off,

    /// Blink/alert modes, very long timeout.
    Alert,

    /// Everything else.
    Default,
}

/// How a mode's output brightness is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Brightness {
    /// Divided by the power-save divisor while the extended profile is active.
    Scaled(u8),

    /// Used as-is regardless of power profile.
    Fixed(u8),
}

impl Brightness {
    /// Resolves the brightness for the given profile.
    ///
    /// A zero divisor leaves the value unscaled.
    #[inline]
    pub fn resolve(self, profile: PowerProfile, divisor: u8) -> u8 {
        match (self, profile) {
            (Brightness::Scaled(value), PowerProfile::Extended) if divisor > 0 => value / divisor,
            (Brightness::Scaled(value), _) | (Brightness::Fixed(value), _) => value,
        }
    }
}

/// Power profile toggled by a long press.
///
/// `Extended` lengthens every idle timeout and dims scaled brightness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerProfile {
    #[default]
    Normal,
    Extended,
}

impl PowerProfile {
    /// Returns the other profile.
    #[inline]
    pub fn toggled(self) -> Self {
        match self {
            PowerProfile::Normal => PowerProfile::Extended,
            PowerProfile::Extended => PowerProfile::Normal,
        }
    }

    /// Returns true for the extended (low-power, long-timeout) profile.
    #[inline]
    pub fn is_extended(self) -> bool {
        self == PowerProfile::Extended
    }
}

/// What the poll loop must do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[must_use]
pub enum Directive {
    /// Keep running.
    Continue,

    /// Jump to the bootloader. Only produced with the `diagnostic-reboot` feature.
    Reboot,
}

/// Configuration validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Mode table has no normal modes to cycle through.
    NoNormalModes,

    /// A normal mode was added after a special mode.
    NormalAfterSpecial,

    /// Mode table capacity exceeded.
    TableFull,

    /// A special mode would time out sooner than a default normal mode.
    ShortSpecialTimeout(ModeId),

    /// An extended timeout is shorter than its base timeout.
    ExtendedShorterThanBase(TimeoutClass),

    /// Button timing is unusable (zero long press or sequence shorter than two).
    InvalidButtonTiming,

    /// More LEDs than a battery level can address.
    TooManyLeds,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::NoNormalModes => {
                write!(f, "mode table must have at least one normal mode")
            }
            ConfigError::NormalAfterSpecial => {
                write!(f, "normal modes must precede all special modes")
            }
            ConfigError::TableFull => {
                write!(f, "mode table capacity exceeded")
            }
            ConfigError::ShortSpecialTimeout(id) => {
                write!(
                    f,
                    "special mode {} times out sooner than the default normal mode",
                    id.0
                )
            }
            ConfigError::ExtendedShorterThanBase(class) => {
                write!(f, "extended timeout for {:?} is shorter than its base", class)
            }
            ConfigError::InvalidButtonTiming => {
                write!(
                    f,
                    "long press must be non-zero and sequences need at least two presses"
                )
            }
            ConfigError::TooManyLeds => {
                write!(f, "at most 255 LEDs are supported")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}
