//! Mode tables.
//!
//! A [`ModeTable`] is the single ordered list of everything the ornament can
//! display. Normal modes come first and are cycled by short presses; special
//! modes follow and are reached by overrides. Cycling is defined over the
//! whole table: from the last normal mode it wraps to mode 0, and from a
//! special mode it steps through the remaining special modes before wrapping
//! to mode 0.
//!
//! Different hardware targets pick different tables; see [`presets`].

use crate::render::Pattern;
use crate::types::{Brightness, ConfigError, ModeId, ModeKind, TimeoutClass};
use heapless::Vec;

/// One displayable mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeEntry {
    /// Short name for logs.
    pub name: &'static str,

    pub pattern: Pattern,
    pub kind: ModeKind,
    pub timeout: TimeoutClass,
    pub brightness: Brightness,
}

impl ModeEntry {
    /// Creates a normal mode.
    pub const fn normal(
        name: &'static str,
        pattern: Pattern,
        timeout: TimeoutClass,
        brightness: Brightness,
    ) -> Self {
        Self {
            name,
            pattern,
            kind: ModeKind::Normal,
            timeout,
            brightness,
        }
    }

    /// Creates a special mode.
    pub const fn special(
        name: &'static str,
        pattern: Pattern,
        timeout: TimeoutClass,
        brightness: Brightness,
    ) -> Self {
        Self {
            name,
            pattern,
            kind: ModeKind::Special,
            timeout,
            brightness,
        }
    }
}

/// Entry used for ids outside the table: dark, short timeout.
pub const FALLBACK_ENTRY: ModeEntry =
    ModeEntry::special("fallback", Pattern::Off, TimeoutClass::Off, Brightness::Fixed(0));

/// Validated, ordered list of modes.
///
/// # Type Parameters
/// * `M` - Maximum number of modes (at most 255 are addressable)
#[derive(Debug, Clone)]
pub struct ModeTable<const M: usize> {
    entries: Vec<ModeEntry, M>,
    available: u8,
}

impl<const M: usize> ModeTable<M> {
    /// Creates a new table builder.
    pub fn builder() -> ModeTableBuilder<M> {
        ModeTableBuilder::new()
    }

    /// Builds a table from a preset list.
    pub fn from_entries(entries: &[ModeEntry]) -> Result<Self, ConfigError> {
        entries
            .iter()
            .try_fold(Self::builder(), |builder, entry| builder.mode(*entry))?
            .build()
    }

    /// Number of normal modes.
    pub fn available_modes(&self) -> u8 {
        self.available
    }

    /// Total number of modes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a built table.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entry for `id`, if it exists.
    pub fn get(&self, id: ModeId) -> Option<&ModeEntry> {
        self.entries.get(id.index())
    }

    /// Returns the entry for `id`, or [`FALLBACK_ENTRY`] for unknown ids.
    pub fn entry_or_fallback(&self, id: ModeId) -> &ModeEntry {
        self.get(id).unwrap_or(&FALLBACK_ENTRY)
    }

    /// Returns true if `id` is a normal mode.
    pub fn is_normal(&self, id: ModeId) -> bool {
        id.0 < self.available
    }

    /// Returns the mode after `id` in cycling order.
    ///
    /// Normal modes wrap within the normal range, special modes walk to the
    /// end of the table, and both land on [`ModeId::FIRST`] when exhausted.
    /// Unknown ids also land on [`ModeId::FIRST`].
    pub fn next(&self, id: ModeId) -> ModeId {
        let index = id.index();
        let available = self.available as usize;

        if index < available {
            ModeId(((index + 1) % available) as u8)
        } else if index + 1 < self.entries.len() {
            ModeId(id.0 + 1)
        } else {
            ModeId::FIRST
        }
    }

    /// Returns the first mode whose pattern satisfies `predicate`.
    pub fn find(&self, predicate: impl Fn(&ModeEntry) -> bool) -> Option<ModeId> {
        self.entries
            .iter()
            .position(predicate)
            .map(|index| ModeId(index as u8))
    }

    /// Mode showing the battery gauge, used for battery overrides.
    pub fn battery_mode(&self) -> Option<ModeId> {
        self.find(|entry| matches!(entry.pattern, Pattern::BatteryBar(_)))
    }

    /// First dark mode, used by the idle-then-click-turns-off policy.
    pub fn off_mode(&self) -> Option<ModeId> {
        self.find(|entry| entry.pattern == Pattern::Off)
    }

    /// Iterates over `(id, entry)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (ModeId, &ModeEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (ModeId(index as u8), entry))
    }
}

/// Builder for constructing validated mode tables.
#[derive(Debug)]
pub struct ModeTableBuilder<const M: usize> {
    entries: Vec<ModeEntry, M>,
}

impl<const M: usize> ModeTableBuilder<M> {
    /// Creates a new empty builder.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends a mode.
    ///
    /// # Errors
    /// * `TableFull` - Capacity `M` (or 255 modes) exceeded
    /// * `NormalAfterSpecial` - A normal mode follows a special one
    pub fn mode(mut self, entry: ModeEntry) -> Result<Self, ConfigError> {
        if self.entries.len() >= u8::MAX as usize {
            return Err(ConfigError::TableFull);
        }

        let after_special = self
            .entries
            .last()
            .is_some_and(|last| last.kind == ModeKind::Special);
        if entry.kind == ModeKind::Normal && after_special {
            return Err(ConfigError::NormalAfterSpecial);
        }

        self.entries
            .push(entry)
            .map_err(|_| ConfigError::TableFull)?;
        Ok(self)
    }

    /// Appends a normal mode.
    pub fn normal(
        self,
        name: &'static str,
        pattern: Pattern,
        timeout: TimeoutClass,
        brightness: Brightness,
    ) -> Result<Self, ConfigError> {
        self.mode(ModeEntry::normal(name, pattern, timeout, brightness))
    }

    /// Appends a special mode.
    pub fn special(
        self,
        name: &'static str,
        pattern: Pattern,
        timeout: TimeoutClass,
        brightness: Brightness,
    ) -> Result<Self, ConfigError> {
        self.mode(ModeEntry::special(name, pattern, timeout, brightness))
    }

    /// Builds and validates the table.
    ///
    /// # Errors
    /// * `NoNormalModes` - Nothing for short presses to cycle through
    pub fn build(self) -> Result<ModeTable<M>, ConfigError> {
        let available = self
            .entries
            .iter()
            .take_while(|entry| entry.kind == ModeKind::Normal)
            .count();

        if available == 0 {
            return Err(ConfigError::NoNormalModes);
        }

        Ok(ModeTable {
            entries: self.entries,
            available: available as u8,
        })
    }
}

impl<const M: usize> Default for ModeTableBuilder<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Mode lists for the supported hardware targets.
///
/// Flag modes use [`Pattern::Stripes`], which mirrors the palette around the
/// middle of the strip. The hand-placed 10-pixel layouts of the first boards
/// (trans repeating around the ring, genderqueer mirrored around pixel 0) are
/// approximated by the mirrored layout rather than reproduced pixel for pixel.
pub mod presets {
    use super::ModeEntry;
    use crate::colors::{self, flags};
    use crate::render::Pattern;
    use crate::types::{Brightness, TimeoutClass};

    const DIM: Brightness = Brightness::Scaled(30);

    const NORMAL_MODES: [ModeEntry; 7] = [
        ModeEntry::normal("trans", Pattern::Stripes(&flags::TRANS), TimeoutClass::Default, DIM),
        ModeEntry::normal(
            "genderqueer",
            Pattern::Stripes(&flags::GENDERQUEER),
            TimeoutClass::Default,
            DIM,
        ),
        ModeEntry::normal("rainbow", Pattern::Rainbow, TimeoutClass::Default, DIM),
        ModeEntry::normal("pink", Pattern::Solid(colors::PINK), TimeoutClass::Default, DIM),
        ModeEntry::normal(
            "torch",
            Pattern::Solid(colors::WHITE),
            TimeoutClass::Torch,
            Brightness::Fixed(255),
        ),
        ModeEntry::normal("heartbeat", Pattern::Blink(colors::RED), TimeoutClass::Alert, DIM),
        ModeEntry::normal("black", Pattern::Off, TimeoutClass::Off, DIM),
    ];

    /// Boards without battery sensing: seven normal modes, nothing special.
    pub const CLASSIC: [ModeEntry; 7] = NORMAL_MODES;

    /// Boards with battery sensing: the classic modes plus a battery gauge
    /// and alternate palettes.
    pub const FULL: [ModeEntry; 11] = [
        NORMAL_MODES[0],
        NORMAL_MODES[1],
        NORMAL_MODES[2],
        NORMAL_MODES[3],
        NORMAL_MODES[4],
        NORMAL_MODES[5],
        NORMAL_MODES[6],
        ModeEntry::special(
            "battery",
            Pattern::BatteryBar(colors::BATTERY_GREEN),
            TimeoutClass::Default,
            DIM,
        ),
        ModeEntry::special("red", Pattern::Solid(colors::RED), TimeoutClass::Default, DIM),
        ModeEntry::special("lgbt", Pattern::Stripes(&flags::LGBT), TimeoutClass::Default, DIM),
        ModeEntry::special(
            "nonbinary",
            Pattern::Stripes(&flags::NONBINARY),
            TimeoutClass::Default,
            DIM,
        ),
    ];
}
