//! Bounded shift/asset configuration store.

use core::fmt;

use heapless::String;

/// Maximum number of schedulable assets.
pub const MAX_ASSETS: usize = 10;
/// Maximum number of shift windows per asset.
pub const MAX_CONFIGURABLE_SHIFTS: usize = 5;
/// Capacity of an asset name in bytes.
pub const ASSET_NAME_BYTES: usize = 16;

/// Local, non-fatal configuration errors.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigError {
    /// Asset or shift index outside the compile-time bounds.
    InvalidIndex,
    /// Time string is not a valid 24-hour `HH:MM` value.
    InvalidTimeFormat,
    /// Asset name is empty or does not fit the name buffer.
    InvalidName,
}

/// Validated wall-clock time of day.
///
/// Constructed only through [`ShiftTime::new`] or [`ShiftTime::parse`],
/// so a held value is always a real 24-hour clock reading.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct ShiftTime {
    hour: u8,
    minute: u8,
}

impl ShiftTime {
    pub fn new(hour: u8, minute: u8) -> Result<Self, ConfigError> {
        if hour > 23 || minute > 59 {
            return Err(ConfigError::InvalidTimeFormat);
        }

        Ok(Self { hour, minute })
    }

    /// Parses the exact zero-padded `HH:MM` form.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let bytes = text.as_bytes();
        if bytes.len() != 5 || bytes[2] != b':' {
            return Err(ConfigError::InvalidTimeFormat);
        }

        let digit = |b: u8| {
            if b.is_ascii_digit() {
                Ok(b - b'0')
            } else {
                Err(ConfigError::InvalidTimeFormat)
            }
        };

        let hour = digit(bytes[0])? * 10 + digit(bytes[1])?;
        let minute = digit(bytes[3])? * 10 + digit(bytes[4])?;
        Self::new(hour, minute)
    }

    pub const fn hour(self) -> u8 {
        self.hour
    }

    pub const fn minute(self) -> u8 {
        self.minute
    }

    pub const fn minutes_from_midnight(self) -> u16 {
        self.hour as u16 * 60 + self.minute as u16
    }
}

impl fmt::Display for ShiftTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// One configured working interval.
///
/// An absent end time is an open window running to midnight. An end
/// before the start wraps past midnight.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ShiftWindow {
    pub start: ShiftTime,
    pub end: Option<ShiftTime>,
}

impl ShiftWindow {
    pub const fn starting_at(start: ShiftTime) -> Self {
        Self { start, end: None }
    }

    pub const fn spanning(start: ShiftTime, end: ShiftTime) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    /// Whether `at` falls inside this window.
    ///
    /// A window with `end == start` is empty.
    pub fn contains(&self, at: ShiftTime) -> bool {
        let t = at.minutes_from_midnight();
        let start = self.start.minutes_from_midnight();

        match self.end {
            None => t >= start,
            Some(end) => {
                let end = end.minutes_from_midnight();
                if start < end {
                    t >= start && t < end
                } else if start > end {
                    t >= start || t < end
                } else {
                    false
                }
            }
        }
    }
}

/// One asset slot: a display name plus its shift windows.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AssetConfig {
    name: String<ASSET_NAME_BYTES>,
    shifts: [Option<ShiftWindow>; MAX_CONFIGURABLE_SHIFTS],
}

impl AssetConfig {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this slot has been provisioned with a name.
    pub fn is_named(&self) -> bool {
        !self.name.is_empty()
    }

    /// Configured windows with their slot indices.
    pub fn shifts(&self) -> impl Iterator<Item = (usize, ShiftWindow)> + '_ {
        self.shifts
            .iter()
            .copied()
            .enumerate()
            .filter_map(|(slot, window)| window.map(|window| (slot, window)))
    }
}

/// The bounded configuration store: fixed asset slots, fixed shift slots.
///
/// Every mutating operation validates all inputs before touching any
/// state, so a failed call leaves the store exactly as it was.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ShiftSchedule {
    assets: [AssetConfig; MAX_ASSETS],
}

impl ShiftSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_slot(asset: usize, slot: usize) -> Result<(), ConfigError> {
        if asset >= MAX_ASSETS || slot >= MAX_CONFIGURABLE_SHIFTS {
            return Err(ConfigError::InvalidIndex);
        }

        Ok(())
    }

    /// Sets the start time of one shift slot from a textual `HH:MM`.
    ///
    /// A previously configured end time on the slot is preserved.
    pub fn set_shift(&mut self, asset: usize, slot: usize, start: &str) -> Result<(), ConfigError> {
        Self::check_slot(asset, slot)?;
        let start = ShiftTime::parse(start)?;

        let stored = &mut self.assets[asset].shifts[slot];
        let end = stored.and_then(|window| window.end);
        *stored = Some(ShiftWindow { start, end });
        Ok(())
    }

    /// Configures a full start/end window for one shift slot.
    pub fn set_shift_span(
        &mut self,
        asset: usize,
        slot: usize,
        start: &str,
        end: &str,
    ) -> Result<(), ConfigError> {
        Self::check_slot(asset, slot)?;
        let start = ShiftTime::parse(start)?;
        let end = ShiftTime::parse(end)?;

        self.assets[asset].shifts[slot] = Some(ShiftWindow::spanning(start, end));
        Ok(())
    }

    /// Stores a typed window into one shift slot.
    pub fn set_shift_window(
        &mut self,
        asset: usize,
        slot: usize,
        window: ShiftWindow,
    ) -> Result<(), ConfigError> {
        Self::check_slot(asset, slot)?;
        self.assets[asset].shifts[slot] = Some(window);
        Ok(())
    }

    /// Reads one shift slot; `Ok(None)` means the slot was never set.
    pub fn get_shift(&self, asset: usize, slot: usize) -> Result<Option<ShiftWindow>, ConfigError> {
        Self::check_slot(asset, slot)?;
        Ok(self.assets[asset].shifts[slot])
    }

    /// Returns one shift slot to the not-configured state.
    pub fn clear_shift(&mut self, asset: usize, slot: usize) -> Result<(), ConfigError> {
        Self::check_slot(asset, slot)?;
        self.assets[asset].shifts[slot] = None;
        Ok(())
    }

    /// Names an asset slot. Names must be non-empty and fit
    /// [`ASSET_NAME_BYTES`].
    pub fn set_asset_name(&mut self, asset: usize, name: &str) -> Result<(), ConfigError> {
        if asset >= MAX_ASSETS {
            return Err(ConfigError::InvalidIndex);
        }
        if name.is_empty() {
            return Err(ConfigError::InvalidName);
        }

        let mut stored: String<ASSET_NAME_BYTES> = String::new();
        stored
            .push_str(name)
            .map_err(|()| ConfigError::InvalidName)?;

        self.assets[asset].name = stored;
        Ok(())
    }

    pub fn asset_name(&self, asset: usize) -> Result<&str, ConfigError> {
        self.asset(asset).map(AssetConfig::name)
    }

    pub fn asset(&self, asset: usize) -> Result<&AssetConfig, ConfigError> {
        self.assets.get(asset).ok_or(ConfigError::InvalidIndex)
    }

    /// Index of the first configured window containing `now`, if any.
    pub fn active_shift(
        &self,
        asset: usize,
        now: ShiftTime,
    ) -> Result<Option<usize>, ConfigError> {
        let config = self.asset(asset)?;
        Ok(config
            .shifts()
            .find(|(_, window)| window.contains(now))
            .map(|(slot, _)| slot))
    }

    /// Number of provisioned (named) assets.
    pub fn configured_assets(&self) -> usize {
        self.assets.iter().filter(|asset| asset.is_named()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_valid_clock_values() {
        let time = ShiftTime::parse("06:00").unwrap();
        assert_eq!(time.hour(), 6);
        assert_eq!(time.minute(), 0);
        assert_eq!(format!("{time}"), "06:00");
        assert_eq!(ShiftTime::parse("23:59").unwrap().minutes_from_midnight(), 1439);
        assert_eq!(ShiftTime::parse("00:00").unwrap().minutes_from_midnight(), 0);
    }

    #[test]
    fn parse_rejects_malformed_text() {
        for text in ["24:00", "12:60", "9:00", "12-30", "12:3", "ab:cd", "", "12:345"] {
            assert_eq!(
                ShiftTime::parse(text),
                Err(ConfigError::InvalidTimeFormat),
                "{text:?} should be rejected"
            );
        }
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut schedule = ShiftSchedule::new();
        schedule.set_shift(0, 0, "06:00").unwrap();

        let window = schedule.get_shift(0, 0).unwrap().unwrap();
        assert_eq!(window.start, ShiftTime::parse("06:00").unwrap());
        assert_eq!(window.end, None);
    }

    #[test]
    fn unset_slot_reads_as_not_configured() {
        let schedule = ShiftSchedule::new();
        assert_eq!(schedule.get_shift(9, 4), Ok(None));
    }

    #[test]
    fn out_of_range_indices_are_rejected_without_mutation() {
        let mut schedule = ShiftSchedule::new();

        assert_eq!(
            schedule.set_shift(MAX_ASSETS, 0, "06:00"),
            Err(ConfigError::InvalidIndex)
        );
        assert_eq!(
            schedule.set_shift(0, MAX_CONFIGURABLE_SHIFTS, "06:00"),
            Err(ConfigError::InvalidIndex)
        );
        assert_eq!(schedule, ShiftSchedule::new());
    }

    #[test]
    fn malformed_time_leaves_store_unmodified() {
        let mut schedule = ShiftSchedule::new();
        schedule.set_shift(2, 1, "08:30").unwrap();

        assert_eq!(
            schedule.set_shift(2, 1, "25:00"),
            Err(ConfigError::InvalidTimeFormat)
        );
        let window = schedule.get_shift(2, 1).unwrap().unwrap();
        assert_eq!(window.start, ShiftTime::parse("08:30").unwrap());
    }

    #[test]
    fn updating_a_start_preserves_the_end() {
        let mut schedule = ShiftSchedule::new();
        schedule.set_shift_span(1, 0, "06:00", "14:00").unwrap();
        schedule.set_shift(1, 0, "07:00").unwrap();

        let window = schedule.get_shift(1, 0).unwrap().unwrap();
        assert_eq!(window.start, ShiftTime::parse("07:00").unwrap());
        assert_eq!(window.end, Some(ShiftTime::parse("14:00").unwrap()));
    }

    #[test]
    fn clear_shift_returns_slot_to_not_configured() {
        let mut schedule = ShiftSchedule::new();
        schedule.set_shift(3, 2, "22:00").unwrap();
        schedule.clear_shift(3, 2).unwrap();

        assert_eq!(schedule.get_shift(3, 2), Ok(None));
    }

    #[test]
    fn asset_names_are_validated() {
        let mut schedule = ShiftSchedule::new();

        assert_eq!(schedule.set_asset_name(0, ""), Err(ConfigError::InvalidName));
        assert_eq!(
            schedule.set_asset_name(0, "a name that is far too long"),
            Err(ConfigError::InvalidName)
        );
        assert_eq!(
            schedule.set_asset_name(MAX_ASSETS, "Press"),
            Err(ConfigError::InvalidIndex)
        );

        schedule.set_asset_name(0, "Press").unwrap();
        assert_eq!(schedule.asset_name(0), Ok("Press"));
        assert_eq!(schedule.configured_assets(), 1);
    }

    #[test]
    fn window_containment_handles_day_and_overnight_spans() {
        let day = ShiftWindow::spanning(
            ShiftTime::parse("06:00").unwrap(),
            ShiftTime::parse("14:00").unwrap(),
        );
        assert!(day.contains(ShiftTime::parse("06:00").unwrap()));
        assert!(day.contains(ShiftTime::parse("13:59").unwrap()));
        assert!(!day.contains(ShiftTime::parse("14:00").unwrap()));
        assert!(!day.contains(ShiftTime::parse("05:59").unwrap()));

        let night = ShiftWindow::spanning(
            ShiftTime::parse("22:00").unwrap(),
            ShiftTime::parse("06:00").unwrap(),
        );
        assert!(night.contains(ShiftTime::parse("23:30").unwrap()));
        assert!(night.contains(ShiftTime::parse("05:59").unwrap()));
        assert!(!night.contains(ShiftTime::parse("06:00").unwrap()));
        assert!(!night.contains(ShiftTime::parse("12:00").unwrap()));

        let empty = ShiftWindow::spanning(
            ShiftTime::parse("08:00").unwrap(),
            ShiftTime::parse("08:00").unwrap(),
        );
        assert!(!empty.contains(ShiftTime::parse("08:00").unwrap()));

        let open = ShiftWindow::starting_at(ShiftTime::parse("18:00").unwrap());
        assert!(open.contains(ShiftTime::parse("23:59").unwrap()));
        assert!(!open.contains(ShiftTime::parse("17:59").unwrap()));
    }

    #[test]
    fn active_shift_reports_the_matching_slot() {
        let mut schedule = ShiftSchedule::new();
        schedule.set_shift_span(0, 1, "06:00", "14:00").unwrap();
        schedule.set_shift_span(0, 3, "14:00", "22:00").unwrap();

        assert_eq!(
            schedule.active_shift(0, ShiftTime::parse("09:00").unwrap()),
            Ok(Some(1))
        );
        assert_eq!(
            schedule.active_shift(0, ShiftTime::parse("14:00").unwrap()),
            Ok(Some(3))
        );
        assert_eq!(
            schedule.active_shift(0, ShiftTime::parse("23:00").unwrap()),
            Ok(None)
        );
    }
}
