//! Month arithmetic and block reconciliation for the reservations calendar.
//!
//! The calendar page renders one row of checkboxes per room. Checked boxes
//! are owner blocks. When the page is rendered, the blocks shown for each
//! room are remembered as a [`BlockMap`]; on submit, the posted checkboxes are
//! compared with that map:
//!
//! - a day in the map that was not posted is unblocked;
//! - a posted day missing from the map is blocked.
//!
//! The difference is recomputed from scratch each time, and the caller
//! writes the outcome back as the new map, so posting the same set twice
//! changes nothing the second time.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Months, NaiveDate};

use super::{Error, RestrictionId, RoomId, StayDates, parse_date};

/// Owner blocks shown for one room, keyed by night.
pub type BlockMap = BTreeMap<NaiveDate, RestrictionId>;

/// Field prefix for a newly checked block.
pub const ADD_BLOCK_PREFIX: &str = "add_block_";
/// Field prefix for an existing block left checked.
pub const REMOVE_BLOCK_PREFIX: &str = "remove_block_";

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarMonth {
    first: NaiveDate,
}

impl CalendarMonth {
    /// The month containing `day`.
    #[must_use]
    pub fn containing(day: NaiveDate) -> Self {
        Self {
            first: day.with_day(1).unwrap_or(day),
        }
    }

    /// Month from `?y=&m=` query values, falling back to the month of `today`
    /// when either is missing or invalid.
    #[must_use]
    pub fn from_query(year: Option<&str>, month: Option<&str>, today: NaiveDate) -> Self {
        let parsed = year
            .zip(month)
            .and_then(|(y, m)| Some((y.trim().parse::<i32>().ok()?, m.trim().parse::<u32>().ok()?)))
            .and_then(|(y, m)| NaiveDate::from_ymd_opt(y, m, 1));
        parsed.map_or_else(|| Self::containing(today), Self::containing)
    }

    /// Calendar year.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.first.year()
    }

    /// Calendar month, 1-based.
    #[must_use]
    pub fn month(&self) -> u32 {
        self.first.month()
    }

    /// First day of the month.
    #[must_use]
    pub const fn first_day(&self) -> NaiveDate {
        self.first
    }

    /// The following month.
    #[must_use]
    pub fn next(&self) -> Self {
        Self {
            first: self.first.checked_add_months(Months::new(1)).unwrap_or(self.first),
        }
    }

    /// The preceding month.
    #[must_use]
    pub fn previous(&self) -> Self {
        Self {
            first: self.first.checked_sub_months(Months::new(1)).unwrap_or(self.first),
        }
    }

    /// All nights of the month as the range `[first, first of next month)`.
    #[must_use]
    pub fn range(&self) -> StayDates {
        let next = self
            .first
            .checked_add_months(Months::new(1))
            .unwrap_or(NaiveDate::MAX);
        StayDates::new(self.first, next).unwrap_or_else(|_| StayDates::until_max(self.first))
    }

    /// Every day of the month.
    #[must_use]
    pub fn days(&self) -> Vec<NaiveDate> {
        self.range().nights().collect()
    }
}

/// Checkbox state posted from the calendar, grouped by room.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostedBlocks {
    rooms: BTreeMap<RoomId, BTreeSet<NaiveDate>>,
}

impl PostedBlocks {
    /// Collect `add_block_{room}_{date}` and `remove_block_{room}_{date}`
    /// fields. Other fields are ignored.
    ///
    /// # Errors
    /// Returns an internal error when a block field cannot be parsed.
    pub fn from_fields<'a, I>(fields: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut posted = Self::default();
        for field in fields {
            let Some(rest) = field
                .strip_prefix(ADD_BLOCK_PREFIX)
                .or_else(|| field.strip_prefix(REMOVE_BLOCK_PREFIX))
            else {
                continue;
            };
            let (room, night) = parse_block_field(rest)
                .ok_or_else(|| Error::internal(format!("malformed calendar field: {field}")))?;
            posted.rooms.entry(room).or_default().insert(night);
        }
        Ok(posted)
    }

    /// Rooms named by any posted field.
    pub fn rooms(&self) -> impl Iterator<Item = RoomId> + '_ {
        self.rooms.keys().copied()
    }

    /// Nights checked for `room`.
    #[must_use]
    pub fn nights_for(&self, room: RoomId) -> Option<&BTreeSet<NaiveDate>> {
        self.rooms.get(&room)
    }
}

fn parse_block_field(rest: &str) -> Option<(RoomId, NaiveDate)> {
    let (room, night) = rest.split_once('_')?;
    Some((room.parse().ok()?, parse_date(night)?))
}

/// Field name for a night on the calendar page.
#[must_use]
pub fn block_field_name(room: RoomId, night: NaiveDate, already_blocked: bool) -> String {
    let prefix = if already_blocked {
        REMOVE_BLOCK_PREFIX
    } else {
        ADD_BLOCK_PREFIX
    };
    format!("{prefix}{room}_{}", night.format(super::DATE_FORMAT))
}

/// Work needed to bring the stored blocks in line with a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockChanges {
    /// Nights to block.
    pub to_block: Vec<(RoomId, NaiveDate)>,
    /// Existing blocks to remove.
    pub to_unblock: Vec<(RoomId, NaiveDate, RestrictionId)>,
}

impl BlockChanges {
    /// Compare remembered blocks with the posted checkbox state.
    ///
    /// `shown` holds the block map of every room rendered on the page. A room
    /// that was shown but has no posted fields had every box cleared.
    #[must_use]
    pub fn reconcile(shown: &BTreeMap<RoomId, BlockMap>, posted: &PostedBlocks) -> Self {
        let empty = BTreeSet::new();
        let mut changes = Self::default();

        for (room, blocks) in shown {
            let checked = posted.nights_for(*room).unwrap_or(&empty);
            changes.to_unblock.extend(
                blocks
                    .iter()
                    .filter(|(night, _)| !checked.contains(*night))
                    .map(|(night, id)| (*room, *night, *id)),
            );
        }

        for room in posted.rooms() {
            let blocks = shown.get(&room);
            let checked = posted.nights_for(room).unwrap_or(&empty);
            changes.to_block.extend(
                checked
                    .iter()
                    .filter(|night| blocks.is_none_or(|map| !map.contains_key(*night)))
                    .map(|night| (room, *night)),
            );
        }

        changes
    }

    /// True when nothing needs to change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_block.is_empty() && self.to_unblock.is_empty()
    }
}
