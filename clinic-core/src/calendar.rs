//! Six-week month grid used by the appointment calendar.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::Record;

/// Cells in a rendered month: six Sunday-first weeks.
pub const GRID_CELLS: usize = 42;
pub const DAYS_PER_WEEK: usize = 7;

// Keeps the grid (first day minus 6, plus 41) inside chrono's supported range.
const MIN_YEAR: i32 = -262_000;
const MAX_YEAR: i32 = 262_000;

/// One day slot in the grid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub is_current_month: bool,
    pub is_today: bool,
    pub is_selected: bool,
    pub match_count: usize,
}

/// Source of per-day record counts.
pub trait DateCounter {
    fn count_on(&self, date: NaiveDate) -> usize;
}

impl<S: BuildHasher> DateCounter for HashMap<NaiveDate, usize, S> {
    fn count_on(&self, date: NaiveDate) -> usize {
        self.get(&date).copied().unwrap_or(0)
    }
}

impl DateCounter for BTreeMap<NaiveDate, usize> {
    fn count_on(&self, date: NaiveDate) -> usize {
        self.get(&date).copied().unwrap_or(0)
    }
}

/// Adapts a closure into a [`DateCounter`].
pub struct CountWith<F>(pub F);

impl<F> DateCounter for CountWith<F>
where
    F: Fn(NaiveDate) -> usize,
{
    fn count_on(&self, date: NaiveDate) -> usize {
        (self.0)(date)
    }
}

/// Counts records per date. Records without a date are skipped.
pub fn count_by_date<'a, R, I>(records: I) -> BTreeMap<NaiveDate, usize>
where
    R: Record + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut counts = BTreeMap::new();
    for date in records.into_iter().filter_map(Record::date) {
        *counts.entry(date).or_insert(0) += 1;
    }
    counts
}

/// A displayed month. `month0` is 0-based (January = 0).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "MonthFields")]
pub struct MonthCursor {
    year: i32,
    month0: u32,
}

#[derive(Deserialize)]
struct MonthFields {
    year: i32,
    month0: u32,
}

impl TryFrom<MonthFields> for MonthCursor {
    type Error = String;

    fn try_from(fields: MonthFields) -> Result<Self, Self::Error> {
        if fields.month0 >= 12 {
            return Err(format!("month0 must be below 12, got {}", fields.month0));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&fields.year) {
            return Err(format!("year {} is out of range", fields.year));
        }
        Ok(Self {
            year: fields.year,
            month0: fields.month0,
        })
    }
}

impl MonthCursor {
    /// Normalizes any month index with calendar rollover: `-1` is December of
    /// the previous year, `12` is January of the next.
    pub fn new(year: i32, month_index: i32) -> Self {
        let year = year
            .saturating_add(month_index.div_euclid(12))
            .clamp(MIN_YEAR, MAX_YEAR);
        Self {
            year,
            month0: month_index.rem_euclid(12) as u32,
        }
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month0: date.month0(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month0(&self) -> u32 {
        self.month0
    }

    /// 1-based month number.
    pub fn month(&self) -> u32 {
        self.month0 + 1
    }

    pub fn previous(self) -> Self {
        Self::new(self.year, self.month0 as i32 - 1)
    }

    pub fn next(self) -> Self {
        Self::new(self.year, self.month0 as i32 + 1)
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month(), 1).unwrap_or_default()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month0() == self.month0
    }

    /// Heading such as `January 2025`.
    pub fn title(&self) -> String {
        self.first_day().format("%B %Y").to_string()
    }
}

/// A built month view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthGrid {
    pub cursor: MonthCursor,
    pub cells: Vec<CalendarCell>,
}

impl MonthGrid {
    /// Builds the grid for `(year, month_index)`; see [`MonthCursor::new`] for
    /// how out-of-range month indexes roll over.
    pub fn build<C>(
        year: i32,
        month_index: i32,
        today: NaiveDate,
        selected: Option<NaiveDate>,
        counts: &C,
    ) -> Self
    where
        C: DateCounter + ?Sized,
    {
        Self::for_cursor(MonthCursor::new(year, month_index), today, selected, counts)
    }

    pub fn for_cursor<C>(
        cursor: MonthCursor,
        today: NaiveDate,
        selected: Option<NaiveDate>,
        counts: &C,
    ) -> Self
    where
        C: DateCounter + ?Sized,
    {
        let first = cursor.first_day();
        let lead = u64::from(first.weekday().num_days_from_sunday());
        let start = first.checked_sub_days(Days::new(lead)).unwrap_or(first);

        let cells = start
            .iter_days()
            .take(GRID_CELLS)
            .map(|date| CalendarCell {
                date,
                is_current_month: cursor.contains(date),
                is_today: date == today,
                is_selected: selected == Some(date),
                match_count: counts.count_on(date),
            })
            .collect();

        Self { cursor, cells }
    }

    /// Rows of seven cells, Sunday through Saturday.
    pub fn weeks(&self) -> impl Iterator<Item = &[CalendarCell]> + '_ {
        self.cells.chunks(DAYS_PER_WEEK)
    }

    pub fn cell(&self, date: NaiveDate) -> Option<&CalendarCell> {
        self.cells.iter().find(|cell| cell.date == date)
    }

    /// Records falling on days of the displayed month only.
    pub fn month_total(&self) -> usize {
        self.cells
            .iter()
            .filter(|cell| cell.is_current_month)
            .map(|cell| cell.match_count)
            .sum()
    }
}
