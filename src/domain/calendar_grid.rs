use crate::domain::models::{format_long_date, month_name, DateKey};
use crate::domain::task_index::TaskIndex;
use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

pub const DAYS_PER_WEEK: usize = 7;
pub const GRID_WEEKS: usize = 6;
pub const GRID_CELLS: usize = DAYS_PER_WEEK * GRID_WEEKS;

/// Which month a grid cell belongs to, relative to the displayed month.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Membership {
    Previous,
    Current,
    Next,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DayCell {
    pub day_number: u32,
    pub membership: Membership,
    pub calendar_date: NaiveDate,
    pub task_count: usize,
}

impl DayCell {
    pub fn date_key(&self) -> DateKey {
        DateKey::from_date(self.calendar_date)
    }

    pub fn is_current_month(&self) -> bool {
        self.membership == Membership::Current
    }

    pub fn has_tasks(&self) -> bool {
        self.task_count > 0
    }

    pub fn task_count_label(&self) -> Option<String> {
        match self.task_count {
            0 => None,
            1 => Some("1 task".to_string()),
            count => Some(format!("{count} tasks")),
        }
    }

    pub fn describe(&self) -> String {
        let date = format_long_date(self.calendar_date);
        match self.task_count_label() {
            Some(label) => format!("{date} - {label}"),
            None => date,
        }
    }
}

/// The displayed (year, month) pair.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct MonthCursor {
    year: i32,
    month: u32,
}

impl MonthCursor {
    pub fn new(year: i32, month: u32) -> Result<Self, String> {
        first_of_month(year, month)?;
        Ok(Self { year, month })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> Result<NaiveDate, String> {
        first_of_month(self.year, self.month)
    }

    pub fn shift(&self, delta: i32) -> Result<Self, String> {
        let absolute = i64::from(self.year) * 12 + i64::from(self.month) - 1 + i64::from(delta);
        let year = i32::try_from(absolute.div_euclid(12))
            .map_err(|_| format!("month offset {delta} leaves the supported calendar range"))?;
        let month = absolute.rem_euclid(12) as u32 + 1;
        Self::new(year, month)
    }

    pub fn previous(&self) -> Result<Self, String> {
        self.shift(-1)
    }

    pub fn next(&self) -> Result<Self, String> {
        self.shift(1)
    }

    pub fn title(&self) -> String {
        match month_name(self.month) {
            Some(name) => format!("{name} {}", self.year),
            None => format!("{}-{:02}", self.year, self.month),
        }
    }
}

pub fn days_in_month(year: i32, month: u32) -> Result<u32, String> {
    let next = MonthCursor::new(year, month)?.next()?.first_day()?;
    next.pred_opt()
        .map(|last| last.day())
        .ok_or_else(|| format!("no last day for {year}-{month:02}"))
}

/// Builds the fixed 6-week grid for `month`, weeks starting on Sunday.
///
/// Leading cells fill in the tail of the previous month and trailing cells the
/// head of the next month, so every cell carries a real calendar date.
pub fn generate(year: i32, month: u32) -> Result<Vec<DayCell>, String> {
    let first = first_of_month(year, month)?;
    let leading = first.weekday().num_days_from_sunday();
    let grid_start = first
        .checked_sub_days(Days::new(u64::from(leading)))
        .ok_or_else(|| format!("grid for {year}-{month:02} starts before the supported range"))?;

    (0..GRID_CELLS as u64)
        .map(|offset| {
            let calendar_date = grid_start
                .checked_add_days(Days::new(offset))
                .ok_or_else(|| format!("grid for {year}-{month:02} ends after the supported range"))?;
            let membership = if calendar_date < first {
                Membership::Previous
            } else if calendar_date.year() == year && calendar_date.month() == month {
                Membership::Current
            } else {
                Membership::Next
            };
            Ok(DayCell {
                day_number: calendar_date.day(),
                membership,
                calendar_date,
                task_count: 0,
            })
        })
        .collect()
}

pub fn populate(cells: &mut [DayCell], index: &TaskIndex) {
    for cell in cells {
        cell.task_count = index.lookup_date(cell.calendar_date).len();
    }
}

pub fn generate_with_index(cursor: MonthCursor, index: &TaskIndex) -> Result<Vec<DayCell>, String> {
    let mut cells = generate(cursor.year(), cursor.month())?;
    populate(&mut cells, index);
    Ok(cells)
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate, String> {
    if !(1..=12).contains(&month) {
        return Err(format!("month must be between 1 and 12, got {month}"));
    }
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| format!("{year}-{month:02} is outside the supported calendar range"))
}
