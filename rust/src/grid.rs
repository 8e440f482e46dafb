//! Recurring weekly grid of an instructor: six days of fixed-length slot rows.

use crate::models::{Cell, Day, TOTAL_SLOTS};

/// Pad with `Free` or truncate so the row has exactly `total_slots` cells.
///
/// A missing row (`None`) becomes a fully free row. Total: never fails.
pub fn normalize(cells: Option<Vec<Cell>>, total_slots: usize) -> Vec<Cell> {
    let Some(mut cells) = cells else {
        return vec![Cell::Free; total_slots];
    };
    cells.resize(total_slots, Cell::Free);
    cells
}

/// An instructor's permanent weekly occupancy.
///
/// Invariant: every day row holds exactly `TOTAL_SLOTS` cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduleGrid {
    days: [Vec<Cell>; 6],
}

impl Default for ScheduleGrid {
    fn default() -> Self {
        Self::free()
    }
}

impl ScheduleGrid {
    /// A grid with every slot free.
    pub fn free() -> Self {
        Self {
            days: std::array::from_fn(|_| normalize(None, TOTAL_SLOTS)),
        }
    }

    /// Build a grid from per-day rows, normalizing each. Days not listed are free.
    pub fn from_rows(rows: impl IntoIterator<Item = (Day, Vec<Cell>)>) -> Self {
        let mut grid = Self::free();
        for (day, cells) in rows {
            grid.days[day.index()] = normalize(Some(cells), TOTAL_SLOTS);
        }
        grid
    }

    /// Decode a stored document of `day key -> serialized cells`.
    ///
    /// Unknown day keys are dropped; rows are normalized; malformed cells are
    /// kept as `Cell::Unrecognized`.
    pub fn from_document<'a, I, R>(document: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, R)>,
        R: IntoIterator,
        R::Item: AsRef<str>,
    {
        let rows = document.into_iter().filter_map(|(key, raw)| {
            let day = Day::parse(key)?;
            let cells = raw
                .into_iter()
                .map(|s| Cell::from_stored(s.as_ref()))
                .collect();
            Some((day, cells))
        });
        Self::from_rows(rows)
    }

    /// Encode as `(day key, serialized cells)` pairs in calendar order.
    pub fn to_document(&self) -> Vec<(&'static str, Vec<String>)> {
        Day::ALL
            .into_iter()
            .map(|day| {
                let cells = self.row(day).iter().map(|c| c.to_string()).collect();
                (day.key(), cells)
            })
            .collect()
    }

    pub fn row(&self, day: Day) -> &[Cell] {
        &self.days[day.index()]
    }

    /// Cell at `(day, slot)`, or `None` when the slot is out of range.
    pub fn cell(&self, day: Day, slot: usize) -> Option<&Cell> {
        self.days[day.index()].get(slot)
    }

    /// Replace a cell, returning the previous value. Out-of-range slots are ignored.
    pub fn set(&mut self, day: Day, slot: usize, cell: Cell) -> Option<Cell> {
        self.days[day.index()]
            .get_mut(slot)
            .map(|current| std::mem::replace(current, cell))
    }

    /// Iterate every cell with its coordinates.
    pub fn cells(&self) -> impl Iterator<Item = (Day, usize, &Cell)> + '_ {
        Day::ALL.into_iter().flat_map(move |day| {
            self.row(day)
                .iter()
                .enumerate()
                .map(move |(slot, cell)| (day, slot, cell))
        })
    }

    /// Reset every cell matching the predicate to `Free`; returns how many changed.
    pub fn clear_where(&mut self, mut predicate: impl FnMut(&Cell) -> bool) -> usize {
        let mut cleared = 0;
        for row in self.days.iter_mut() {
            for cell in row.iter_mut() {
                if !cell.is_free() && predicate(cell) {
                    *cell = Cell::Free;
                    cleared += 1;
                }
            }
        }
        cleared
    }

    /// Number of occupied cells across the week.
    pub fn load(&self) -> usize {
        self.cells().filter(|(_, _, c)| !c.is_free()).count()
    }
}
