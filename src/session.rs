use crate::driver::DriverError;
use crate::markup::{HoursTable, Table};

/// Per-week contract over the live work-result page, consumed by the month
/// walker and the reconciler. The production implementation drives a
/// browser; tests substitute an in-memory grid.
///
/// Day columns run Monday..Sunday (0..6); project rows are addressed in the
/// grid's own render order.
pub trait WeekSession {
    /// Number of calendar rows rendered for the selected month.
    fn week_rows(&mut self) -> Result<usize, DriverError>;

    /// Select one calendar row's week and wait for the page to settle.
    /// Returns false when the row has no selectable day cell (some
    /// month/weekday alignments render such rows); that is not an error.
    fn select_week(&mut self, row: usize) -> Result<bool, DriverError>;

    /// Snapshot the attendance widget of the selected week.
    fn attendance_table(&mut self) -> Result<Table, DriverError>;

    /// Snapshot the project-hours widget of the selected week.
    fn hours_table(&mut self) -> Result<HoursTable, DriverError>;

    /// The 7 date labels of the selected week, as the grid renders them.
    fn week_dates(&mut self) -> Result<Vec<String>, DriverError>;

    /// Project ids of the grid's data rows, in render order.
    fn project_rows(&mut self) -> Result<Vec<String>, DriverError>;

    /// Displayed text of one hours cell.
    fn cell_text(&mut self, project_row: usize, day: usize) -> Result<String, DriverError>;

    /// Activate one hours cell, type the replacement text, and commit it via
    /// the grid's confirmation action.
    fn set_cell(&mut self, project_row: usize, day: usize, text: &str)
        -> Result<(), DriverError>;

    /// Trigger the selected week's save action.
    fn save_week(&mut self) -> Result<(), DriverError>;

    /// Trigger the selected week's attendance import action.
    fn import_attendance(&mut self) -> Result<(), DriverError>;
}
