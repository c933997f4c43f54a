use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;

use log::{debug, warn};

use crate::document::{Document, WorkDay};
use crate::driver::DriverError;
use crate::extract::{self, StructuralError, DAYS_PER_WEEK};
use crate::reconcile;
use crate::session::WeekSession;

#[derive(Debug)]
pub enum WalkError {
    Driver(DriverError),
    Structural(StructuralError),
}

impl fmt::Display for WalkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalkError::Driver(err) => write!(f, "{}", err),
            WalkError::Structural(err) => write!(f, "{}", err),
        }
    }
}

impl Error for WalkError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WalkError::Driver(err) => Some(err),
            WalkError::Structural(err) => Some(err),
        }
    }
}

impl From<DriverError> for WalkError {
    fn from(value: DriverError) -> Self {
        WalkError::Driver(value)
    }
}

impl From<StructuralError> for WalkError {
    fn from(value: StructuralError) -> Self {
        WalkError::Structural(value)
    }
}

/// Read path: visit every calendar week in order and assemble the month's
/// document. A day is recorded only when its attendance columns were
/// editable; its totals always come from the project-hours header.
pub fn collect_month(session: &mut dyn WeekSession) -> Result<Document, WalkError> {
    let mut projects: BTreeMap<String, String> = BTreeMap::new();
    let mut works: Vec<WorkDay> = Vec::new();

    for row in 0..session.week_rows()? {
        if !session.select_week(row)? {
            debug!("calendar row {}: no selectable day; skip", row + 1);
            continue;
        }

        let attendance = extract::week_attendance(&session.attendance_table()?)?;
        let week = extract::week_hours(&session.hours_table()?)?;
        if attendance.len() != DAYS_PER_WEEK {
            warn!(
                "calendar row {}: {} attendance columns, expected 7",
                row + 1,
                attendance.len()
            );
        }
        if week.days.len() != DAYS_PER_WEEK {
            warn!(
                "calendar row {}: {} hours columns, expected 7",
                row + 1,
                week.days.len()
            );
        }

        for (day, summary) in attendance.into_iter().zip(week.days) {
            let Some(day) = day else { continue };
            works.push(WorkDay {
                date: day.date,
                begin: day.begin,
                end: day.end,
                yokujitsu: day.yokujitsu,
                kyukei: day.kyukei,
                yasumi: day.yasumi,
                sagyou: summary.sagyou,
                fumei: summary.fumei,
                hours: summary.hours,
            });
        }
        // Name collisions across weeks are not cross-checked; the last
        // rendered week wins.
        projects.extend(week.projects);

        debug!("calendar row {}: done", row + 1);
    }

    Ok(Document::new(projects, works))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PutSummary {
    pub edits: usize,
    pub saved_weeks: usize,
}

/// Write path: reconcile every calendar week against the loaded document.
/// Weeks with no differing cells trigger no save action.
pub fn apply_month(
    session: &mut dyn WeekSession,
    document: &Document,
) -> Result<PutSummary, WalkError> {
    let by_date = document.by_date();
    let mut summary = PutSummary::default();

    for row in 0..session.week_rows()? {
        if !session.select_week(row)? {
            debug!("calendar row {}: no selectable day; skip", row + 1);
            continue;
        }
        let changes = reconcile::apply_week(session, &by_date)?;
        summary.edits += changes.edits;
        if changes.saved {
            summary.saved_weeks += 1;
        }
        debug!("calendar row {}: done", row + 1);
    }

    Ok(summary)
}

/// Trigger the grid's attendance import plus save for every selectable week.
pub fn import_month(session: &mut dyn WeekSession) -> Result<usize, WalkError> {
    let mut weeks = 0;
    for row in 0..session.week_rows()? {
        if !session.select_week(row)? {
            debug!("calendar row {}: no selectable day; skip", row + 1);
            continue;
        }
        session.import_attendance()?;
        session.save_week()?;
        weeks += 1;
    }
    Ok(weeks)
}

#[cfg(test)]
#[path = "walker_tests.rs"]
mod tests;
