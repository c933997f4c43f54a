use std::collections::HashMap;

use log::{debug, info, warn};

use crate::document::WorkDay;
use crate::driver::DriverError;
use crate::session::WeekSession;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeekChanges {
    pub edits: usize,
    pub saved: bool,
}

/// Write the loaded document's values onto the selected week, touching only
/// cells whose displayed value differs from the target. Days are visited in
/// column order and projects in row order; the week is saved once at the
/// end, and only if something changed.
pub fn apply_week(
    session: &mut dyn WeekSession,
    by_date: &HashMap<&str, &WorkDay>,
) -> Result<WeekChanges, DriverError> {
    let mut changes = WeekChanges::default();

    let dates = session.week_dates()?;
    for (day, date) in dates.iter().enumerate() {
        let Some(work) = by_date.get(date.as_str()) else {
            debug!("{date} not found in the input file; skip");
            continue;
        };
        // Re-read the project rows per day: committing a cell refreshes the
        // grid and invalidates anything located before it.
        let projects = session.project_rows()?;
        for (row, project) in projects.iter().enumerate() {
            let Some(target) = work.hours.get(project) else {
                // Ambiguous (untracked vs zero), so never overwritten.
                warn!("project {project} not found in the input for {date}; skip");
                continue;
            };
            let target = format!("{target:.1}");
            let current = session.cell_text(row, day)?;
            if current == target {
                continue;
            }
            debug!("{date} {project}: {current:?} -> {target:?}");
            session.set_cell(row, day, &target)?;
            changes.edits += 1;
        }
    }

    if changes.edits > 0 {
        info!("saving week ({} cell edits)", changes.edits);
        session.save_week()?;
        changes.saved = true;
    } else {
        debug!("week unchanged; skip save");
    }

    Ok(changes)
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
