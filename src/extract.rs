use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;

use log::warn;

use crate::document::Yasumi;
use crate::markup::{Cell, HoursTable, Table};

pub const DAYS_PER_WEEK: usize = 7;

/// Leading label/marker columns before the first weekday column in the
/// project-hours widget: checkbox, two spacers, item no, name, and the
/// summary-row label column.
const HOURS_FIRST_DAY_COLUMN: usize = 6;
const HOURS_COLUMNS: usize = HOURS_FIRST_DAY_COLUMN + DAYS_PER_WEEK;

/// The page no longer looks the way the reader expects. Fatal: retrying
/// against the same layout cannot succeed, and continuing would corrupt
/// every following week the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralError {
    message: String,
}

impl StructuralError {
    pub fn new(message: impl Into<String>) -> Self {
        StructuralError {
            message: message.into(),
        }
    }
}

impl fmt::Display for StructuralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for StructuralError {}

/// The attendance subset of one day. Emitted only when every attribute was
/// editable; a day rendered read-only (adjacent month) yields `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Attendance {
    pub date: String,
    pub begin: String,
    pub end: String,
    pub yokujitsu: bool,
    pub kyukei: f64,
    pub yasumi: Yasumi,
}

/// Per-day totals and project hours from the project-hours widget.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySummary {
    pub sagyou: f64,
    pub fumei: f64,
    pub hours: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeekHours {
    pub days: Vec<DaySummary>,
    pub projects: BTreeMap<String, String>,
}

const ATTENDANCE_ROW_LABELS: [&str; 6] = ["", "出社", "退社", "翌日", "休憩", "休み"];

/// Parse the 6-row attendance widget into one entry per weekday column.
pub fn week_attendance(table: &Table) -> Result<Vec<Option<Attendance>>, StructuralError> {
    if table.rows.len() != ATTENDANCE_ROW_LABELS.len() {
        return Err(StructuralError::new(format!(
            "attendance table: expected 6 rows (日付/出社/退社/翌日/休憩/休み), found {}",
            table.rows.len()
        )));
    }
    for (i, row) in table.rows.iter().enumerate() {
        if row.len() != DAYS_PER_WEEK + 1 {
            return Err(StructuralError::new(format!(
                "attendance table row {}: expected 8 cells (label + 月..日), found {}",
                i + 1,
                row.len()
            )));
        }
        if row[0].text != ATTENDANCE_ROW_LABELS[i] {
            return Err(StructuralError::new(format!(
                "attendance table row {} column 1: expected {:?}, found {:?}",
                i + 1,
                ATTENDANCE_ROW_LABELS[i],
                row[0].text
            )));
        }
    }

    let dates = date_row(&table.rows[0])?;
    let begins = input_row(&table.rows[1], 2, "出社")?;
    let ends = input_row(&table.rows[2], 3, "退社")?;
    let yokujitsus = checkbox_row(&table.rows[3], 4, "翌日")?;
    let kyukeis = break_row(&table.rows[4])?;
    let yasumis = leave_row(&table.rows[5], 6, "休み")?;

    let mut week = Vec::with_capacity(DAYS_PER_WEEK);
    for i in 0..DAYS_PER_WEEK {
        let attendance = match (
            begins[i].as_ref(),
            ends[i].as_ref(),
            yokujitsus[i],
            kyukeis[i],
            yasumis[i],
        ) {
            (Some(begin), Some(end), Some(yokujitsu), Some(kyukei), Some(yasumi)) => {
                Some(Attendance {
                    date: dates[i].clone(),
                    begin: begin.clone(),
                    end: end.clone(),
                    yokujitsu,
                    kyukei,
                    yasumi,
                })
            }
            _ => None,
        };
        week.push(attendance);
    }
    Ok(week)
}

fn date_row(row: &[Cell]) -> Result<Vec<String>, StructuralError> {
    let mut dates = Vec::with_capacity(DAYS_PER_WEEK);
    for (i, cell) in row.iter().skip(1).enumerate() {
        if !is_date_label(&cell.text) {
            return Err(StructuralError::new(format!(
                "attendance table row 1 column {} (日付): unrecognized date label {:?}",
                i + 2,
                cell.text
            )));
        }
        dates.push(cell.text.clone());
    }
    Ok(dates)
}

/// "M/D(曜)" with 1-2 digit month and day and a weekday in parentheses.
fn is_date_label(text: &str) -> bool {
    const WEEKDAYS: [&str; 7] = ["月", "火", "水", "木", "金", "土", "日"];
    let Some((month_day, rest)) = text.split_once('(') else {
        return false;
    };
    let Some((month, day)) = month_day.split_once('/') else {
        return false;
    };
    let digits = |s: &str| (1..=2).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit());
    let Some(weekday) = rest.strip_suffix(')') else {
        return false;
    };
    digits(month) && digits(day) && WEEKDAYS.contains(&weekday)
}

/// Rows whose value lives in a text input. No input at all means the column
/// belongs to the adjacent month; an input without a value is a page bug.
fn input_row(row: &[Cell], row_no: usize, kind: &str) -> Result<Vec<Option<String>>, StructuralError> {
    row.iter()
        .skip(1)
        .enumerate()
        .map(|(i, cell)| match &cell.input {
            None => Ok(None),
            Some(input) => match &input.value {
                Some(value) => Ok(Some(value.clone())),
                None => Err(StructuralError::new(format!(
                    "attendance table row {row_no} column {} ({kind}): input has no value",
                    i + 2
                ))),
            },
        })
        .collect()
}

fn checkbox_row(
    row: &[Cell],
    row_no: usize,
    kind: &str,
) -> Result<Vec<Option<bool>>, StructuralError> {
    row.iter()
        .skip(1)
        .enumerate()
        .map(|(i, cell)| match &cell.input {
            None => Ok(None),
            Some(input) => match input.aria_checked.as_deref() {
                Some("true") => Ok(Some(true)),
                Some("false") => Ok(Some(false)),
                other => Err(StructuralError::new(format!(
                    "attendance table row {row_no} column {} ({kind}): aria-checked={:?}",
                    i + 2,
                    other
                ))),
            },
        })
        .collect()
}

fn break_row(row: &[Cell]) -> Result<Vec<Option<f64>>, StructuralError> {
    input_row(row, 5, "休憩")?
        .into_iter()
        .map(|value| match value {
            None => Ok(None),
            Some(text) => parse_number(&text)
                .map(Some)
                .ok_or_else(|| StructuralError::new(format!("attendance table (休憩: {text:?})"))),
        })
        .collect()
}

fn leave_row(
    row: &[Cell],
    row_no: usize,
    kind: &str,
) -> Result<Vec<Option<Yasumi>>, StructuralError> {
    row.iter()
        .skip(1)
        .enumerate()
        .map(|(i, cell)| match &cell.label {
            None => Ok(None),
            Some(text) => Yasumi::parse(text).map(Some).ok_or_else(|| {
                StructuralError::new(format!(
                    "attendance table row {row_no} column {} ({kind}): selected option {:?}",
                    i + 2,
                    text
                ))
            }),
        })
        .collect()
}

/// Parse the project-hours widget: per-day worked/unaccounted totals from
/// the header block, per-project hours from the data rows, plus the project
/// id → name mapping observed this week.
pub fn week_hours(table: &HoursTable) -> Result<WeekHours, StructuralError> {
    anchor(table, 1, 5, "作業時間")?;
    anchor(table, 2, 5, "不明時間")?;
    anchor(table, 3, 3, "項目No")?;
    anchor(table, 3, 4, "名称")?;

    let sagyou = header_series(&table.head[1], "作業時間")?;
    let fumei = header_series(&table.head[2], "不明時間")?;

    let date_columns = table.head[3].len().saturating_sub(HOURS_FIRST_DAY_COLUMN);
    if date_columns != DAYS_PER_WEEK {
        warn!("hours table: header date row has {date_columns} day columns, expected 7");
    }

    let mut projects = BTreeMap::new();
    let mut per_project: Vec<(String, Vec<f64>)> = Vec::new();
    for (i, row) in table.body.iter().enumerate() {
        if row.len() != HOURS_COLUMNS {
            warn!(
                "hours table: project row {} has {} cells, expected {HOURS_COLUMNS}; skipped",
                i + 1,
                row.len()
            );
            continue;
        }
        let id = span_or_text(&row[3]);
        let name = span_or_text(&row[4]);
        let mut values = Vec::with_capacity(DAYS_PER_WEEK);
        for (day, cell) in row[HOURS_FIRST_DAY_COLUMN..].iter().enumerate() {
            let value = parse_number(&cell.text).ok_or_else(|| {
                StructuralError::new(format!(
                    "hours table: project {:?} day column {}: not a number: {:?}",
                    id,
                    day + 1,
                    cell.text
                ))
            })?;
            values.push(value);
        }
        projects.insert(id.clone(), name);
        per_project.push((id, values));
    }

    let mut days = Vec::with_capacity(DAYS_PER_WEEK);
    for i in 0..DAYS_PER_WEEK {
        let hours = per_project
            .iter()
            .map(|(id, values)| (id.clone(), values[i]))
            .collect();
        days.push(DaySummary {
            sagyou: sagyou.get(i).copied().flatten().unwrap_or(0.0),
            fumei: fumei.get(i).copied().flatten().unwrap_or(0.0),
            hours,
        });
    }

    Ok(WeekHours { days, projects })
}

fn anchor(
    table: &HoursTable,
    row: usize,
    column: usize,
    expected: &str,
) -> Result<(), StructuralError> {
    let found = table
        .head
        .get(row)
        .and_then(|cells| cells.get(column))
        .map(header_text)
        .unwrap_or_default();
    if found != expected {
        return Err(StructuralError::new(format!(
            "hours table: header row {} column {}: expected {:?}, found {:?}",
            row + 1,
            column + 1,
            expected,
            found
        )));
    }
    Ok(())
}

/// One header row's 7-wide numeric series: drop the leading label/marker
/// columns, keep empty cells as "not tracked" placeholders, hard-fail on
/// anything non-numeric.
fn header_series(row: &[Cell], kind: &str) -> Result<Vec<Option<f64>>, StructuralError> {
    let series: Result<Vec<Option<f64>>, StructuralError> = row
        .iter()
        .map(|cell| {
            let text = header_text(cell);
            if text.is_empty() || text == kind {
                return Ok(None);
            }
            parse_number(&text)
                .map(Some)
                .ok_or_else(|| StructuralError::new(format!("hours table: {kind}: {text:?}")))
        })
        .collect();
    let series: Vec<Option<f64>> = series?
        .into_iter()
        .skip(HOURS_FIRST_DAY_COLUMN)
        .collect();
    if series.len() != DAYS_PER_WEEK {
        warn!(
            "hours table: {kind} series has {} day columns, expected 7",
            series.len()
        );
    }
    Ok(series)
}

/// Header cells wrap their text in a second decorative span.
fn header_text(cell: &Cell) -> String {
    cell.spans
        .get(1)
        .or_else(|| cell.spans.first())
        .cloned()
        .unwrap_or_else(|| cell.text.clone())
}

fn span_or_text(cell: &Cell) -> String {
    cell.spans
        .first()
        .filter(|span| !span.is_empty())
        .cloned()
        .unwrap_or_else(|| cell.text.clone())
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

#[cfg(test)]
#[path = "extract_tests.rs"]
mod tests;
