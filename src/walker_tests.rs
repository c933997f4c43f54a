use std::collections::BTreeMap;

use super::{apply_month, collect_month, import_month};
use crate::document::{Document, WorkDay, Yasumi};
use crate::driver::DriverError;
use crate::markup::{Cell, HoursTable, InputState, Table};
use crate::session::WeekSession;

fn text_cell(text: &str) -> Cell {
    Cell {
        text: text.to_string(),
        ..Default::default()
    }
}

fn input_cell(value: &str) -> Cell {
    Cell {
        input: Some(InputState {
            value: Some(value.to_string()),
            aria_checked: None,
        }),
        ..Default::default()
    }
}

fn checkbox_cell(state: &str) -> Cell {
    Cell {
        input: Some(InputState {
            value: None,
            aria_checked: Some(state.to_string()),
        }),
        ..Default::default()
    }
}

fn label_cell(text: &str) -> Cell {
    Cell {
        label: Some(text.to_string()),
        ..Default::default()
    }
}

fn header_cell(text: &str) -> Cell {
    Cell {
        text: text.to_string(),
        spans: vec![String::new(), text.to_string()],
        ..Default::default()
    }
}

fn span_cell(text: &str) -> Cell {
    Cell {
        text: text.to_string(),
        spans: vec![text.to_string()],
        ..Default::default()
    }
}

fn attendance_fixture(dates: [&str; 7], disabled: &[usize]) -> Table {
    let day = |i: usize, cell: Cell| -> Cell {
        if disabled.contains(&i) {
            Cell::default()
        } else {
            cell
        }
    };
    let mut rows = Vec::new();
    {
        let mut cells = vec![text_cell("")];
        cells.extend(dates.iter().map(|date| text_cell(date)));
        rows.push(cells);
    }
    let attribute_rows: [(&str, fn(usize) -> Cell); 5] = [
        ("出社", |_| input_cell("09:00")),
        ("退社", |_| input_cell("17:30")),
        ("翌日", |_| checkbox_cell("false")),
        ("休憩", |_| input_cell("1.0")),
        ("休み", |_| label_cell("")),
    ];
    for (label, make) in attribute_rows {
        let mut cells = vec![text_cell(label)];
        cells.extend((0..7).map(|i| day(i, make(i))));
        rows.push(cells);
    }
    Table { rows }
}

fn hours_fixture(projects: &[(&str, &str, [f64; 7])]) -> HoursTable {
    let number_row = |label: &str, values: [f64; 7]| -> Vec<Cell> {
        let mut cells = vec![header_cell(""); 5];
        cells.push(header_cell(label));
        cells.extend(values.iter().map(|value| header_cell(&format!("{value:.1}"))));
        cells
    };
    let mut label_row = vec![header_cell(""), header_cell(""), header_cell("")];
    label_row.push(header_cell("項目No"));
    label_row.push(header_cell("名称"));
    label_row.push(header_cell(""));
    label_row.extend((0..7).map(|_| header_cell("x")));

    let body = projects
        .iter()
        .map(|(id, name, values)| {
            let mut cells = vec![Cell::default(), Cell::default(), Cell::default()];
            cells.push(span_cell(id));
            cells.push(span_cell(name));
            cells.push(Cell::default());
            cells.extend(values.iter().map(|value| text_cell(&format!("{value:.1}"))));
            cells
        })
        .collect();

    HoursTable {
        head: vec![
            Vec::new(),
            number_row("作業時間", [7.5, 7.5, 7.5, 7.5, 7.5, 0.0, 0.0]),
            number_row("不明時間", [0.0; 7]),
            label_row,
        ],
        body,
    }
}

struct FakeWeek {
    selectable: bool,
    attendance: Table,
    hours: HoursTable,
    dates: Vec<String>,
    projects: Vec<String>,
    cells: Vec<Vec<String>>,
}

impl FakeWeek {
    fn unselectable() -> Self {
        FakeWeek {
            selectable: false,
            attendance: Table::default(),
            hours: HoursTable::default(),
            dates: Vec::new(),
            projects: Vec::new(),
            cells: Vec::new(),
        }
    }

    fn grid(dates: [&str; 7], projects: &[(&str, [&str; 7])]) -> Self {
        FakeWeek {
            selectable: true,
            attendance: Table::default(),
            hours: HoursTable::default(),
            dates: dates.iter().map(|s| s.to_string()).collect(),
            projects: projects.iter().map(|(id, _)| id.to_string()).collect(),
            cells: projects
                .iter()
                .map(|(_, row)| row.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }
}

struct FakeSession {
    weeks: Vec<FakeWeek>,
    selected: Option<usize>,
    edits: Vec<(usize, usize, usize, String)>,
    saves: Vec<usize>,
    imports: Vec<usize>,
}

impl FakeSession {
    fn new(weeks: Vec<FakeWeek>) -> Self {
        FakeSession {
            weeks,
            selected: None,
            edits: Vec::new(),
            saves: Vec::new(),
            imports: Vec::new(),
        }
    }

    fn current(&mut self) -> &mut FakeWeek {
        let selected = self.selected.expect("a week should be selected");
        &mut self.weeks[selected]
    }
}

impl WeekSession for FakeSession {
    fn week_rows(&mut self) -> Result<usize, DriverError> {
        Ok(self.weeks.len())
    }

    fn select_week(&mut self, row: usize) -> Result<bool, DriverError> {
        if !self.weeks[row].selectable {
            return Ok(false);
        }
        self.selected = Some(row);
        Ok(true)
    }

    fn attendance_table(&mut self) -> Result<Table, DriverError> {
        Ok(self.current().attendance.clone())
    }

    fn hours_table(&mut self) -> Result<HoursTable, DriverError> {
        Ok(self.current().hours.clone())
    }

    fn week_dates(&mut self) -> Result<Vec<String>, DriverError> {
        Ok(self.current().dates.clone())
    }

    fn project_rows(&mut self) -> Result<Vec<String>, DriverError> {
        Ok(self.current().projects.clone())
    }

    fn cell_text(&mut self, project_row: usize, day: usize) -> Result<String, DriverError> {
        Ok(self.current().cells[project_row][day].clone())
    }

    fn set_cell(
        &mut self,
        project_row: usize,
        day: usize,
        text: &str,
    ) -> Result<(), DriverError> {
        let selected = self.selected.expect("a week should be selected");
        self.weeks[selected].cells[project_row][day] = text.to_string();
        self.edits.push((selected, project_row, day, text.to_string()));
        Ok(())
    }

    fn save_week(&mut self) -> Result<(), DriverError> {
        let selected = self.selected.expect("a week should be selected");
        self.saves.push(selected);
        Ok(())
    }

    fn import_attendance(&mut self) -> Result<(), DriverError> {
        let selected = self.selected.expect("a week should be selected");
        self.imports.push(selected);
        Ok(())
    }
}

const WEEK1: [&str; 7] = [
    "7/27(月)",
    "7/28(火)",
    "7/29(水)",
    "7/30(木)",
    "7/31(金)",
    "8/1(土)",
    "8/2(日)",
];

#[test]
fn collects_weeks_in_order_and_drops_disabled_days() {
    let week1 = FakeWeek {
        selectable: true,
        attendance: attendance_fixture(WEEK1, &[5, 6]),
        hours: hours_fixture(&[("project0", "Project Zero", [7.5; 7])]),
        ..FakeWeek::unselectable()
    };
    let week2 = FakeWeek {
        selectable: true,
        attendance: attendance_fixture(
            [
                "8/3(月)",
                "8/4(火)",
                "8/5(水)",
                "8/6(木)",
                "8/7(金)",
                "8/8(土)",
                "8/9(日)",
            ],
            &[],
        ),
        hours: hours_fixture(&[
            ("project0", "Project Zero Renamed", [0.0; 7]),
            ("project1", "Project One", [4.0; 7]),
        ]),
        ..FakeWeek::unselectable()
    };
    let mut session = FakeSession::new(vec![week1, week2]);

    let document = collect_month(&mut session).expect("collect should succeed");

    assert_eq!(document.version, "3.0.0");
    assert_eq!(document.works.len(), 5 + 7);
    assert_eq!(document.works[0].date, "7/27(月)");
    assert_eq!(document.works[5].date, "8/3(月)");
    assert_eq!(document.works[0].sagyou, 7.5);
    assert_eq!(document.works[0].hours["project0"], 7.5);
    // Weekend columns of week 1 were not editable.
    assert!(!document.works.iter().any(|work| work.date == "8/1(土)"));

    // Later weeks win project-name collisions.
    assert_eq!(document.projects["project0"], "Project Zero Renamed");
    assert_eq!(document.projects["project1"], "Project One");
}

#[test]
fn skips_rows_without_selectable_days() {
    let week = FakeWeek {
        selectable: true,
        attendance: attendance_fixture(WEEK1, &[]),
        hours: hours_fixture(&[("project0", "Project Zero", [7.5; 7])]),
        ..FakeWeek::unselectable()
    };
    let mut session = FakeSession::new(vec![FakeWeek::unselectable(), week]);

    let document = collect_month(&mut session).expect("collect should succeed");
    assert_eq!(document.works.len(), 7);
}

#[test]
fn structural_problems_abort_the_whole_month() {
    let mut broken = FakeWeek {
        selectable: true,
        attendance: attendance_fixture(WEEK1, &[]),
        hours: hours_fixture(&[("project0", "Project Zero", [7.5; 7])]),
        ..FakeWeek::unselectable()
    };
    broken.attendance.rows.pop();
    let mut session = FakeSession::new(vec![broken]);

    assert!(matches!(
        collect_month(&mut session),
        Err(super::WalkError::Structural(_))
    ));
}

fn week_document(dates: [&str; 7], project: &str, value: f64) -> Document {
    let works = dates
        .iter()
        .map(|date| WorkDay {
            date: date.to_string(),
            begin: "09:00".to_string(),
            end: "17:30".to_string(),
            yokujitsu: false,
            kyukei: 1.0,
            yasumi: Yasumi::None,
            sagyou: 7.5,
            fumei: 0.0,
            hours: [(project.to_string(), value)].into_iter().collect(),
        })
        .collect();
    Document::new(BTreeMap::new(), works)
}

#[test]
fn apply_month_saves_only_changed_weeks() {
    let matching = FakeWeek::grid(WEEK1, &[("project0", ["7.5"; 7])]);
    let mut differing = FakeWeek::grid(
        [
            "8/3(月)",
            "8/4(火)",
            "8/5(水)",
            "8/6(木)",
            "8/7(金)",
            "8/8(土)",
            "8/9(日)",
        ],
        &[("project0", ["7.5"; 7])],
    );
    differing.cells[0][3] = "0.0".to_string();

    let mut works = week_document(WEEK1, "project0", 7.5).works;
    works.extend(
        week_document(
            [
                "8/3(月)",
                "8/4(火)",
                "8/5(水)",
                "8/6(木)",
                "8/7(金)",
                "8/8(土)",
                "8/9(日)",
            ],
            "project0",
            7.5,
        )
        .works,
    );
    let document = Document::new(BTreeMap::new(), works);

    let mut session = FakeSession::new(vec![matching, differing]);
    let summary = apply_month(&mut session, &document).expect("apply should succeed");

    assert_eq!(summary.edits, 1);
    assert_eq!(summary.saved_weeks, 1);
    assert_eq!(session.saves, vec![1]);
    assert_eq!(session.edits, vec![(1, 0, 3, "7.5".to_string())]);
}

#[test]
fn import_month_runs_import_and_save_per_selectable_week() {
    let mut session = FakeSession::new(vec![
        FakeWeek::grid(WEEK1, &[]),
        FakeWeek::unselectable(),
        FakeWeek::grid(WEEK1, &[]),
    ]);
    let weeks = import_month(&mut session).expect("import should succeed");
    assert_eq!(weeks, 2);
    assert_eq!(session.imports, vec![0, 2]);
    assert_eq!(session.saves, vec![0, 2]);
}
