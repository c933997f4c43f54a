use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Format generation written by `get`. Older generations ("0.1.0", "0.3.0")
/// are still accepted by the loader and upgraded in memory.
pub const CURRENT_VERSION: &str = "3.0.0";

/// Leave type for one day, as rendered by the work grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Yasumi {
    #[default]
    #[serde(rename = "")]
    None,
    #[serde(rename = "全休")]
    FullDay,
    #[serde(rename = "午前")]
    Morning,
    #[serde(rename = "午後")]
    Afternoon,
}

impl Yasumi {
    pub const ALL: [Yasumi; 4] = [
        Yasumi::None,
        Yasumi::FullDay,
        Yasumi::Morning,
        Yasumi::Afternoon,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Yasumi::None => "",
            Yasumi::FullDay => "全休",
            Yasumi::Morning => "午前",
            Yasumi::Afternoon => "午後",
        }
    }

    pub fn parse(value: &str) -> Option<Yasumi> {
        match value {
            "" => Some(Yasumi::None),
            "全休" => Some(Yasumi::FullDay),
            "午前" => Some(Yasumi::Morning),
            "午後" => Some(Yasumi::Afternoon),
            _ => None,
        }
    }
}

impl fmt::Display for Yasumi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One calendar day of attendance and per-project hours.
///
/// `date` is kept in the grid's own label form (e.g. "7/27(月)") because it
/// is the join key against whatever week the page currently renders; parsing
/// it into a calendar date would only make the join harder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkDay {
    pub date: String,
    pub begin: String,
    pub end: String,
    pub yokujitsu: bool,
    pub kyukei: f64,
    pub yasumi: Yasumi,
    pub sagyou: f64,
    pub fumei: f64,
    pub hours: BTreeMap<String, f64>,
}

/// The persisted unit: project names plus the month's work days in the
/// order the calendar produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub version: String,
    pub projects: BTreeMap<String, String>,
    pub works: Vec<WorkDay>,
}

impl Document {
    pub fn new(projects: BTreeMap<String, String>, works: Vec<WorkDay>) -> Self {
        Self {
            version: CURRENT_VERSION.to_string(),
            projects,
            works,
        }
    }

    /// Date-label lookup used by the write path.
    pub fn by_date(&self) -> HashMap<&str, &WorkDay> {
        self.works
            .iter()
            .map(|work| (work.date.as_str(), work))
            .collect()
    }

    /// Render the on-disk form: 2-space indentation, `projects` fully
    /// pretty-printed, each `works` element compact on its own line so the
    /// file diffs day-by-day.
    pub fn render(&self) -> Result<String, serde_json::Error> {
        let projects = indent_continuation_lines(&serde_json::to_string_pretty(&self.projects)?);

        let mut out = String::new();
        out.push_str("{\n");
        out.push_str(&format!(
            "  \"version\": {},\n",
            serde_json::to_string(&self.version)?
        ));
        out.push_str(&format!("  \"projects\": {projects},\n"));
        if self.works.is_empty() {
            out.push_str("  \"works\": []\n");
        } else {
            out.push_str("  \"works\": [\n");
            for (i, work) in self.works.iter().enumerate() {
                out.push_str("    ");
                out.push_str(&serde_json::to_string(work)?);
                out.push_str(if i + 1 == self.works.len() { "\n" } else { ",\n" });
            }
            out.push_str("  ]\n");
        }
        out.push_str("}\n");
        Ok(out)
    }
}

fn indent_continuation_lines(text: &str) -> String {
    let mut lines = text.lines();
    let mut out = String::with_capacity(text.len());
    if let Some(first) = lines.next() {
        out.push_str(first);
    }
    for line in lines {
        out.push_str("\n  ");
        out.push_str(line);
    }
    out
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
