use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::path::Path;

use serde_json::{Map, Value};

use crate::document::{Document, WorkDay, Yasumi, CURRENT_VERSION};

const KNOWN_VERSIONS: [&str; 3] = ["0.1.0", "0.3.0", "3.0.0"];

/// Input-file problem. Fatal; the caller aborts the run without retrying.
#[derive(Debug)]
pub enum ValidationError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Shape { path: String, message: String },
}

impl ValidationError {
    fn shape(path: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::Shape {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Io(err) => write!(f, "unable to read input: {}", err),
            ValidationError::Json(err) => write!(f, "invalid JSON: {}", err),
            ValidationError::Shape { path, message } => {
                write!(f, "invalid JSON: {}: {}", path, message)
            }
        }
    }
}

impl Error for ValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ValidationError::Io(err) => Some(err),
            ValidationError::Json(err) => Some(err),
            ValidationError::Shape { .. } => None,
        }
    }
}

impl From<std::io::Error> for ValidationError {
    fn from(value: std::io::Error) -> Self {
        ValidationError::Io(value)
    }
}

impl From<serde_json::Error> for ValidationError {
    fn from(value: serde_json::Error) -> Self {
        ValidationError::Json(value)
    }
}

/// A work day as the two legacy generations carry it: legacy field names,
/// `fumei` still optional (adjacent-month days).
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyWorkDay {
    pub date: String,
    pub begin: String,
    pub end: String,
    pub yokujitsu: bool,
    pub kyukei: f64,
    pub yasumi: Yasumi,
    pub sagyou: f64,
    pub fumei: Option<f64>,
    pub jisseki: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegacyDocument {
    pub projects: BTreeMap<String, String>,
    pub jissekis: Vec<LegacyWorkDay>,
}

/// One value per known generation. "0.1.0" carries its numerics as strings
/// on disk; its validator coerces them, so both legacy generations share the
/// in-memory shape and `upgrade` only has to normalize `fumei` and rename
/// `jissekis`/`jisseki` to `works`/`hours`.
#[derive(Debug, Clone, PartialEq)]
pub enum VersionedDocument {
    V1(LegacyDocument),
    V2(LegacyDocument),
    Current(Document),
}

/// Upgrade any generation to the current one. `fumei: null` (and the "0.1.0"
/// spelling `fumei: ""`) become an explicit 0.0: adjacent-month days carry
/// no unaccounted-hours tracking, and the current generation records that as
/// zero rather than as an absent value.
pub fn upgrade(document: VersionedDocument) -> Document {
    match document {
        VersionedDocument::V1(legacy) | VersionedDocument::V2(legacy) => Document {
            version: CURRENT_VERSION.to_string(),
            projects: legacy.projects,
            works: legacy
                .jissekis
                .into_iter()
                .map(|day| WorkDay {
                    date: day.date,
                    begin: day.begin,
                    end: day.end,
                    yokujitsu: day.yokujitsu,
                    kyukei: day.kyukei,
                    yasumi: day.yasumi,
                    sagyou: day.sagyou,
                    fumei: day.fumei.unwrap_or(0.0),
                    hours: day.jisseki,
                })
                .collect(),
        },
        VersionedDocument::Current(document) => document,
    }
}

/// Read and validate a document file, upgrading legacy generations.
pub fn load(path: &Path) -> Result<Document, ValidationError> {
    let text = std::fs::read_to_string(path)?;
    parse_document(&text)
}

/// Validate one JSON text into a current-generation document.
///
/// Fail-fast: the first violation wins, and every violation cites the
/// offending field path plus a truncated rendering of the bad value.
pub fn parse_document(text: &str) -> Result<Document, ValidationError> {
    Ok(upgrade(parse_versioned(text)?))
}

pub fn parse_versioned(text: &str) -> Result<VersionedDocument, ValidationError> {
    let value: Value = serde_json::from_str(text)?;
    let root = value.as_object().ok_or_else(|| {
        ValidationError::shape("$", format!("expected an object, found {}", snippet(&value)))
    })?;

    match version_of(root)? {
        "0.1.0" => Ok(VersionedDocument::V1(validate_legacy(root, true)?)),
        "0.3.0" => Ok(VersionedDocument::V2(validate_legacy(root, false)?)),
        _ => Ok(VersionedDocument::Current(validate_current(root)?)),
    }
}

fn version_of(root: &Map<String, Value>) -> Result<&str, ValidationError> {
    let expected = || {
        KNOWN_VERSIONS
            .iter()
            .map(|version| format!("\"{version}\""))
            .collect::<Vec<_>>()
            .join(", ")
    };
    match root.get("version") {
        None => Err(ValidationError::shape(
            "$.version",
            format!("missing; expected one of {}", expected()),
        )),
        Some(Value::String(version)) if KNOWN_VERSIONS.contains(&version.as_str()) => {
            Ok(version.as_str())
        }
        Some(Value::String(version)) => Err(ValidationError::shape(
            "$.version",
            format!(
                "unsupported version \"{version}\"; expected one of {}",
                expected()
            ),
        )),
        Some(other) => Err(ValidationError::shape(
            "$.version",
            format!("expected a string, found {}", snippet(other)),
        )),
    }
}

fn validate_current(root: &Map<String, Value>) -> Result<Document, ValidationError> {
    let projects = validate_projects(root)?;
    let entries = array_member(root, "$", "works")?;

    let mut works = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let path = format!("$.works[{i}]");
        let day = object_value(entry, &path)?;
        works.push(WorkDay {
            date: string_member(day, &path, "date")?,
            begin: string_member(day, &path, "begin")?,
            end: string_member(day, &path, "end")?,
            yokujitsu: bool_member(day, &path, "yokujitsu")?,
            kyukei: number_member(day, &path, "kyukei")?,
            yasumi: yasumi_member(day, &path)?,
            sagyou: number_member(day, &path, "sagyou")?,
            fumei: number_member(day, &path, "fumei")?,
            hours: hours_member(day, &path, "hours", false)?,
        });
    }

    Ok(Document {
        version: CURRENT_VERSION.to_string(),
        projects,
        works,
    })
}

fn validate_legacy(
    root: &Map<String, Value>,
    numbers_as_strings: bool,
) -> Result<LegacyDocument, ValidationError> {
    let projects = validate_projects(root)?;
    let entries = array_member(root, "$", "jissekis")?;

    let mut jissekis = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let path = format!("$.jissekis[{i}]");
        let day = object_value(entry, &path)?;
        let (kyukei, sagyou, fumei) = if numbers_as_strings {
            (
                numeric_string_member(day, &path, "kyukei")?,
                numeric_string_member(day, &path, "sagyou")?,
                legacy_fumei_string(day, &path)?,
            )
        } else {
            (
                number_member(day, &path, "kyukei")?,
                number_member(day, &path, "sagyou")?,
                legacy_fumei_number(day, &path)?,
            )
        };
        jissekis.push(LegacyWorkDay {
            date: string_member(day, &path, "date")?,
            begin: string_member(day, &path, "begin")?,
            end: string_member(day, &path, "end")?,
            yokujitsu: bool_member(day, &path, "yokujitsu")?,
            kyukei,
            yasumi: yasumi_member(day, &path)?,
            sagyou,
            fumei,
            jisseki: hours_member(day, &path, "jisseki", numbers_as_strings)?,
        });
    }

    Ok(LegacyDocument { projects, jissekis })
}

fn validate_projects(
    root: &Map<String, Value>,
) -> Result<BTreeMap<String, String>, ValidationError> {
    let value = member(root, "$", "projects")?;
    let object = value.as_object().ok_or_else(|| {
        ValidationError::shape(
            "$.projects",
            format!("expected an object, found {}", snippet(value)),
        )
    })?;
    let mut projects = BTreeMap::new();
    for (key, value) in object {
        let path = format!("$.projects.{key}");
        let name = value.as_str().ok_or_else(|| {
            ValidationError::shape(&path, format!("expected a string, found {}", snippet(value)))
        })?;
        projects.insert(key.clone(), name.to_string());
    }
    Ok(projects)
}

// --- field readers -----------------------------------------------------

fn member<'a>(
    object: &'a Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<&'a Value, ValidationError> {
    object
        .get(key)
        .ok_or_else(|| ValidationError::shape(format!("{path}.{key}"), "missing"))
}

fn object_value<'a>(
    value: &'a Value,
    path: &str,
) -> Result<&'a Map<String, Value>, ValidationError> {
    value.as_object().ok_or_else(|| {
        ValidationError::shape(path, format!("expected an object, found {}", snippet(value)))
    })
}

fn array_member<'a>(
    object: &'a Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<&'a Vec<Value>, ValidationError> {
    let value = member(object, path, key)?;
    value.as_array().ok_or_else(|| {
        ValidationError::shape(
            format!("{path}.{key}"),
            format!("expected an array, found {}", snippet(value)),
        )
    })
}

fn string_member(
    object: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<String, ValidationError> {
    let value = member(object, path, key)?;
    value.as_str().map(str::to_string).ok_or_else(|| {
        ValidationError::shape(
            format!("{path}.{key}"),
            format!("expected a string, found {}", snippet(value)),
        )
    })
}

fn bool_member(
    object: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<bool, ValidationError> {
    let value = member(object, path, key)?;
    value.as_bool().ok_or_else(|| {
        ValidationError::shape(
            format!("{path}.{key}"),
            format!("expected a boolean, found {}", snippet(value)),
        )
    })
}

fn number_member(
    object: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<f64, ValidationError> {
    let value = member(object, path, key)?;
    number_value(value, &format!("{path}.{key}"))
}

fn number_value(value: &Value, path: &str) -> Result<f64, ValidationError> {
    value.as_f64().ok_or_else(|| {
        ValidationError::shape(path, format!("expected a number, found {}", snippet(value)))
    })
}

fn numeric_string_member(
    object: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<f64, ValidationError> {
    let value = member(object, path, key)?;
    numeric_string_value(value, &format!("{path}.{key}"))
}

fn numeric_string_value(value: &Value, path: &str) -> Result<f64, ValidationError> {
    let text = value.as_str().ok_or_else(|| {
        ValidationError::shape(
            path,
            format!("expected a numeric string, found {}", snippet(value)),
        )
    })?;
    parse_number(text)
        .ok_or_else(|| ValidationError::shape(path, format!("not a number: {text:?}")))
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

/// "0.1.0" spells an untracked `fumei` as the empty string.
fn legacy_fumei_string(
    object: &Map<String, Value>,
    path: &str,
) -> Result<Option<f64>, ValidationError> {
    let value = member(object, path, "fumei")?;
    match value.as_str() {
        Some("") => Ok(None),
        Some(_) => numeric_string_value(value, &format!("{path}.fumei")).map(Some),
        None => Err(ValidationError::shape(
            format!("{path}.fumei"),
            format!("expected a numeric string, found {}", snippet(value)),
        )),
    }
}

/// "0.3.0" spells an untracked `fumei` as null.
fn legacy_fumei_number(
    object: &Map<String, Value>,
    path: &str,
) -> Result<Option<f64>, ValidationError> {
    let value = member(object, path, "fumei")?;
    if value.is_null() {
        return Ok(None);
    }
    number_value(value, &format!("{path}.fumei")).map(Some)
}

fn yasumi_member(object: &Map<String, Value>, path: &str) -> Result<Yasumi, ValidationError> {
    let text = string_member(object, path, "yasumi")?;
    Yasumi::parse(&text).ok_or_else(|| {
        ValidationError::shape(
            format!("{path}.yasumi"),
            format!(
                "expected one of {}, found {text:?}",
                Yasumi::ALL
                    .iter()
                    .map(|yasumi| format!("{:?}", yasumi.as_str()))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        )
    })
}

fn hours_member(
    object: &Map<String, Value>,
    path: &str,
    key: &str,
    numbers_as_strings: bool,
) -> Result<BTreeMap<String, f64>, ValidationError> {
    let value = member(object, path, key)?;
    let entries = value.as_object().ok_or_else(|| {
        ValidationError::shape(
            format!("{path}.{key}"),
            format!("expected an object, found {}", snippet(value)),
        )
    })?;
    let mut hours = BTreeMap::new();
    for (project, value) in entries {
        let entry_path = format!("{path}.{key}.{project}");
        let number = if numbers_as_strings {
            numeric_string_value(value, &entry_path)?
        } else {
            number_value(value, &entry_path)?
        };
        hours.insert(project.clone(), number);
    }
    Ok(hours)
}

const SNIPPET_MAX: usize = 40;

fn snippet(value: &Value) -> String {
    let text = value.to_string();
    if text.chars().count() <= SNIPPET_MAX {
        return text;
    }
    let truncated: String = text.chars().take(SNIPPET_MAX).collect();
    format!("{truncated}…")
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
