use std::collections::BTreeMap;

use super::{parse_document, ValidationError};
use crate::document::{Document, WorkDay, Yasumi};

fn shape_error(text: &str) -> (String, String) {
    match parse_document(text) {
        Err(ValidationError::Shape { path, message }) => (path, message),
        Err(other) => panic!("expected a shape error, got: {other}"),
        Ok(_) => panic!("expected rejection for {text}"),
    }
}

#[test]
fn rejects_missing_version() {
    let (path, message) = shape_error("{}");
    assert_eq!(path, "$.version");
    assert!(message.contains("missing"), "message: {message}");
}

#[test]
fn rejects_unsupported_version() {
    let (path, message) = shape_error(r#"{"version":"9.9.9","projects":{},"works":[]}"#);
    assert_eq!(path, "$.version");
    assert!(message.contains("unsupported"), "message: {message}");
    assert!(message.contains("\"3.0.0\""), "message: {message}");
}

#[test]
fn rejects_missing_works() {
    let (path, _) = shape_error(r#"{"version":"3.0.0","projects":{}}"#);
    assert_eq!(path, "$.works");
}

#[test]
fn rejects_non_object_top_level() {
    let (path, message) = shape_error("[1, 2]");
    assert_eq!(path, "$");
    assert!(message.contains("expected an object"), "message: {message}");
}

#[test]
fn rejects_syntax_errors_as_json_errors() {
    assert!(matches!(
        parse_document("{not json"),
        Err(ValidationError::Json(_))
    ));
}

#[test]
fn rejects_incomplete_work_day() {
    // A record carrying only "hours" is missing every attendance field.
    let text = r#"{"version":"3.0.0","projects":{},"works":[{"hours":{"project0":"x"}}]}"#;
    assert!(parse_document(text).is_err());
}

#[test]
fn rejects_non_numeric_hours_value_with_field_path() {
    let text = r#"{"version":"3.0.0","projects":{},"works":[
        {"date":"7/27(月)","begin":"09:00","end":"17:30","yokujitsu":false,
         "kyukei":1.0,"yasumi":"","sagyou":7.5,"fumei":0.0,
         "hours":{"project0":"x"}}]}"#;
    let (path, message) = shape_error(text);
    assert_eq!(path, "$.works[0].hours.project0");
    assert!(message.contains("expected a number"), "message: {message}");
    assert!(message.contains("\"x\""), "message: {message}");
}

#[test]
fn rejects_non_string_project_name() {
    let (path, _) = shape_error(r#"{"version":"3.0.0","projects":{"project0":7},"works":[]}"#);
    assert_eq!(path, "$.projects.project0");
}

#[test]
fn snippet_is_truncated_for_large_values() {
    let big = "a".repeat(500);
    let text = format!(r#"{{"version":"3.0.0","projects":{{}},"works":[["{big}"]]}}"#);
    let (_, message) = shape_error(&text);
    assert!(message.len() < 250, "message: {message}");
    assert!(message.contains('…'), "message: {message}");
}

fn v1_text(kyukei: &str, fumei: &str) -> String {
    format!(
        r#"{{"version":"0.1.0",
            "projects":{{"project0":"Project Zero"}},
            "jissekis":[{{"date":"7/27(月)","begin":"09:00","end":"17:30",
                          "yokujitsu":false,"kyukei":"{kyukei}","yasumi":"",
                          "sagyou":"7.5","fumei":"{fumei}",
                          "jisseki":{{"project0":"7.5"}}}}]}}"#
    )
}

#[test]
fn upgrades_v1_numeric_strings_to_numbers() {
    let document = parse_document(&v1_text("1.5", "0.0")).expect("v1 should load");
    assert_eq!(document.version, "3.0.0");
    let day = &document.works[0];
    assert_eq!(day.kyukei, 1.5);
    assert_eq!(day.sagyou, 7.5);
    assert_eq!(day.fumei, 0.0);
    assert_eq!(day.hours["project0"], 7.5);
}

#[test]
fn upgrades_v1_empty_fumei_to_zero() {
    let document = parse_document(&v1_text("1.0", "")).expect("v1 should load");
    assert_eq!(document.works[0].fumei, 0.0);
}

#[test]
fn rejects_v1_non_numeric_kyukei() {
    let (path, message) = shape_error(&v1_text("one", "0.0"));
    assert_eq!(path, "$.jissekis[0].kyukei");
    assert!(message.contains("\"one\""), "message: {message}");
}

#[test]
fn upgrades_v2_null_fumei_to_zero_and_renames_fields() {
    let text = r#"{"version":"0.3.0",
        "projects":{"project0":"Project Zero"},
        "jissekis":[{"date":"7/27(月)","begin":"09:00","end":"17:30",
                     "yokujitsu":true,"kyukei":1.0,"yasumi":"全休",
                     "sagyou":0.0,"fumei":null,
                     "jisseki":{"project0":0.0}}]}"#;
    let document = parse_document(text).expect("v2 should load");
    assert_eq!(document.version, "3.0.0");
    let day = &document.works[0];
    assert_eq!(day.fumei, 0.0);
    assert_eq!(day.yasumi, Yasumi::FullDay);
    assert!(day.yokujitsu);
    assert_eq!(day.hours["project0"], 0.0);
}

#[test]
fn rejects_v2_string_kyukei() {
    let text = r#"{"version":"0.3.0","projects":{},
        "jissekis":[{"date":"7/27(月)","begin":"09:00","end":"17:30",
                     "yokujitsu":false,"kyukei":"1.0","yasumi":"",
                     "sagyou":0.0,"fumei":0.0,"jisseki":{}}]}"#;
    let (path, _) = shape_error(text);
    assert_eq!(path, "$.jissekis[0].kyukei");
}

#[test]
fn rejects_current_generation_null_fumei() {
    let text = r#"{"version":"3.0.0","projects":{},
        "works":[{"date":"7/27(月)","begin":"09:00","end":"17:30",
                  "yokujitsu":false,"kyukei":1.0,"yasumi":"",
                  "sagyou":7.5,"fumei":null,"hours":{}}]}"#;
    let (path, _) = shape_error(text);
    assert_eq!(path, "$.works[0].fumei");
}

#[test]
fn equivalent_v1_and_v2_inputs_upgrade_identically() {
    let v2 = r#"{"version":"0.3.0",
        "projects":{"project0":"Project Zero"},
        "jissekis":[{"date":"7/27(月)","begin":"09:00","end":"17:30",
                     "yokujitsu":false,"kyukei":1.5,"yasumi":"",
                     "sagyou":7.5,"fumei":null,
                     "jisseki":{"project0":7.5}}]}"#;
    let from_v1 = parse_document(&v1_text("1.5", "")).expect("v1 should load");
    let from_v2 = parse_document(v2).expect("v2 should load");
    assert_eq!(from_v1, from_v2);
}

#[test]
fn round_trips_a_rendered_document() {
    let projects: BTreeMap<String, String> =
        [("project0".to_string(), "Project Zero".to_string())]
            .into_iter()
            .collect();
    let document = Document::new(
        projects,
        vec![WorkDay {
            date: "7/27(月)".to_string(),
            begin: "09:00".to_string(),
            end: "17:30".to_string(),
            yokujitsu: false,
            kyukei: 1.0,
            yasumi: Yasumi::None,
            sagyou: 7.5,
            fumei: 0.0,
            hours: [("project0".to_string(), 7.5)].into_iter().collect(),
        }],
    );
    let rendered = document.render().expect("render should succeed");
    let reloaded = parse_document(&rendered).expect("rendered output should validate");
    assert_eq!(reloaded, document);
}
