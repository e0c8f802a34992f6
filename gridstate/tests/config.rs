//! Tests for grid definition files.

use std::io::Write;

use gridstate::prelude::*;

const GRID: &str = r#"{
    "config": {
        "initial_page_size": 2,
        "row_id_field": "id",
        "initial_column_visibility": { "email": false }
    },
    "columns": [
        { "key": "id" },
        { "key": "name", "header": "Name", "filterable": true, "filter_fn": "fuzzy" },
        { "key": "age", "sort_fn": "numeric_coerced" },
        { "key": "email" }
    ],
    "data": [
        { "id": "a", "name": "David", "age": "40", "email": "d@x" },
        { "id": "b", "name": "Denice", "age": "abc", "email": "e@x" },
        { "id": "c", "name": "Bob", "age": "9", "email": "b@x" }
    ]
}"#;

#[test]
fn test_grid_file_drives_engine() {
    let file = GridFile::from_json_str(GRID).unwrap();
    let mut engine = GridEngine::new(file.columns(), file.records(), file.config.clone());

    assert_eq!(engine.page_count(), 2);
    let headers: Vec<String> = engine.snapshot().headers.into_iter().map(|h| h.label).collect();
    assert_eq!(headers, vec!["id", "Name", "age"]);

    engine.toggle_sort("age", false);
    let ids: Vec<String> = engine.sorted_rows().iter().map(|r| r.id.to_string()).collect();
    assert_eq!(ids, vec!["b", "c", "a"]);

    assert!(engine.set_column_filter("name", "dvd"));
    assert_eq!(engine.filtered_rows().len(), 1);
}

#[test]
fn test_load_from_disk() {
    let path = std::env::temp_dir().join(format!("gridstate-test-{}.json", std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(GRID.as_bytes()).unwrap();

    let grid = GridFile::load(&path).unwrap();
    assert_eq!(grid.records().len(), 3);
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_malformed_sections_render_nothing() {
    let file = GridFile::from_json_str(r#"{"columns": "nope", "data": {"a": 1}}"#).unwrap();
    let engine = GridEngine::new(file.columns(), file.records(), file.config.clone());
    assert!(engine.rows().is_empty());
    assert!(!engine.snapshot().render_table);
}

#[test]
fn test_errors() {
    assert!(matches!(GridFile::from_json_str("{"), Err(ConfigError::Parse(_))));
    let err = GridFile::from_json_str(r#"{"config": {"page_size_options": [10, 0]}}"#).unwrap_err();
    assert_eq!(err.to_string(), "Page size must be at least 1 (got 0)");
}
