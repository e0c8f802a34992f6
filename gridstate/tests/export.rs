//! Tests for export row selection.

use gridstate::prelude::*;

fn engine(config: GridConfig) -> GridEngine {
    let records = (0..50)
        .map(|i| Record::new().set("id", i).set("name", format!("p{}", i)).set("secret", "x"))
        .collect();
    GridEngine::new(vec![Column::key("id"), Column::key("name")], records, config)
}

#[test]
fn test_exports_all_rows_without_selection() {
    let mut engine = engine(GridConfig::default());
    engine.set_global_filter("p1");
    engine.next_page();
    let payload = engine.export_payload();
    assert_eq!(payload.rows.len(), 50);
    assert_eq!(payload.file_name, "exported-data.csv");
}

#[test]
fn test_exports_only_selected_rows() {
    let mut engine = engine(GridConfig::default());
    engine.select_rows(&[RowId::Index(42), RowId::Index(7), RowId::Index(19)]);
    // Selection hidden by a filter still exports.
    engine.set_global_filter("p4");

    let payload = engine.export_payload();
    let ids: Vec<String> = payload.rows.iter().map(|r| r.value("id").to_string()).collect();
    assert_eq!(ids, vec!["7", "19", "42"]);
}

#[test]
fn test_headers_limit_and_relabel() {
    let mut engine = engine(
        GridConfig::default()
            .with_export_file_name("people")
            .with_export_headers(vec![ExportHeader::new("Name", "name")]),
    );
    engine.select_rows(&[RowId::Index(3)]);
    let payload = engine.export_payload();
    assert_eq!(payload.file_name, "people.csv");

    let table = payload.table();
    assert_eq!(table.headers, vec!["Name"]);
    assert_eq!(table.rows, vec![vec!["p3".to_string()]]);
}

#[test]
fn test_payload_serializes() {
    let mut engine = engine(GridConfig::default());
    engine.select_rows(&[RowId::Index(0)]);
    let json = serde_json::to_value(engine.export_payload()).unwrap();
    assert_eq!(json["file_name"], "exported-data.csv");
    assert_eq!(json["rows"][0]["name"], "p0");
    assert!(json["headers"].is_null());
}
