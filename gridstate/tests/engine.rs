//! Tests for engine pagination, filtering and debounced input.

use std::time::Duration;
use std::time::Instant;

use gridstate::prelude::*;

fn engine(rows: usize, config: GridConfig) -> GridEngine {
    let records = (0..rows)
        .map(|i| Record::new().set("id", i as i64).set("name", format!("item {}", i)))
        .collect();
    GridEngine::new(
        vec![Column::key("id"), Column::key("name").filterable(true)],
        records,
        config,
    )
}

#[test]
fn test_page_navigation() {
    let mut engine = engine(25, GridConfig::default());
    assert_eq!(engine.page_count(), 3);
    assert!(!engine.can_previous_page());
    assert!(engine.next_page());
    assert!(engine.next_page());
    assert!(!engine.can_next_page());
    assert!(!engine.next_page());
    assert_eq!(engine.page_rows().len(), 5);
    assert!(engine.first_page());
    assert!(engine.last_page());
    assert_eq!(engine.pagination().page_index, 2);
    assert!(engine.previous_page());
    assert_eq!(engine.pagination().page_index, 1);
}

#[test]
fn test_programmatic_page_index_is_clamped() {
    let mut engine = engine(25, GridConfig::default());
    assert!(engine.set_page_index(99));
    assert_eq!(engine.pagination().page_index, 2);
    assert!(!engine.page_rows().is_empty());
}

#[test]
fn test_page_input_is_one_based() {
    let mut engine = engine(25, GridConfig::default());
    engine.go_to_page_input("2");
    assert_eq!(engine.pagination().page_index, 1);
    engine.go_to_page_input("");
    assert_eq!(engine.pagination().page_index, 0);
    engine.go_to_page_input("40");
    assert_eq!(engine.pagination().page_index, 2);
    engine.go_to_page_input("-3");
    assert_eq!(engine.pagination().page_index, 0);
    assert!(!engine.go_to_page_input("two"));
}

#[test]
fn test_page_size_options_include_current() {
    let mut engine = engine(25, GridConfig::default().with_page_size(15));
    assert_eq!(engine.page_size_options(), vec![10, 15, 20, 30, 40, 50]);
    engine.set_page_size(20);
    assert_eq!(engine.page_size_options(), vec![10, 20, 30, 40, 50]);
}

#[test]
fn test_empty_dataset_has_one_empty_page() {
    let engine = engine(0, GridConfig::default());
    assert_eq!(engine.page_count(), 1);
    assert!(engine.page_rows().is_empty());
    assert!(!engine.can_next_page());
}

#[test]
fn test_sort_resets_page() {
    let mut engine = engine(25, GridConfig::default());
    engine.last_page();
    engine.toggle_sort("id", false);
    assert_eq!(engine.pagination().page_index, 0);
    engine.toggle_sort("id", false);
    assert_eq!(engine.page_rows()[0].record.value("id"), CellValue::from(24));
}

#[test]
fn test_debounced_filter_applies_latest_after_quiet_period() {
    let mut engine = engine(25, GridConfig::default());
    let t0 = Instant::now();
    engine.input_global_filter("i", t0);
    engine.input_global_filter("item 1", t0 + Duration::from_millis(100));
    engine.input_global_filter("item 2", t0 + Duration::from_millis(200));

    assert!(!engine.tick(t0 + Duration::from_millis(650)));
    assert_eq!(engine.global_filter(), "");
    assert_eq!(engine.next_deadline(), Some(t0 + Duration::from_millis(700)));

    assert!(engine.tick(t0 + Duration::from_millis(700)));
    assert_eq!(engine.global_filter(), "item 2");
    assert_eq!(engine.next_deadline(), None);
}

#[test]
fn test_debounced_column_filter() {
    let mut engine = engine(25, GridConfig::default().with_debounce_ms(50));
    let t0 = Instant::now();
    engine.input_column_filter("name", "item 2", t0);
    assert!(engine.tick(t0 + Duration::from_millis(50)));
    assert_eq!(engine.column_filter("name"), Some("item 2"));
    assert_eq!(engine.filtered_rows().len(), 6);
}

#[test]
fn test_teardown_cancels_pending_input() {
    let mut engine = engine(25, GridConfig::default());
    let t0 = Instant::now();
    engine.input_global_filter("item", t0);
    engine.input_column_filter("name", "item", t0);
    engine.teardown();
    assert_eq!(engine.next_deadline(), None);
    assert!(!engine.tick(t0 + Duration::from_secs(10)));
    assert_eq!(engine.global_filter(), "");
}

#[test]
fn test_set_columns_drops_stale_state() {
    let mut engine = engine(5, GridConfig::default());
    engine.set_column_filter("name", "item");
    engine.toggle_sort("name", false);
    engine.set_columns(vec![Column::key("id")]);
    assert!(engine.sorting().is_empty());
    assert_eq!(engine.column_filter("name"), None);
}

#[test]
fn test_snapshot_controls() {
    let engine = engine(
        3,
        GridConfig::default()
            .with_global_filter(false)
            .with_pagination(false)
            .with_export(false)
            .with_column_toggles(false),
    );
    let snapshot = engine.snapshot();
    assert!(snapshot.render_table);
    assert!(snapshot.no_controls_shown);
    assert_eq!(snapshot.rows.len(), 3);
}

#[test]
fn test_footer_follows_first_column() {
    let engine = GridEngine::new(
        vec![Column::key("id").footer("Id"), Column::key("name")],
        vec![Record::new().set("id", 1)],
        GridConfig::default().with_selectable(true),
    );
    let snapshot = engine.snapshot();
    assert!(snapshot.show_footer);
    assert_eq!(snapshot.footers, vec!["", "Id", ""]);

    let engine = GridEngine::new(
        vec![Column::key("id"), Column::key("name").footer("Name")],
        vec![Record::new().set("id", 1)],
        GridConfig::default(),
    );
    assert!(!engine.snapshot().show_footer);
}

#[test]
fn test_host_select_column_is_data_without_selection() {
    let records = vec![
        Record::new().set("name", "David").set("select", "premium"),
        Record::new().set("name", "Denice").set("select", "basic"),
    ];
    let mut engine = GridEngine::new(
        vec![Column::key("select").footer("Plan"), Column::key("name")],
        records,
        GridConfig::default(),
    );

    let snapshot = engine.snapshot();
    assert!(!snapshot.headers[0].is_selection);
    assert_eq!(snapshot.rows[0].cells, vec!["premium", "David"]);
    assert!(snapshot.show_footer);
    assert_eq!(snapshot.footers, vec!["Plan", ""]);

    engine.set_global_filter("premium");
    assert_eq!(engine.snapshot().filtered_rows, 1);
}
