//! Integration tests for configuration and data loading.

use std::fs;
use std::path::PathBuf;

use chrono::{NaiveDateTime, TimeZone, Utc};
use mfx_cli::config::{ExportConfig, load_store};
use mfx_export::{ExportRequest, Exporter, UTF8_BOM};
use mfx_map::DEFAULT_MULTI_EXPORT_NAME;
use tempfile::TempDir;

const DATA: &str = r#"{
    "forms": [
        { "id": 1, "title": "Newsletter", "fields": [
            { "id": "1", "label": "Name" },
            { "id": "2", "label": "Email" }
        ]},
        { "id": 2, "title": "Contact", "fields": [
            { "id": "5", "label": "Name" },
            { "id": "6", "label": "Topics", "input_type": "checkbox",
              "inputs": [{ "id": "6.1", "label": "Sales" }, { "id": "6.2", "label": "Support" }],
              "choices": [{ "text": "Sales", "value": "Sales" }, { "text": "Support", "value": "Support" }] }
        ]}
    ],
    "entries": [
        { "id": 1, "form_id": 1, "date_created": "2024-01-02 09:00:00",
          "values": { "1": "Alice", "2": "a@x.com" } },
        { "id": 2, "form_id": 2, "date_created": "2024-01-01 09:00:00",
          "values": { "5": "Bob", "6.2": "Support" } },
        { "id": 3, "form_id": 2, "date_created": "2023-12-31 09:00:00", "status": "trash",
          "values": { "5": "Mallory" } }
    ]
}"#;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn config_defaults_apply() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "config.json", "{}");
    let config = ExportConfig::load(&path).unwrap();
    assert_eq!(config, ExportConfig::default());
    assert_eq!(config.clock().unwrap().offset().local_minus_utc(), 0);
    assert_eq!(config.options().page_size, 100);
}

#[test]
fn config_rejects_unknown_keys_and_zero_pages() {
    let dir = TempDir::new().unwrap();
    let unknown = write(&dir, "unknown.json", r#"{ "delimiter": ";" }"#);
    assert!(ExportConfig::load(&unknown).is_err());
    let zero = write(&dir, "zero.json", r#"{ "page_size": 0 }"#);
    let err = ExportConfig::load(&zero).unwrap_err();
    assert!(err.to_string().contains("page_size"));
}

#[test]
fn missing_config_names_the_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.json");
    let err = ExportConfig::load(&path).unwrap_err();
    assert!(format!("{err:#}").contains("absent.json"));
}

#[test]
fn registry_is_built_from_config_and_data() {
    let dir = TempDir::new().unwrap();
    let config_path = write(
        &dir,
        "config.json",
        r#"{
            "utc_offset": "+01:00",
            "page_size": 1,
            "multi_form_ids": "1, 2",
            "exports": [
                { "name": "Contacts", "columns": [
                    { "name": "Name", "sources": [[1, "1"], [2, "5"]] },
                    { "name": "Support", "sources": [[2, "6.2"]] }
                ]},
                { "name": "Contacts", "form_ids": [1] }
            ]
        }"#,
    );
    let data_path = write(&dir, "data.json", DATA);

    let config = ExportConfig::load(&config_path).unwrap();
    let store = load_store(&data_path).unwrap();
    let registry = config.build_registry(&store).unwrap();
    assert_eq!(
        registry.list_names(),
        vec!["Contacts", DEFAULT_MULTI_EXPORT_NAME]
    );
    let contacts = registry.lookup("Contacts").unwrap();
    assert_eq!(contacts.columns().len(), 2);

    let run_at = Utc.from_utc_datetime(
        &NaiveDateTime::parse_from_str("2024-03-01 12:00:00", "%Y-%m-%d %H:%M:%S").unwrap(),
    );
    let document = Exporter::new(&registry, &store)
        .with_clock(config.clock().unwrap())
        .with_options(config.options())
        .generate(&ExportRequest::new("Contacts"), run_at)
        .unwrap();
    assert_eq!(document.stats.pages, 2);
    let text = std::str::from_utf8(&document.bytes[UTF8_BOM.len()..]).unwrap();
    insta::assert_snapshot!(text, @r#"
    "Name","Support"
    "Alice",""
    "Bob","Support"
    "#);
}

#[test]
fn multi_export_derives_shared_columns() {
    let dir = TempDir::new().unwrap();
    let config_path = write(&dir, "config.json", r#"{ "multi_form_ids": "2,1" }"#);
    let data_path = write(&dir, "data.json", DATA);
    let config = ExportConfig::load(&config_path).unwrap();
    let store = load_store(&data_path).unwrap();
    let registry = config.build_registry(&store).unwrap();

    let multi = registry.lookup(DEFAULT_MULTI_EXPORT_NAME).unwrap();
    let names: Vec<&str> = multi.columns().names().collect();
    assert_eq!(names, vec!["Name", "Topics", "Email"]);
}

#[test]
fn malformed_data_is_reported() {
    let dir = TempDir::new().unwrap();
    let data_path = write(&dir, "data.json", r#"{ "forms": [ { "id": "x" } ] }"#);
    let err = load_store(&data_path).unwrap_err();
    assert!(format!("{err:#}").contains("parse data"));
}
