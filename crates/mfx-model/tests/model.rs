//! Tests for mfx-model serde shapes.

use mfx_model::{Entry, EntryStatus, ExportSpec, FieldId, Form, FormId, InputType};

#[test]
fn explicit_spec_deserializes_from_pairs() {
    let json = r#"{
        "name": "Contacts",
        "columns": [
            { "name": "Name", "sources": [[1, "1"], [2, "5"]] },
            { "name": "Email", "sources": [[1, "2"]] }
        ]
    }"#;
    let spec: ExportSpec = serde_json::from_str(json).expect("deserialize spec");
    assert_eq!(spec.name, "Contacts");
    assert!(spec.form_ids.is_empty());
    let names: Vec<&str> = spec.columns.names().collect();
    assert_eq!(names, vec!["Name", "Email"]);
    let name = spec.columns.get("Name").unwrap();
    assert_eq!(
        name.field_for(FormId::new(2)),
        Some(&FieldId::new("5").unwrap())
    );
}

#[test]
fn explicit_spec_rejects_duplicate_columns() {
    let json = r#"{
        "name": "Broken",
        "columns": [
            { "name": "Name", "sources": [[1, "1"]] },
            { "name": "Name", "sources": [[2, "1"]] }
        ]
    }"#;
    let result: Result<ExportSpec, _> = serde_json::from_str(json);
    let err = result.unwrap_err();
    assert!(err.to_string().contains("column 'Name' is already defined"));
}

#[test]
fn auto_spec_deserializes_form_ids() {
    let spec: ExportSpec =
        serde_json::from_str(r#"{ "name": "All", "form_ids": [3, 1] }"#).expect("deserialize");
    assert!(spec.columns.is_empty());
    assert_eq!(spec.form_ids, vec![FormId::new(3), FormId::new(1)]);
}

#[test]
fn form_deserializes_with_defaults() {
    let json = r#"{
        "id": 4,
        "title": "Uploads",
        "fields": [
            { "id": "1", "label": "Name" },
            { "id": "2", "label": "Files", "input_type": "fileupload", "multiple_files": true }
        ]
    }"#;
    let form: Form = serde_json::from_str(json).expect("deserialize form");
    assert_eq!(form.fields[0].input_type, InputType::Text);
    assert_eq!(form.fields[1].input_type, InputType::FileUpload);
    assert!(form.fields[1].multiple_files);
}

#[test]
fn entry_round_trips_timestamp_format() {
    let json = r#"{
        "id": 11,
        "form_id": 1,
        "date_created": "2024-01-15 08:30:00",
        "values": { "1": "Alice" }
    }"#;
    let entry: Entry = serde_json::from_str(json).expect("deserialize entry");
    assert_eq!(entry.status, EntryStatus::Active);
    assert_eq!(entry.value("1"), "Alice");
    let out = serde_json::to_string(&entry).expect("serialize entry");
    assert!(out.contains("\"2024-01-15 08:30:00\""));
}
