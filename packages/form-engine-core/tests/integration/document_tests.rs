//! Schema document loading from disk and strict validation.

use std::fs;

use tempfile::tempdir;

use form_engine_core::schema::SchemaError;
use form_engine_core::{ComponentRegistry, DisplayMode, EngineConfig, FormDocument, FormError};

const CONTACT_YAML: &str = r#"
type: form
title: Contact us
display: multipage
children:
  - type: page
    title: Who
    children:
      - type: text
        id: name
        label: Name *
  - type: page
    children:
      - type: textarea
        id: message
        rows: 5
"#;

#[test]
fn test_load_yaml_and_json_from_disk() -> anyhow::Result<()> {
    let dir = tempdir()?;

    let yaml_path = dir.path().join("contact.yml");
    fs::write(&yaml_path, CONTACT_YAML)?;
    let doc = FormDocument::from_path(&yaml_path)?;
    assert_eq!(doc.title(), "Contact us");
    assert_eq!(doc.display(), Some(DisplayMode::Multipage));
    assert_eq!(doc.page_titles(), vec!["Who".to_string(), "Page 2".to_string()]);

    let json_path = dir.path().join("contact.json");
    fs::write(&json_path, serde_json::to_string(doc.root())?)?;
    let reloaded = FormDocument::from_path(&json_path)?;
    assert_eq!(reloaded, doc);
    Ok(())
}

#[test]
fn test_unsupported_extension_and_missing_file() {
    let dir = tempdir().unwrap();
    let txt = dir.path().join("form.txt");
    fs::write(&txt, CONTACT_YAML).unwrap();
    assert!(matches!(
        FormDocument::from_path(&txt),
        Err(FormError::UnsupportedFormat(_))
    ));

    let missing = dir.path().join("absent.yaml");
    assert!(matches!(
        FormDocument::from_path(&missing),
        Err(FormError::Io { .. })
    ));
}

#[test]
fn test_yaml_syntax_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.yaml");
    fs::write(&path, "type: form\nchildren: [unclosed").unwrap();
    assert!(matches!(FormDocument::from_path(&path), Err(FormError::Yaml(_))));
}

#[test]
fn test_strict_validation_reports_missing_and_duplicate_ids() {
    let doc = FormDocument::from_yaml_str(
        r#"
type: form
children:
  - type: page
    children:
      - type: text
        id: name
      - type: text
        id: name
      - type: checkbox
        label: Subscribe
"#,
    )
    .unwrap();
    let registry = ComponentRegistry::with_builtins();
    let err = doc
        .validate_strict(&registry, &EngineConfig::default())
        .unwrap_err();
    let FormError::Invalid(errors) = err else {
        panic!("expected validation errors");
    };
    assert_eq!(errors.len(), 2);
    assert!(matches!(
        &errors[0],
        SchemaError::DuplicateId { id, first, .. } if id == "name" && first == "children[0].children[0]"
    ));
    // field shapes require an id, so the per-type check reports it first
    assert_eq!(errors[1].path(), "children[0].children[2].id");
}

#[test]
fn test_valid_document_passes_strict_validation() {
    let doc = FormDocument::from_yaml_str(CONTACT_YAML).unwrap();
    let registry = ComponentRegistry::with_builtins();
    assert!(doc
        .validate_strict(&registry, &EngineConfig::default())
        .is_ok());
    let report = doc.validate(&registry, &EngineConfig::default());
    assert_eq!(report.nodes_checked, 5);
}
