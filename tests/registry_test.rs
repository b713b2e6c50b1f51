//! Tests for the type registry, node handles and definition files

use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use tempfile::TempDir;

use pathtree::application::{ApplicationError, Definitions, Home, TypeInfo};
use pathtree::domain::Value;
use pathtree::infrastructure::{load_definitions, load_home, InfraError};
use pathtree::util::testing;

fn light_home() -> Home {
    let mut home = Home::new();
    home.deftype("light", TypeInfo::described("Light switches"));
    home.define(["light/kitchen", "light/hall"]).unwrap();
    home
}

// ============================================================
// Registry
// ============================================================

#[test]
fn given_declared_type_when_defining_then_creates_path() {
    testing::init_test_setup();
    let mut home = light_home();

    let kitchen = home.get("light/kitchen").expect("kitchen defined");
    assert_eq!(kitchen.path(), "light/kitchen");
    assert!(kitchen.is_leaf());
    assert_eq!(kitchen.value(), None);
}

#[test]
fn given_undeclared_type_when_defining_then_skips_path() {
    let mut home = light_home();
    let before = home.tree().node_count();

    let skipped = home.define(["heater/bath", "light/attic"]).unwrap();

    assert_eq!(skipped, vec!["heater/bath"]);
    assert!(home.get("heater/bath").is_none());
    assert!(home.get("heater").is_none());
    assert!(home.get("light/attic").is_some());
    assert_eq!(home.tree().node_count(), before + 1);
}

#[test]
fn given_redeclared_type_when_deftype_then_replaces_info() {
    let mut home = Home::new();
    home.deftype("light", TypeInfo::described("old"));
    home.deftype("light", TypeInfo::described("new"));

    assert_eq!(home.types().len(), 1);
    assert_eq!(
        home.types()["light"].description.as_deref(),
        Some("new")
    );
}

#[test]
fn given_unknown_path_when_getting_then_absent_without_creating() {
    let mut home = light_home();
    let before = home.tree().node_count();

    assert!(home.get("light/garage").is_none());
    assert_eq!(home.tree().node_count(), before);
}

#[test]
fn given_container_handle_when_listing_children_then_in_creation_order() {
    let mut home = light_home();
    let light = home.get("light").unwrap();
    assert!(!light.is_leaf());
    assert_eq!(light.children(), vec!["kitchen", "hall"]);
}

// ============================================================
// Handles
// ============================================================

#[test]
fn given_subscription_on_type_node_when_setting_leaves_then_sees_each_change() {
    let mut home = light_home();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    home.get("light")
        .unwrap()
        .subscribe(move |event| sink.borrow_mut().push(event.to_string()))
        .unwrap();

    home.get("light/kitchen")
        .unwrap()
        .set_value(Value::Bool(true))
        .unwrap();
    home.get("light/hall")
        .unwrap()
        .set_value(Value::Bool(false))
        .unwrap();

    assert_eq!(
        *seen.borrow(),
        vec!["light/kitchen = true", "light/hall = false"]
    );
    assert_eq!(home.get("light").unwrap().value(), None);
}

#[test]
fn given_container_handle_when_setting_value_then_domain_error() {
    let mut home = light_home();
    let result = home.get("light").unwrap().set_value(Value::Int(1));
    assert!(result.is_err());
}

// ============================================================
// Definitions
// ============================================================

#[test]
fn given_definitions_when_loading_then_applies_types_paths_and_values() {
    let mut definitions = Definitions::default();
    definitions
        .types
        .insert("sensor".into(), TypeInfo::default());
    definitions.paths = vec!["sensor/outside".into(), "sensor/inside".into()];
    definitions
        .values
        .insert("sensor/outside".into(), Value::Float(-3.5));

    let mut home = Home::new();
    let skipped = home.load(&definitions).unwrap();

    assert!(skipped.is_empty());
    assert_eq!(
        home.get("sensor/outside").unwrap().value(),
        Some(&Value::Float(-3.5))
    );
    assert_eq!(home.get("sensor/inside").unwrap().value(), None);
}

#[test]
fn given_value_for_undefined_path_when_loading_then_undefined_path_error() {
    let mut definitions = Definitions::default();
    definitions.types.insert("light".into(), TypeInfo::default());
    definitions.values.insert("light/ghost".into(), Value::Bool(true));

    let mut home = Home::new();
    let err = home.load(&definitions).unwrap_err();

    assert!(matches!(err, ApplicationError::UndefinedPath(p) if p == "light/ghost"));
}

#[test]
fn given_toml_file_when_loading_definitions_then_parses_all_sections() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("home.toml");
    fs::write(
        &file,
        r#"
paths = ["light/kitchen", "light/hall", "scene/evening"]

[types.light]
description = "Light switches"

[types.scene]

[values]
"light/kitchen" = true
"scene/evening" = "dim"
"#,
    )
    .unwrap();

    let definitions = load_definitions(&file).unwrap();
    assert_eq!(definitions.types.len(), 2);
    assert_eq!(definitions.paths.len(), 3);
    assert_eq!(
        definitions.values.get("scene/evening"),
        Some(&Value::Text("dim".into()))
    );

    let (mut home, skipped) = load_home(&file, '/').unwrap();
    assert!(skipped.is_empty());
    assert_eq!(
        home.get("light/kitchen").unwrap().value(),
        Some(&Value::Bool(true))
    );
    assert_eq!(
        home.tree().leaf_paths(),
        vec!["light/kitchen", "light/hall", "scene/evening"]
    );
}

#[test]
fn given_custom_separator_when_loading_home_then_paths_use_it() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("home.toml");
    fs::write(
        &file,
        r#"
paths = ["light.kitchen"]

[types.light]
"#,
    )
    .unwrap();

    let (mut home, _) = load_home(&file, '.').unwrap();
    assert_eq!(home.get("light.kitchen").unwrap().path(), "light.kitchen");
}

#[test]
fn given_missing_file_when_loading_definitions_then_io_error() {
    let dir = TempDir::new().unwrap();
    let err = load_definitions(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, InfraError::Io { .. }));
}

#[test]
fn given_malformed_file_when_loading_definitions_then_parse_error() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("broken.toml");
    fs::write(&file, "paths = [unterminated").unwrap();

    let err = load_definitions(&file).unwrap_err();
    assert!(matches!(err, InfraError::Parse { .. }));
}

#[test]
fn given_value_on_container_in_file_when_loading_home_then_fails() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("home.toml");
    fs::write(
        &file,
        r#"
paths = ["light/kitchen"]

[types.light]

[values]
"light" = true
"#,
    )
    .unwrap();

    let err = load_home(&file, '/').unwrap_err();
    assert!(matches!(
        err,
        InfraError::Application(ApplicationError::Domain(_))
    ));
}
