use std::sync::{Arc, Mutex};

use logsnap::{ContextBag, DeniedTypes, LogArg, Opaque, Options, Snapshotter};
use serde::Serialize;
use serde::ser::Error as _;
use serde_json::{Value, json};

struct Broken;

impl Serialize for Broken {
    fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
        Err(S::Error::custom("refuses to serialize"))
    }
}

#[derive(Serialize)]
struct Point {
    x: i32,
}

fn setup() -> (Snapshotter, Arc<Mutex<Vec<String>>>) {
    let reports = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&reports);
    let snap = Snapshotter::new(Options::default())
        .with_denied_types(Arc::new(DeniedTypes::seeded()))
        .with_sink(Arc::new(move |m: &str| sink.lock().unwrap().push(m.to_string())));
    (snap, reports)
}

fn parse(out: Option<String>) -> Option<Value> {
    out.map(|s| serde_json::from_str(&s).unwrap())
}

#[test]
fn context_merges_scalars_and_objects() {
    let (snap, reports) = setup();
    let b = Point { x: 2 };
    let bag = ContextBag::new().with("a", &1).with("b", &b);
    let out = parse(snap.serialize_debug_data(None, false, Some(&bag)));
    assert_eq!(out, Some(json!({"context": {"a": 1, "b": {"x": 2}}})));
    assert!(reports.lock().unwrap().is_empty());
}

#[test]
fn failing_key_is_dropped_alone() {
    let (snap, reports) = setup();
    let bag = ContextBag::new().with("a", &1).with("b", &Broken);
    let out = parse(snap.serialize_debug_data(None, false, Some(&bag)));
    assert_eq!(out, Some(json!({"context": {"a": 1}})));
    let reports = reports.lock().unwrap();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].contains("`b`"));
    assert!(reports[0].contains("refuses to serialize"));
    // Context failures do not feed the denylist.
    assert!(!snap.denied_types().contains(std::any::type_name::<Broken>()));
}

#[test]
fn context_ignores_the_simple_flag() {
    let (snap, _) = setup();
    let user = "ada";
    let bag = ContextBag::new().with("user", &user);
    let out = parse(snap.serialize_debug_data(Some(&"the message"), false, Some(&bag)));
    assert_eq!(out, Some(json!({"context": {"user": "ada"}})));
}

#[test]
fn context_sits_next_to_the_value() {
    let (snap, _) = setup();
    let p = Point { x: 5 };
    let bag = ContextBag::new().with("request", &"r-1");
    let out = parse(snap.serialize_debug_data(Some(&p), false, Some(&bag))).unwrap();
    assert_eq!(out["x"], 5);
    assert_eq!(out["objectType"], std::any::type_name::<Point>());
    assert_eq!(out["context"], json!({"request": "r-1"}));
}

#[test]
fn context_replaces_a_context_field_of_the_value() {
    let (snap, _) = setup();
    let value = json!({"context": "old", "k": 1});
    let bag = ContextBag::new().with("new", &true);
    let out = parse(snap.serialize_debug_data(Some(&value), false, Some(&bag)));
    assert_eq!(out, Some(json!({"context": {"new": true}, "k": 1})));
}

#[test]
fn opaque_and_absent_context_values() {
    let (snap, reports) = setup();
    let handle = Opaque(std::io::stdout());
    let missing: Option<u8> = None;
    let bag = ContextBag::new()
        .with("handle", &handle)
        .with("missing", &missing)
        .with("list", &[1, 2]);
    let out = parse(snap.serialize_debug_data(None, false, Some(&bag)));
    assert_eq!(out, Some(json!({"context": {"list": [1, 2]}})));
    assert!(reports.lock().unwrap().is_empty());
}

#[test]
fn empty_context_adds_nothing() {
    let (snap, _) = setup();
    let bag = ContextBag::new();
    assert_eq!(snap.serialize_debug_data(None, true, Some(&bag)), None);
    assert_eq!(snap.serialize_debug_data(Some(&3), false, Some(&bag)), None);
}

#[test]
fn bag_keys_are_unique_and_ordered() {
    let first = 1;
    let second = 2;
    let values: [(&str, &dyn LogArg); 3] = [("z", &first), ("a", &second), ("z", &second)];
    let bag: ContextBag<'_> = values.into_iter().collect();
    assert_eq!(bag.len(), 2);
    let keys: Vec<&str> = bag.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, ["z", "a"]);
}
