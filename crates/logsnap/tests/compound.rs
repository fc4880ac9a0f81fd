use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use logsnap::{DeniedTypes, LogArg, Opaque, Options, Snapshotter};
use serde::Serialize;
use serde_json::{Value, json};

fn snapshot(value: &dyn LogArg, simple: bool) -> Option<Value> {
    Snapshotter::new(Options::default())
        .with_denied_types(Arc::new(DeniedTypes::seeded()))
        .serialize_debug_data(Some(value), simple, None)
        .map(|s| serde_json::from_str(&s).unwrap())
}

#[derive(Serialize)]
struct Customer {
    name: String,
    vip: bool,
}

#[derive(Serialize)]
struct Order {
    id: u32,
    customer: Customer,
    note: Option<String>,
}

#[derive(Serialize)]
struct Tagged {
    #[serde(rename = "objectType")]
    kind: &'static str,
    id: u32,
}

#[derive(Serialize)]
enum Event {
    Shipped { carrier: String },
}

fn order() -> Order {
    Order {
        id: 7,
        customer: Customer { name: "ada".into(), vip: true },
        note: None,
    }
}

#[test]
fn structs_carry_their_type_name() -> Result<(), Box<dyn std::error::Error>> {
    let out = snapshot(&order(), false).ok_or("no snapshot")?;
    assert_eq!(
        out,
        json!({
            "id": 7,
            "customer": {"name": "ada", "vip": true},
            "objectType": std::any::type_name::<Order>()
        })
    );
    Ok(())
}

#[test]
fn null_fields_are_omitted() -> Result<(), Box<dyn std::error::Error>> {
    let out = snapshot(&order(), true).ok_or("no snapshot")?;
    assert!(out.get("note").is_none());
    Ok(())
}

#[test]
fn wrappers_report_the_inner_type() -> Result<(), Box<dyn std::error::Error>> {
    let boxed = Some(Box::new(order()));
    let out = snapshot(&boxed, false).ok_or("no snapshot")?;
    assert_eq!(out["objectType"], std::any::type_name::<Order>());
    let by_ref = &&order();
    let out = snapshot(by_ref, false).ok_or("no snapshot")?;
    assert_eq!(out["objectType"], std::any::type_name::<Order>());
    Ok(())
}

#[test]
fn enum_variants_are_compound() -> Result<(), Box<dyn std::error::Error>> {
    let out = snapshot(&Event::Shipped { carrier: "post".into() }, false).ok_or("no snapshot")?;
    assert_eq!(out["Shipped"], json!({"carrier": "post"}));
    assert_eq!(out["objectType"], std::any::type_name::<Event>());
    Ok(())
}

#[test]
fn maps_are_not_annotated() -> Result<(), Box<dyn std::error::Error>> {
    let mut hm = HashMap::new();
    hm.insert("a", 1);
    assert_eq!(snapshot(&hm, false), Some(json!({"a": 1})));

    let mut bm = BTreeMap::new();
    bm.insert(3u8, vec!["x"]);
    assert_eq!(snapshot(&bm, false), Some(json!({"3": ["x"]})));

    let dynamic = json!({"k": [1, 2], "nested": {"z": null}});
    assert_eq!(snapshot(&dynamic, false), Some(json!({"k": [1, 2], "nested": {}})));
    Ok(())
}

#[test]
fn existing_object_type_field_is_kept() {
    let out = snapshot(&Tagged { kind: "custom", id: 1 }, false);
    assert_eq!(out, Some(json!({"objectType": "custom", "id": 1})));
}

#[test]
fn opaque_values_are_never_touched() {
    assert_eq!(snapshot(&Opaque(std::io::stdin()), true), None);
    assert_eq!(snapshot(&Opaque(order()), true), None);
}

#[test]
fn empty_struct_still_reports_its_type() {
    #[derive(Serialize)]
    struct Marker {}
    let out = snapshot(&Marker {}, false);
    assert_eq!(out, Some(json!({"objectType": std::any::type_name::<Marker>()})));
}

struct Histogram(Vec<(f64, u32)>);

impl Serialize for Histogram {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (bucket, count) in &self.0 {
            map.serialize_entry(bucket, count)?;
        }
        map.end()
    }
}

#[test]
fn float_map_keys_become_text() {
    let hist = Histogram(vec![(0.5, 3), (1.0, 7), (f64::NAN, 1)]);
    assert_eq!(
        snapshot(&hist, false),
        Some(json!({"0.5": 3, "1.0": 7, "NaN": 1}))
    );
}
