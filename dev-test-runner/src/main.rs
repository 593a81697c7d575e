//! End-to-end consumer walkthrough: declare the Location model, construct
//! an instance, mutate it, derive both schema documents, and round-trip
//! the serialized form into a strict Rust struct.

use serde::Deserialize;
use serde_json::{json, Map, Value};

use modelkit::{FieldOptions, FieldValue, SchemaBuilder, SchemaRef};

#[derive(Debug, Deserialize)]
struct Location {
    name: String,
    polygon: Polygon,
    sub_location_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Polygon {
    coords: Vec<Coord>,
}

#[derive(Debug, Deserialize)]
struct Coord {
    lat: f64,
    lng: f64,
}

fn declare_location() -> Result<SchemaRef, modelkit::SchemaError> {
    let coord = SchemaBuilder::new("Coord")
        .describe("one lat/lng pair on a polygon outline")
        .one("lat", "number", FieldOptions::new().describe("latitude in degrees"))?
        .one("lng", "number", FieldOptions::new().describe("longitude in degrees"))?
        .build();
    let polygon = SchemaBuilder::new("Polygon")
        .many("coords", &coord, FieldOptions::new())?
        .build();
    let coord_for_note = coord.clone();
    let location = SchemaBuilder::new("Location")
        // deferred on purpose: the text reads another schema's description
        .describe_with(move || {
            let inner = coord_for_note.description().unwrap_or("points");
            format!("a named place outlined by {inner}")
        })
        .one("name", "string", FieldOptions::new().describe("display name"))?
        .one("polygon", &polygon, FieldOptions::new())?
        .many("sub_location_ids", "string", FieldOptions::new())?
        .build();
    Ok(location)
}

fn as_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(mapping) => mapping,
        other => panic!("expected an object, got {other}"),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let location = declare_location()?;
    println!("schema: {}", location.name());
    println!("about:  {}", location.description().unwrap_or("(none)"));

    println!("\nskeleton:");
    println!("{}", serde_json::to_string_pretty(&location.skeleton())?);
    println!("\njson schema:");
    println!("{}", serde_json::to_string_pretty(&location.json_schema())?);

    let mut nowhere = location.construct(as_object(json!({
        "name": "Nowhere",
        "polygon": {
            "coords": [
                { "lat": 1.0, "lng": 2.0 },
                { "lat": 10.0, "lng": 21.0 },
            ],
        },
    })))?;

    println!("\npolygon points:");
    if let Some(polygon) = nowhere.get("polygon").and_then(FieldValue::as_instance) {
        for point in polygon.items("coords") {
            if let Some(point) = point.as_instance() {
                let lat = point.get("lat").and_then(FieldValue::as_f64).unwrap_or(0.0);
                let lng = point.get("lng").and_then(FieldValue::as_f64).unwrap_or(0.0);
                println!("  {lat}, {lng}");
            }
        }
    }

    nowhere.append("sub_location_ids", "one")?;

    println!("\ntraversal:");
    nowhere.traverse(|name, value| match value {
        FieldValue::Scalar(scalar) => println!("  {name} = {scalar}"),
        FieldValue::Instance(nested) => println!("  {name} : {}", nested.schema().name()),
    });

    let serialized = serde_json::to_string_pretty(&nowhere)?;
    println!("\nserialized:\n{serialized}");

    // prove the serialized form loads into a strict model, with a precise
    // path on failure
    let deserializer = &mut serde_json::Deserializer::from_str(&serialized);
    let typed: Location = serde_path_to_error::deserialize(deserializer)
        .map_err(|error| format!("at {}: {error}", error.path()))?;
    println!(
        "\ntyped round-trip: {} with {} points and {} sub locations",
        typed.name,
        typed.polygon.coords.len(),
        typed.sub_location_ids.len(),
    );
    if let Some(first) = typed.polygon.coords.first() {
        println!("first point: {}, {}", first.lat, first.lng);
    }

    Ok(())
}
