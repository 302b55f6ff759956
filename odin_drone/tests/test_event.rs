/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

/// decoding tests for received drone messages
/// run with "cargo test --test test_event -- --nocapture"

use serde_json::json;
use odin_drone::{errors::OdinDroneError, event::{LonLat, decode_event, decode_event_value}};

//--- test data

const MSG_2: &'static str = r#"{"type":"FeatureCollection","features":[
 {"type":"Feature","properties":{"serial":"1581F5FJC246","registration":"UAV-B17","Name":"Matrice 30T","altitude":120.5,"pilot":"J. Doe","organization":"Civil Defense","yaw":275.0},"geometry":{"coordinates":[35.9313,31.9487],"type":"Point"}},
 {"type":"Feature","properties":{"serial":"1581F5FJC377","registration":"UAV-22","Name":"Mavic 3","altitude":0,"pilot":"A. Smith","organization":"Survey Dept","yaw":-30.5},"geometry":{"coordinates":[35.8001,31.9902],"type":"Point"}}
]}"#;

#[test]
fn test_decode_batch () {
    let event = decode_event( MSG_2).expect("failed to decode");
    println!("{event}");

    assert_eq!( event.len(), 2);
    assert_eq!( event.rejected, 0);

    let r = &event.reports[0];
    assert_eq!( r.id, "UAV-B17");
    assert_eq!( r.serial, "1581F5FJC246");
    assert_eq!( r.name, "Matrice 30T");
    assert_eq!( r.altitude, 120.5);
    assert_eq!( r.pilot, "J. Doe");
    assert_eq!( r.organization, "Civil Defense");
    assert_eq!( r.yaw, 275.0);
    assert_eq!( r.position, LonLat(35.9313, 31.9487));

    let r = &event.reports[1];
    assert_eq!( r.id, "UAV-22");
    assert_eq!( r.yaw, -30.5); // passed through as is
}

#[test]
fn test_drop_malformed_features () {
    let msg = json!({
        "type": "FeatureCollection",
        "features": [
            { "properties": { "registration": "OK-1" }, "geometry": { "coordinates": [1.0, 2.0] } },
            { "properties": { "Name": "no id" }, "geometry": { "coordinates": [1.0, 2.0] } },
            { "properties": { "registration": "  " }, "geometry": { "coordinates": [1.0, 2.0] } },
            { "properties": { "registration": "NO-GEOM" } },
            { "properties": { "registration": "ONE-COORD" }, "geometry": { "coordinates": [1.0] } },
            { "properties": { "registration": "THREE-COORDS" }, "geometry": { "coordinates": [1.0, 2.0, 3.0] } },
            { "properties": { "registration": "BAD-ALT", "altitude": "high" }, "geometry": { "coordinates": [1.0, 2.0] } },
            "not a feature"
        ]
    });

    let event = decode_event( &msg.to_string()).unwrap();
    assert_eq!( event.len(), 1);
    assert_eq!( event.rejected, 7);
    assert_eq!( event.reports[0].id, "OK-1");

    // an out-of-range number only sinks its own feature
    let msg = r#"{"features":[
 {"properties":{"registration":"OK-1"},"geometry":{"coordinates":[1.0,2.0]}},
 {"properties":{"registration":"BAD","altitude":1e400},"geometry":{"coordinates":[1.0,2.0]}}
]}"#;
    let event = decode_event( msg).unwrap();
    assert_eq!( event.len(), 1);
    assert_eq!( event.rejected, 1);
    assert_eq!( event.reports[0].id, "OK-1");
}

#[test]
fn test_defaults () {
    let msg = json!({ "features": [ { "properties": { "registration": "D5" }, "geometry": { "coordinates": [10.5, -3.25] } } ] });
    let event = decode_event_value( msg).unwrap();

    let r = &event.reports[0];
    assert_eq!( r.serial, "");
    assert_eq!( r.name, "");
    assert_eq!( r.pilot, "");
    assert_eq!( r.organization, "");
    assert_eq!( r.altitude, 0.0);
    assert_eq!( r.yaw, 0.0);
    assert_eq!( r.position.lon(), 10.5);
    assert_eq!( r.position.lat(), -3.25);
}

#[test]
fn test_lowercase_name () {
    let msg = r#"{"features":[{"properties":{"registration":"D6","name":"lower"},"geometry":{"coordinates":[0,0]}}]}"#;
    let event = decode_event( msg).unwrap();
    assert_eq!( event.reports[0].name, "lower");
}

#[test]
fn test_reject_message () {
    assert!( matches!( decode_event("not json"), Err(OdinDroneError::JsonError(_))));
    assert!( matches!( decode_event(r#"{"type":"FeatureCollection"}"#), Err(OdinDroneError::JsonError(_))));
    assert!( matches!( decode_event(r#"[1,2,3]"#), Err(OdinDroneError::JsonError(_))));

    let empty = decode_event(r#"{"type":"FeatureCollection","features":[]}"#).unwrap();
    assert!( empty.is_empty());
    assert_eq!( empty.rejected, 0);
}
