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

/// unit tests for DroneStore ingestion, selection and views
/// run with "cargo test --test test_store -- --nocapture"

use odin_drone::{
    DroneStore, DEFAULT_MAX_TRACE,
    classify::{DroneCategory, GREEN_DRONE_COLOR, RED_DRONE_COLOR},
    datetime::EpochMillis,
    event::{DroneEvent, DroneReport, LonLat},
};

fn report (id: &str, lon: f64, lat: f64)->DroneReport {
    DroneReport::new( id, LonLat::new( lon, lat))
}

fn full_report (id: &str, name: &str, altitude: f64, yaw: f64, pilot: &str, org: &str, pos: LonLat)->DroneReport {
    DroneReport {
        id: id.to_string(),
        serial: format!("SN-{id}"),
        name: name.to_string(),
        altitude,
        pilot: pilot.to_string(),
        organization: org.to_string(),
        yaw,
        position: pos
    }
}

#[test]
fn test_two_feature_batch () {
    let mut store = DroneStore::new();
    let event = DroneEvent::new( vec![ report("D1-B", 10.0, 20.0), report("D2", 30.0, 40.0) ]);
    store.apply( &event);

    assert_eq!( store.len(), 2);

    let d1 = store.drone("D1-B").expect("D1-B missing");
    assert_eq!( d1.category(), DroneCategory::Flying);
    assert_eq!( store.color_for("D1-B"), GREEN_DRONE_COLOR);

    let d2 = store.drone("D2").expect("D2 missing");
    assert_eq!( d2.category(), DroneCategory::Grounded);
    assert_eq!( store.color_for("D2"), RED_DRONE_COLOR);

    assert_eq!( store.red_count(), 1);

    let t1 = store.trajectory("D1-B").unwrap();
    assert_eq!( t1.len(), 1);
    assert_eq!( t1.first_position(), Some(&LonLat(10.0, 20.0)));

    let t2 = store.trajectory("D2").unwrap();
    assert_eq!( t2.len(), 1);
    assert_eq!( t2.first_position(), Some(&LonLat(30.0, 40.0)));
}

#[test]
fn test_trajectory_window () {
    let mut store = DroneStore::new();

    for i in 1..=150 {
        let event = DroneEvent::single( report( "D1", i as f64, -(i as f64)));
        store.apply_at( &event, EpochMillis::new( 1000 * i));
    }

    let t = store.trajectory("D1").unwrap();
    assert_eq!( t.len(), DEFAULT_MAX_TRACE);
    assert_eq!( t.timestamps().len(), t.positions().len());
    assert_eq!( t.first_position(), Some(&LonLat(51.0, -51.0))); // events 1..50 dropped
    assert_eq!( t.last_position(), Some(&LonLat(150.0, -150.0)));
    assert_eq!( t.timestamps().front(), Some(&EpochMillis::new(51_000)));
}

#[test]
fn test_trajectory_lengths () {
    for n in [1usize, 2, 99, 100, 101, 250] {
        let mut store = DroneStore::new();
        let positions: Vec<LonLat> = (0..n).map( |i| LonLat::new( i as f64 * 0.001, 31.9 + i as f64 * 0.001)).collect();

        for (i,pos) in positions.iter().enumerate() {
            store.apply_at( &DroneEvent::single( DroneReport::new("X", *pos)), EpochMillis::new( i as i64));
        }

        let t = store.trajectory("X").unwrap();
        let expected = n.min( DEFAULT_MAX_TRACE);
        assert_eq!( t.len(), expected, "trajectory length after {n} events");

        let tail: Vec<LonLat> = positions[n - expected ..].to_vec();
        let stored: Vec<LonLat> = t.positions().iter().cloned().collect();
        assert_eq!( stored, tail);

        let ts: Vec<i64> = t.timestamps().iter().map( |t| t.millis()).collect();
        assert!( ts.windows(2).all( |w| w[0] < w[1]), "timestamps not in arrival order");
    }
}

#[test]
fn test_custom_max_trace () {
    let mut store = DroneStore::with_max_trace( 3);
    for i in 0..5 {
        store.apply_at( &DroneEvent::single( report("D7", i as f64, 0.0)), EpochMillis::new(i));
    }
    let t = store.trajectory("D7").unwrap();
    assert_eq!( t.max_len(), 3);
    assert_eq!( t.positions().iter().map( |p| p.lon()).collect::<Vec<f64>>(), vec![2.0, 3.0, 4.0]);

    // zero would not make sense, we always keep the last position
    let store = DroneStore::with_max_trace( 0);
    assert_eq!( store.max_trace(), 1);
}

#[test]
fn test_replace_not_merge () {
    let mut store = DroneStore::new();

    let first = full_report( "D3", "alpha", 120.0, 90.0, "Alice", "ACME", LonLat(35.9, 31.9));
    let second = full_report( "D3", "beta", 80.0, 400.0, "", "", LonLat(36.0, 32.0));

    store.apply_at( &DroneEvent::single( first), EpochMillis::new(1));
    store.apply_at( &DroneEvent::single( second.clone()), EpochMillis::new(2));

    let d = store.drone("D3").unwrap();
    assert_eq!( d.name, "beta");
    assert_eq!( d.altitude, 80.0);
    assert_eq!( d.yaw, 400.0); // no normalization
    assert_eq!( d.pilot, "");
    assert_eq!( d.organization, "");
    assert_eq!( d.serial, second.serial);
    assert_eq!( d.position, LonLat(36.0, 32.0));
    assert_eq!( d.timestamp, EpochMillis::new(2));

    assert_eq!( store.trajectory("D3").unwrap().len(), 2); // trajectory is appended, not replaced
}

#[test]
fn test_batch_last_write_wins () {
    let mut store = DroneStore::new();
    let event = DroneEvent::new( vec![
        full_report( "D4", "first", 10.0, 0.0, "p", "o", LonLat(1.0, 1.0)),
        full_report( "D4", "second", 20.0, 0.0, "p", "o", LonLat(2.0, 2.0)),
    ]);
    let now = EpochMillis::new( 42);
    store.apply_at( &event, now);

    assert_eq!( store.len(), 1);
    assert_eq!( store.drone("D4").unwrap().name, "second");

    // both reports end up in the trajectory, with the same (batch) timestamp
    let t = store.trajectory("D4").unwrap();
    assert_eq!( t.len(), 2);
    assert!( t.timestamps().iter().all( |ts| *ts == now));
    assert_eq!( store.last_update(), Some(now));
}

#[test]
fn test_shared_batch_timestamp () {
    let mut store = DroneStore::new();
    store.apply( &DroneEvent::new( vec![ report("A-B", 0.0, 0.0), report("B", 1.0, 1.0), report("C", 2.0, 2.0) ]));

    let ts: Vec<EpochMillis> = store.all().iter().map( |d| d.timestamp).collect();
    assert_eq!( ts.len(), 3);
    assert!( ts.iter().all( |t| *t == ts[0]));
}

#[test]
fn test_red_count_interleaved () {
    let mut store = DroneStore::new();
    let ids = ["R1", "G1-B", "R2", "G2-B", "R3", "x-B-B", ""];

    for round in 0..4 {
        for (i,id) in ids.iter().enumerate() {
            if (i + round) % 2 == 0 {
                store.apply_at( &DroneEvent::single( report( id, i as f64, round as f64)), EpochMillis::new( (round * 10 + i) as i64));
            }
        }
    }

    let expected = store.all().iter().filter( |d| !d.id.contains("-B")).count();
    assert_eq!( store.len(), ids.len());
    assert_eq!( store.red_count(), expected);
    assert_eq!( store.red_count(), 4); // R1, R2, R3 and ""
    assert_eq!( store.count_matching( |d| d.category().is_flying()), 3);
}

#[test]
fn test_selection () {
    let mut store = DroneStore::new();
    store.apply( &DroneEvent::new( vec![ report("D1-B", 10.0, 20.0), report("D2", 30.0, 40.0) ]));

    store.select( Some("D2".to_string()));
    assert_eq!( store.selected_id(), Some("D2"));
    assert_eq!( store.selected().map( |d| d.id.as_str()), Some("D2"));

    store.select( None);
    assert_eq!( store.selected_id(), None);
    assert!( store.selected().is_none());

    // a stale selection is legal, it just doesn't resolve
    let before = { let mut v = store.snapshot(); v.sort_by( |a,b| a.id.cmp(&b.id)); v };
    store.select( Some("unknown".to_string()));
    assert_eq!( store.selected_id(), Some("unknown"));
    assert!( store.selected().is_none());
    let after = { let mut v = store.snapshot(); v.sort_by( |a,b| a.id.cmp(&b.id)); v };
    assert_eq!( before, after);

    store.clear_selection();
    assert!( store.selected_id().is_none());
}

#[test]
fn test_trajectory_features () {
    let mut store = DroneStore::new();
    store.apply_at( &DroneEvent::new( vec![ report("D1-B", 10.0, 20.0), report("D2", 30.0, 40.0) ]), EpochMillis::new(1));
    store.apply_at( &DroneEvent::single( report("D1-B", 11.0, 21.0)), EpochMillis::new(2));

    // only D1-B has a line
    let fc = store.trajectory_features();
    assert_eq!( fc.features.len(), 1);

    let feature = &fc.features[0];
    let props = feature.properties.as_ref().unwrap();
    assert_eq!( props.get("droneId").and_then( |v| v.as_str()), Some("D1-B"));
    assert_eq!( props.get("color").and_then( |v| v.as_str()), Some(GREEN_DRONE_COLOR));

    match &feature.geometry.as_ref().unwrap().value {
        geojson::Value::LineString(coords) => assert_eq!( coords, &vec![ vec![10.0, 20.0], vec![11.0, 21.0] ]),
        other => panic!("unexpected geometry {other:?}")
    }
}

#[test]
fn test_flight_time () {
    let mut store = DroneStore::new();
    store.apply_at( &DroneEvent::single( report("D9", 0.0, 0.0)), EpochMillis::new( 10_000));

    let d = store.drone("D9").unwrap();
    assert_eq!( d.flight_time( EpochMillis::new( 25_500)).as_millis(), 15_500);
    assert_eq!( d.flight_time( EpochMillis::new( 5_000)).as_millis(), 0);

    // extreme stamps saturate instead of overflowing
    let early = EpochMillis::new( i64::MIN);
    let late = EpochMillis::new( i64::MAX);
    assert_eq!( late.since( early).as_millis(), i64::MAX as u128);
    assert_eq!( early.since( late).as_millis(), 0);
}

#[test]
fn test_stamps_never_go_backwards () {
    let mut store = DroneStore::new();
    let future = EpochMillis::new( EpochMillis::now().millis() + 3_600_000);

    // last update ahead of the wall clock, as after a clock step back
    store.apply_at( &DroneEvent::single( report("D1", 0.0, 0.0)), future);
    store.apply( &DroneEvent::single( report("D1", 1.0, 1.0)));
    store.apply( &DroneEvent::single( report("D1", 2.0, 2.0)));

    let stamps: Vec<EpochMillis> = store.trajectory("D1").unwrap().timestamps().iter().copied().collect();
    assert_eq!( stamps.len(), 3);
    assert!( stamps.windows(2).all( |w| w[0] <= w[1]));
    assert_eq!( store.last_update(), Some(future));
    assert_eq!( store.drone("D1").unwrap().timestamp, future);
}

#[test]
fn test_empty_event () {
    let mut store = DroneStore::new();
    store.apply( &DroneEvent::default());
    assert!( store.is_empty());
    assert!( store.last_update().is_none());
    assert_eq!( store.red_count(), 0);
    assert!( store.trajectory_features().features.is_empty());
}
