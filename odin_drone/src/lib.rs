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
#![allow(unused)]

use std::{collections::{HashMap,VecDeque}, fmt, time::Duration};
use serde::Serialize;
use serde_json::Value as JsonValue;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value as GeoValue, feature::Id};

pub mod datetime;
use datetime::EpochMillis;

pub mod errors;

pub mod classify;
use classify::{DroneCategory, classify, color_for};

pub mod event;
use event::{DroneEvent, DroneReport, LonLat};

pub mod config;

pub mod actor;

pub mod connector;
pub mod ws;
pub mod jsonl;

pub mod drone_service;

/// default number of trajectory points we keep per drone
pub const DEFAULT_MAX_TRACE: usize = 100;

/// the latest known state of a tracked drone. Each received report replaces the whole record
#[derive(Debug,Clone,PartialEq,Serialize)]
pub struct Drone {
    pub id: String, // the registration, which is our key
    pub serial: String,
    pub name: String,
    pub altitude: f64,
    pub yaw: f64,
    pub position: LonLat,
    pub pilot: String,
    pub organization: String,
    pub timestamp: EpochMillis, // when we received the report, not when it was generated
}

impl Drone {
    pub fn from_report (report: &DroneReport, timestamp: EpochMillis)->Self {
        Drone {
            id: report.id.clone(),
            serial: report.serial.clone(),
            name: report.name.clone(),
            altitude: report.altitude,
            yaw: report.yaw,
            position: report.position,
            pilot: report.pilot.clone(),
            organization: report.organization.clone(),
            timestamp
        }
    }

    pub fn category (&self)->DroneCategory { classify( &self.id) }

    pub fn color (&self)->&'static str { color_for( &self.id) }

    /// how long ago the last report for this drone was received
    pub fn flight_time (&self, now: EpochMillis)->Duration { now.since( self.timestamp) }
}

impl fmt::Display for Drone {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "Drone( id: {}, {}", self.id, self.category())?;
        if !self.name.is_empty() { write!( f, ", name: \"{}\"", self.name)?; }
        write!( f, ", pos: {}, alt: {:.1}, yaw: {:.0}", self.position, self.altitude, self.yaw)?;
        if !self.pilot.is_empty() { write!( f, ", pilot: \"{}\"", self.pilot)?; }
        if !self.organization.is_empty() { write!( f, ", org: \"{}\"", self.organization)?; }
        write!( f, ", time: {} )", self.timestamp)
    }
}

/// the bounded recent path of a drone. Positions and timestamps are kept in two parallel ringbuffers
/// of the same length, oldest entry first
#[derive(Debug,Clone,PartialEq,Serialize)]
pub struct Trajectory {
    #[serde(rename="droneId")]
    drone_id: String,
    #[serde(rename="coordinates")]
    positions: VecDeque<LonLat>,
    timestamps: VecDeque<EpochMillis>,
    #[serde(skip)]
    max_len: usize,
}

impl Trajectory {
    pub fn new (drone_id: String, position: LonLat, timestamp: EpochMillis, max_len: usize)->Self {
        let max_len = max_len.max(1);
        let mut positions = VecDeque::with_capacity( max_len);
        let mut timestamps = VecDeque::with_capacity( max_len);
        positions.push_back( position);
        timestamps.push_back( timestamp);

        Trajectory { drone_id, positions, timestamps, max_len }
    }

    /// append and drop from the front until we are back within max_len (no thinning, no interpolation)
    pub fn push (&mut self, position: LonLat, timestamp: EpochMillis) {
        self.positions.push_back( position);
        self.timestamps.push_back( timestamp);

        while self.positions.len() > self.max_len {
            self.positions.pop_front();
            self.timestamps.pop_front();
        }
    }

    pub fn drone_id (&self)->&str { self.drone_id.as_str() }
    pub fn len (&self)->usize { self.positions.len() }
    pub fn is_empty (&self)->bool { self.positions.is_empty() }
    pub fn max_len (&self)->usize { self.max_len }

    pub fn positions (&self)->&VecDeque<LonLat> { &self.positions }
    pub fn timestamps (&self)->&VecDeque<EpochMillis> { &self.timestamps }

    pub fn first_position (&self)->Option<&LonLat> { self.positions.front() }
    pub fn last_position (&self)->Option<&LonLat> { self.positions.back() }

    /// GeoJSON LineString feature for map display. Single point trajectories don't make a line
    pub fn to_feature (&self)->Option<Feature> {
        if self.positions.len() < 2 { return None }

        let coords: Vec<Vec<f64>> = self.positions.iter().map( |p| p.to_vec()).collect();

        let mut properties = JsonObject::new();
        properties.insert( "droneId".to_string(), JsonValue::from( self.drone_id.as_str()));
        properties.insert( "color".to_string(), JsonValue::from( color_for( &self.drone_id)));

        Some( Feature {
            bbox: None,
            geometry: Some( Geometry::new( GeoValue::LineString( coords))),
            id: Some( Id::String( self.drone_id.clone())),
            properties: Some( properties),
            foreign_members: None
        })
    }
}

/// the store for all drones we have seen so far. This is a plain, single owner data structure - it
/// is owned by the `DroneTracker` task, which serializes all mutation (see `actor`).
/// There is no expiry, drones and their trajectories are kept until the process terminates.
/// Iteration order of all collection views is unspecified
pub struct DroneStore {
    drones: HashMap<String,Drone>,
    trajectories: HashMap<String,Trajectory>,
    selected: Option<String>, // a lookup key only, might refer to a drone we don't know (anymore)
    max_trace: usize,
    last_update: Option<EpochMillis>,
}

impl Default for DroneStore {
    fn default()->Self { DroneStore::new() }
}

impl DroneStore {
    pub fn new ()->Self {
        DroneStore::with_max_trace( DEFAULT_MAX_TRACE)
    }

    pub fn with_max_trace (max_trace: usize)->Self {
        DroneStore {
            drones: HashMap::new(),
            trajectories: HashMap::new(),
            selected: None,
            max_trace: max_trace.max(1),
            last_update: None,
        }
    }

    pub fn max_trace (&self)->usize { self.max_trace }
    pub fn last_update (&self)->Option<EpochMillis> { self.last_update }

    //--- ingestion

    /// stamp with the current time. Stamps never go backwards, even if the wall clock does
    pub fn apply (&mut self, event: &DroneEvent) {
        let now = EpochMillis::now();
        self.apply_at( event, self.last_update.map_or( now, |last| now.max(last)))
    }

    /// all reports of an event share the same timestamp. Reports are processed in order, i.e. if the
    /// event contains several reports for the same drone the last one wins
    pub fn apply_at (&mut self, event: &DroneEvent, now: EpochMillis) {
        for report in &event.reports {
            self.drones.insert( report.id.clone(), Drone::from_report( report, now));

            if let Some(trajectory) = self.trajectories.get_mut( report.id.as_str()) {
                trajectory.push( report.position, now);
            } else {
                let trajectory = Trajectory::new( report.id.clone(), report.position, now, self.max_trace);
                self.trajectories.insert( report.id.clone(), trajectory);
            }
        }

        if !event.is_empty() {
            self.last_update = Some(now);
        }
    }

    //--- selection

    pub fn select (&mut self, drone_id: Option<String>) {
        self.selected = drone_id;
    }

    pub fn clear_selection (&mut self) {
        self.selected = None;
    }

    pub fn selected_id (&self)->Option<&str> { self.selected.as_deref() }

    /// the selected drone, or None if there is no selection or it refers to an unknown drone
    pub fn selected (&self)->Option<&Drone> {
        self.selected.as_ref().and_then( |id| self.drones.get( id.as_str()))
    }

    //--- views

    pub fn drone (&self, drone_id: &str)->Option<&Drone> { self.drones.get( drone_id) }

    pub fn trajectory (&self, drone_id: &str)->Option<&Trajectory> { self.trajectories.get( drone_id) }

    pub fn trajectories (&self)->impl Iterator<Item=&Trajectory> { self.trajectories.values() }

    pub fn len (&self)->usize { self.drones.len() }
    pub fn is_empty (&self)->bool { self.drones.is_empty() }

    pub fn all (&self)->Vec<&Drone> {
        self.drones.values().collect()
    }

    /// owned copy of all drones, for consumers that live outside of the store owner
    pub fn snapshot (&self)->Vec<Drone> {
        self.drones.values().cloned().collect()
    }

    pub fn count_matching<F> (&self, pred: F)->usize where F: Fn(&Drone)->bool {
        self.drones.values().filter( |d| pred(d)).count()
    }

    /// number of drones that are not classified as flying
    pub fn red_count (&self)->usize {
        self.count_matching( |d| d.category() == DroneCategory::Grounded)
    }

    pub fn color_for (&self, drone_id: &str)->&'static str { color_for( drone_id) }

    pub fn trajectory_features (&self)->FeatureCollection {
        let features: Vec<Feature> = self.trajectories.values().filter_map( |t| t.to_feature()).collect();
        FeatureCollection { bbox: None, features, foreign_members: None }
    }
}
