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

use std::fmt;
use serde::{Serialize,Deserialize};
use serde_json::{Value as JsonValue, value::RawValue};
use tracing::warn;

use crate::errors::{Result,OdinDroneError,parse_error};

/// geographic position in degrees. Serialized as a `[lon,lat]` array, which is also the GeoJSON order
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct LonLat (pub f64, pub f64);

impl LonLat {
    pub fn new (lon: f64, lat: f64)->Self { LonLat(lon,lat) }

    pub fn lon (&self)->f64 { self.0 }
    pub fn lat (&self)->f64 { self.1 }

    pub fn to_vec (&self)->Vec<f64> { vec![self.0, self.1] }
}

impl fmt::Display for LonLat {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "({:.5},{:.5})", self.0, self.1)
    }
}

/// a validated position report for a single drone, i.e. one feature of a received [`DroneEvent`]
#[derive(Debug,Clone,PartialEq)]
pub struct DroneReport {
    pub id: String, // the registration
    pub serial: String,
    pub name: String,
    pub altitude: f64,
    pub pilot: String,
    pub organization: String,
    pub yaw: f64, // degrees, passed through as received (no normalization)
    pub position: LonLat,
}

impl DroneReport {
    /// create a report with empty operator metadata. Mostly useful to generate input data
    pub fn new (id: impl ToString, position: LonLat)->Self {
        DroneReport {
            id: id.to_string(),
            serial: String::new(),
            name: String::new(),
            altitude: 0.0,
            pilot: String::new(),
            organization: String::new(),
            yaw: 0.0,
            position
        }
    }
}

impl fmt::Display for DroneReport {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "DroneReport( id: {}, name: \"{}\", pos: {}, alt: {:.1}, yaw: {:.0}, pilot: \"{}\", org: \"{}\" )",
                self.id, self.name, self.position, self.altitude, self.yaw, self.pilot, self.organization)
    }
}

/// a batch of drone reports that was received as one message. Reports are applied in order,
/// i.e. later reports for the same drone overwrite earlier ones
#[derive(Debug,Clone,Default,PartialEq)]
pub struct DroneEvent {
    pub reports: Vec<DroneReport>,
    pub rejected: usize, // number of malformed features that were dropped during decoding
}

impl DroneEvent {
    pub fn new (reports: Vec<DroneReport>)->Self {
        DroneEvent { reports, rejected: 0 }
    }

    pub fn single (report: DroneReport)->Self {
        DroneEvent { reports: vec![report], rejected: 0 }
    }

    pub fn len (&self)->usize { self.reports.len() }
    pub fn is_empty (&self)->bool { self.reports.is_empty() }
}

impl fmt::Display for DroneEvent {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "DroneEvent( n_reports: {}", self.reports.len())?;
        if self.rejected > 0 { write!( f, ", rejected: {}", self.rejected)?; }
        write!( f, " )")
    }
}

//--- the wire format (a GeoJSON-like FeatureCollection)

// features are only decoded per item so that a bad one (including out-of-range numbers) does not fail the batch
#[derive(Deserialize,Debug)]
struct WireEvent<F> {
    features: Vec<F>,
}

#[derive(Deserialize,Debug,Default)]
struct WireFeature {
    #[serde(default)]
    properties: WireProperties,
    geometry: Option<WireGeometry>,
}

#[derive(Deserialize,Debug,Default)]
struct WireProperties {
    serial: Option<String>,
    registration: Option<String>,
    #[serde(rename="Name", alias="name")]
    name: Option<String>,
    altitude: Option<f64>,
    pilot: Option<String>,
    organization: Option<String>,
    yaw: Option<f64>,
}

#[derive(Deserialize,Debug,Default)]
struct WireGeometry {
    #[serde(default)]
    coordinates: Vec<f64>,
}

impl WireFeature {
    fn into_report (self)->Result<DroneReport> {
        let props = self.properties;

        let id = match props.registration {
            Some(id) if !id.trim().is_empty() => id,
            _ => return Err( parse_error!("feature without registration"))
        };

        let position = match self.geometry {
            Some(geometry) => match geometry.coordinates.as_slice() {
                [lon,lat] if lon.is_finite() && lat.is_finite() => LonLat( *lon, *lat),
                coords => return Err( parse_error!("invalid coordinates {:?} for drone {}", coords, id))
            }
            None => return Err( parse_error!("no geometry for drone {}", id))
        };

        Ok( DroneReport {
            id,
            serial: props.serial.unwrap_or_default(),
            name: props.name.unwrap_or_default(),
            altitude: props.altitude.unwrap_or(0.0),
            pilot: props.pilot.unwrap_or_default(),
            organization: props.organization.unwrap_or_default(),
            yaw: props.yaw.unwrap_or(0.0),
            position
        })
    }
}

/// decode a received JSON message into a [`DroneEvent`].
/// Malformed features (no registration, no valid `[lon,lat]` coordinates, wrong field types) are dropped
/// and counted in `rejected`. Missing descriptive properties default to empty strings / 0.0.
/// The whole message is rejected if it is not a JSON object with a `features` array
pub fn decode_event (json: &str)->Result<DroneEvent> {
    let wire: WireEvent<Box<RawValue>> = serde_json::from_str( json)?;
    let features = wire.features.iter().map( |raw| serde_json::from_str::<WireFeature>( raw.get()));
    Ok( validate_features( features) )
}

/// same as [`decode_event`] for already parsed JSON values
pub fn decode_event_value (value: JsonValue)->Result<DroneEvent> {
    let wire: WireEvent<JsonValue> = serde_json::from_value( value)?;
    let features = wire.features.into_iter().map( |feature| serde_json::from_value::<WireFeature>( feature));
    Ok( validate_features( features) )
}

fn validate_features<I> (features: I)->DroneEvent where I: Iterator<Item=serde_json::Result<WireFeature>> {
    let mut reports = Vec::with_capacity( features.size_hint().0);
    let mut rejected = 0;

    for feature in features {
        let res = feature
            .map_err( |e| parse_error!("malformed feature: {}", e))
            .and_then( |wf| wf.into_report());

        match res {
            Ok(report) => reports.push( report),
            Err(e) => {
                warn!("dropping drone feature: {}", e);
                rejected += 1;
            }
        }
    }

    DroneEvent { reports, rejected }
}
