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

use std::net::SocketAddr;
use axum::{
    Json,
    http::StatusCode,
    routing::{Router,get},
    extract::{Path as AxumPath, State},
    response::{Response,IntoResponse},
};
use geojson::FeatureCollection;
use serde::{Serialize,Deserialize};
use tokio::net::TcpListener;
use tracing::info;

use crate::{
    Drone, Trajectory,
    actor::{ConnectionState, TrackerHandle},
    classify::DroneCategory,
    config::MapAvailability,
    errors::{Result,OdinDroneError}
};

/// a drone as we send it to view consumers, with its classification resolved
#[derive(Serialize,Debug,Clone)]
pub struct DroneEntry {
    #[serde(flatten)]
    pub drone: Drone,
    pub category: DroneCategory,
    pub color: &'static str,
}

impl From<&Drone> for DroneEntry {
    fn from (drone: &Drone)->Self {
        DroneEntry { drone: drone.clone(), category: drone.category(), color: drone.color() }
    }
}

#[derive(Serialize,Debug,Clone)]
pub struct DroneDetail {
    #[serde(flatten)]
    pub entry: DroneEntry,
    pub trajectory: Option<Trajectory>,
}

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct Counts {
    pub total: usize,
    pub red: usize,
}

#[derive(Serialize,Debug,Clone)]
pub struct SelectionView {
    pub id: Option<String>,
    pub drone: Option<DroneEntry>, // None if nothing is selected or the selection is stale
}

#[derive(Deserialize,Debug)]
pub struct SelectRequest {
    pub id: Option<String>,
}

#[derive(Serialize,Debug,Clone)]
pub struct StatusView {
    pub connected: bool,
    pub connection: ConnectionState,
    pub events: u64,
    pub rejected: u64,
    pub map: MapAvailability,
}

#[derive(Clone)]
struct ServiceState {
    tracker: TrackerHandle,
    map: MapAvailability,
}

impl IntoResponse for OdinDroneError {
    fn into_response (self)->Response {
        let status = match self {
            OdinDroneError::TrackerClosedError => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, self.to_string()).into_response()
    }
}

/// the routes through which view consumers (map, list, counter) get drone data and set the selection
pub fn router (tracker: TrackerHandle, map: MapAvailability)->Router {
    Router::new()
        .route( "/drones", get( get_drones))
        .route( "/drones/{id}", get( get_drone))
        .route( "/counts", get( get_counts))
        .route( "/trajectories", get( get_trajectories))
        .route( "/selection", get( get_selection).put( put_selection).delete( delete_selection))
        .route( "/status", get( get_status))
        .with_state( ServiceState{ tracker, map })
}

pub async fn serve (addr: SocketAddr, router: Router)->Result<()> {
    let listener = TcpListener::bind( addr).await?;
    info!("serving drone views on http://{}", addr);
    axum::serve( listener, router).await?;
    Ok(())
}

async fn get_drones (State(state): State<ServiceState>)->Result<Json<Vec<DroneEntry>>> {
    let drones = state.tracker.query( |t| {
        t.store().all().into_iter().map( |d| DroneEntry::from(d)).collect::<Vec<DroneEntry>>()
    }).await?;
    Ok( Json(drones))
}

async fn get_drone (State(state): State<ServiceState>, AxumPath(id): AxumPath<String>)->Result<Response> {
    let detail = state.tracker.query( move |t| {
        let store = t.store();
        store.drone( &id).map( |drone| DroneDetail {
            entry: DroneEntry::from(drone),
            trajectory: store.trajectory( &id).cloned()
        })
    }).await?;

    match detail {
        Some(detail) => Ok( Json(detail).into_response()),
        None => Ok( StatusCode::NOT_FOUND.into_response())
    }
}

async fn get_counts (State(state): State<ServiceState>)->Result<Json<Counts>> {
    let counts = state.tracker.query( |t| {
        let store = t.store();
        Counts { total: store.len(), red: store.red_count() }
    }).await?;
    Ok( Json(counts))
}

async fn get_trajectories (State(state): State<ServiceState>)->Result<Json<FeatureCollection>> {
    let features = state.tracker.query( |t| t.store().trajectory_features()).await?;
    Ok( Json(features))
}

async fn get_selection (State(state): State<ServiceState>)->Result<Json<SelectionView>> {
    let selection = state.tracker.query( |t| {
        let store = t.store();
        SelectionView {
            id: store.selected_id().map( |id| id.to_string()),
            drone: store.selected().map( |d| DroneEntry::from(d))
        }
    }).await?;
    Ok( Json(selection))
}

async fn put_selection (State(state): State<ServiceState>, Json(req): Json<SelectRequest>)->Result<StatusCode> {
    state.tracker.select( req.id).await?;
    Ok( StatusCode::NO_CONTENT)
}

async fn delete_selection (State(state): State<ServiceState>)->Result<StatusCode> {
    state.tracker.select( None).await?;
    Ok( StatusCode::NO_CONTENT)
}

async fn get_status (State(state): State<ServiceState>)->Result<Json<StatusView>> {
    let map = state.map.clone();
    let status = state.tracker.query( move |t| {
        StatusView {
            connected: t.is_connected(),
            connection: t.connection(),
            events: t.n_events(),
            rejected: t.n_rejected(),
            map
        }
    }).await?;
    Ok( Json(status))
}
