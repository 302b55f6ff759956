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
use serde::Serialize;
use tokio::{sync::{mpsc::{self,error::TrySendError}, oneshot}, task::JoinHandle};
use tracing::{debug,info,warn};

use crate::{DroneStore, event::DroneEvent, errors::{Result,OdinDroneError}};

/// state of the connection to the drone event source, as reported by the connector
#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize)]
#[serde(rename_all="lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected
}

impl ConnectionState {
    pub fn is_connected (&self)->bool { *self == ConnectionState::Connected }
}

impl fmt::Display for ConnectionState {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!( f, "disconnected"),
            ConnectionState::Connecting => write!( f, "connecting"),
            ConnectionState::Connected => write!( f, "connected"),
        }
    }
}

type QueryFn = Box<dyn FnOnce(&DroneTracker) + Send>;

/// the messages processed by the tracker task
pub enum TrackerMsg {
    //--- from the connector
    Event(DroneEvent),
    Connection(ConnectionState),

    //--- from view consumers
    Select(Option<String>),
    Query(QueryFn),  // executed inside the tracker task, i.e. sees the latest applied event

    Terminate
}

impl fmt::Debug for TrackerMsg {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerMsg::Event(event) => write!( f, "Event({})", event),
            TrackerMsg::Connection(state) => write!( f, "Connection({})", state),
            TrackerMsg::Select(id) => write!( f, "Select({:?})", id),
            TrackerMsg::Query(_) => write!( f, "Query(..)"),
            TrackerMsg::Terminate => write!( f, "Terminate"),
        }
    }
}

/// owner of the [`DroneStore`]. All store mutation happens in the task that runs the tracker, in the order
/// in which messages were received. No locks are required since nobody else can reach the store
pub struct DroneTracker {
    store: DroneStore,
    connection: ConnectionState,
    n_events: u64,
    n_rejected: u64,
    update_action: Option<Box<dyn FnMut(&DroneStore) + Send>>, // triggered after each applied event
}

impl DroneTracker {
    pub fn new (store: DroneStore)->Self {
        DroneTracker { store, connection: ConnectionState::Disconnected, n_events: 0, n_rejected: 0, update_action: None }
    }

    pub fn with_update_action<F> (mut self, action: F)->Self where F: FnMut(&DroneStore) + Send + 'static {
        self.update_action = Some( Box::new(action));
        self
    }

    pub fn store (&self)->&DroneStore { &self.store }
    pub fn connection (&self)->ConnectionState { self.connection }
    pub fn is_connected (&self)->bool { self.connection.is_connected() }

    /// number of events that were applied so far
    pub fn n_events (&self)->u64 { self.n_events }

    /// number of features that were dropped by the decoder so far
    pub fn n_rejected (&self)->u64 { self.n_rejected }

    // returns false if we should terminate
    fn handle_msg (&mut self, msg: TrackerMsg)->bool {
        match msg {
            TrackerMsg::Event(event) => {
                self.store.apply( &event);
                self.n_events += 1;
                self.n_rejected += event.rejected as u64;

                if let Some(action) = &mut self.update_action {
                    action( &self.store);
                }
            }
            TrackerMsg::Connection(state) => {
                if state != self.connection {
                    info!("drone source {}", state);
                    self.connection = state; // note we keep all drones if we get disconnected
                }
            }
            TrackerMsg::Select(drone_id) => {
                debug!("select {:?}", drone_id);
                self.store.select( drone_id);
            }
            TrackerMsg::Query(query) => {
                query( self);
            }
            TrackerMsg::Terminate => {
                return false
            }
        }
        true
    }

    /// process messages until we get a Terminate or all handles are dropped. Returns the tracker so that
    /// callers can inspect the final state
    pub async fn run (mut self, mut rx: mpsc::Receiver<TrackerMsg>)->Self {
        while let Some(msg) = rx.recv().await {
            if !self.handle_msg( msg) { break }
        }
        info!("drone tracker terminated after {} events ({} drones)", self.n_events, self.store.len());
        self
    }
}

/// start a tokio task that runs the tracker and return the handle to send it messages
pub fn spawn_tracker (tracker: DroneTracker, capacity: usize)->(TrackerHandle, JoinHandle<DroneTracker>) {
    let (tx,rx) = mpsc::channel( capacity.max(1));
    let task = tokio::spawn( tracker.run(rx));
    (TrackerHandle{tx}, task)
}

/// cloneable sender side of the tracker
#[derive(Debug,Clone)]
pub struct TrackerHandle {
    tx: mpsc::Sender<TrackerMsg>
}

impl TrackerHandle {
    pub async fn send_msg (&self, msg: TrackerMsg)->Result<()> {
        self.tx.send( msg).await.map_err( |_| OdinDroneError::TrackerClosedError)
    }

    pub fn try_send_msg (&self, msg: TrackerMsg)->Result<()> {
        match self.tx.try_send( msg) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err( OdinDroneError::OpFailedError("tracker queue full".to_string())),
            Err(TrySendError::Closed(_)) => Err( OdinDroneError::TrackerClosedError),
        }
    }

    pub async fn send_event (&self, event: DroneEvent)->Result<()> {
        self.send_msg( TrackerMsg::Event(event)).await
    }

    pub async fn set_connection (&self, state: ConnectionState)->Result<()> {
        self.send_msg( TrackerMsg::Connection(state)).await
    }

    pub async fn select (&self, drone_id: Option<String>)->Result<()> {
        self.send_msg( TrackerMsg::Select(drone_id)).await
    }

    pub async fn terminate (&self)->Result<()> {
        self.send_msg( TrackerMsg::Terminate).await
    }

    pub fn is_closed (&self)->bool { self.tx.is_closed() }

    /// run `f` inside the tracker task and return its result
    pub async fn query<F,R> (&self, f: F)->Result<R> where F: FnOnce(&DroneTracker)->R + Send + 'static, R: Send + 'static {
        let (tx,rx) = oneshot::channel();
        let query: QueryFn = Box::new( move |tracker| {
            if tx.send( f(tracker)).is_err() {
                warn!("query result receiver dropped");
            }
        });

        self.send_msg( TrackerMsg::Query(query)).await?;
        rx.await.map_err( |_| OdinDroneError::TrackerClosedError)
    }
}
