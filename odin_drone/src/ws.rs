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

//! import of drone events from a websocket server that sends one FeatureCollection JSON text message per event

use std::time::Duration;
use async_trait::async_trait;
use futures_util::stream::StreamExt;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use tracing::{info,warn};

use crate::{
    actor::{ConnectionState, TrackerHandle, TrackerMsg},
    connector::{DroneConnector, process_payload, run_with_reconnect},
    errors::{Result,OdinDroneError}
};

pub struct WsConnector {
    url: String,
    reconnect_delay: Option<Duration>,
    tracker: Option<TrackerHandle>,
    task: Option<JoinHandle<()>>,
}

impl WsConnector {
    pub fn new (url: String, reconnect_delay: Option<Duration>)->Self {
        WsConnector { url, reconnect_delay, tracker: None, task: None }
    }
}

#[async_trait]
impl DroneConnector for WsConnector {
    async fn start (&mut self, tracker: TrackerHandle)->Result<()> {
        if self.task.is_some() {
            return Err( OdinDroneError::OpFailedError( format!("websocket connector for {} already started", self.url)))
        }

        let url = self.url.clone();
        let session_tracker = tracker.clone();
        let loop_tracker = tracker.clone();

        self.task = Some( tokio::spawn(
            run_with_reconnect( self.url.clone(), self.reconnect_delay, loop_tracker, move || {
                read_ws( url.clone(), session_tracker.clone())
            })
        ));
        self.tracker = Some( tracker);

        Ok(())
    }

    fn terminate (&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        if let Some(tracker) = self.tracker.take() {
            // the aborted task can't report this anymore
            if let Err(e) = tracker.try_send_msg( TrackerMsg::Connection( ConnectionState::Disconnected)) {
                warn!("failed to report disconnect of {} to tracker: {}", self.url, e);
            }
        }
    }
}

/// one websocket session. Returns Ok if the server closed the connection
pub async fn read_ws (url: String, tracker: TrackerHandle)->Result<()> {
    let (mut ws_stream, _response) = connect_async( url.as_str()).await?;
    info!("connected to drone source {}", url);
    tracker.set_connection( ConnectionState::Connected).await?;

    while let Some(msg) = ws_stream.next().await {
        match msg? {
            Message::Text(text) => process_payload( text.as_str(), &tracker).await?,
            Message::Binary(bytes) => match std::str::from_utf8( &bytes) {
                Ok(text) => process_payload( text, &tracker).await?,
                Err(_) => warn!("ignoring non-UTF8 binary message from {}", url)
            }
            Message::Close(_) => break,
            _ => {} // ping/pong is handled by tungstenite
        }
    }

    Ok(())
}
