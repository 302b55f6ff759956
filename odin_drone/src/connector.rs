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

use std::{future::Future, time::Duration};
use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{debug,info,warn};

use crate::{
    actor::{ConnectionState, TrackerHandle},
    config::DroneConfig,
    errors::{Result,OdinDroneError},
    event::decode_event,
    jsonl::JsonLinesConnector,
    ws::WsConnector
};

/// the import side of drone tracking. Connectors read drone events from an external source and send
/// them to the tracker, together with changes of the connection state
#[async_trait]
pub trait DroneConnector: Send {
    async fn start (&mut self, tracker: TrackerHandle)->Result<()>;
    fn terminate (&mut self);
}

/// pick the connector for the configured url scheme (ws://, wss:// or tcp://)
pub fn connector_for (config: &DroneConfig)->Result<Box<dyn DroneConnector>> {
    let url = config.url.as_str();

    if url.starts_with("ws://") || url.starts_with("wss://") {
        Ok( Box::new( WsConnector::new( url.to_string(), config.reconnect_delay)))
    } else if let Some(addr) = url.strip_prefix("tcp://") {
        Ok( Box::new( JsonLinesConnector::new( addr.to_string(), config.reconnect_delay)))
    } else {
        Err( OdinDroneError::UnsupportedUrlError( url.to_string()))
    }
}

/// decode a received message and hand it over to the tracker. Undecodable messages are logged and skipped,
/// the only error we pass up is a closed tracker
pub async fn process_payload (payload: &str, tracker: &TrackerHandle)->Result<()> {
    match decode_event( payload) {
        Ok(event) => {
            if event.is_empty() && event.rejected == 0 { return Ok(()) }
            tracker.send_event( event).await
        }
        Err(e) => {
            warn!("ignoring malformed drone message: {}", e);
            Ok(())
        }
    }
}

/// run connection sessions until the tracker goes away, reconnecting after `reconnect_delay` if set.
/// Each session is expected to report `Connected` once it is established, we report the other states
pub async fn run_with_reconnect<F,Fut> (source: String, reconnect_delay: Option<Duration>, tracker: TrackerHandle, mut session: F)
    where F: FnMut()->Fut, Fut: Future<Output=Result<()>>
{
    loop {
        if tracker.set_connection( ConnectionState::Connecting).await.is_err() { return }

        match session().await {
            Ok(()) => info!("drone source {} closed the connection", source),
            Err(OdinDroneError::TrackerClosedError) => return,
            Err(e) => warn!("drone source {} failed: {}", source, e)
        }

        if tracker.set_connection( ConnectionState::Disconnected).await.is_err() { return }

        match reconnect_delay {
            Some(delay) => {
                debug!("reconnecting to {} in {:?}", source, delay);
                sleep( delay).await
            }
            None => return
        }
    }
}
