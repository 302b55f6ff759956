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

//! import of drone events from a TCP socket that streams newline delimited JSON (one event per line)

use std::time::Duration;
use async_trait::async_trait;
use tokio::{net::TcpStream, io::{AsyncBufRead, AsyncBufReadExt, BufReader}, task::JoinHandle};
use tracing::{info,warn};

use crate::{
    actor::{ConnectionState, TrackerHandle, TrackerMsg},
    connector::{DroneConnector, process_payload, run_with_reconnect},
    errors::{Result,OdinDroneError}
};

pub struct JsonLinesConnector {
    addr: String, // host:port
    reconnect_delay: Option<Duration>,
    tracker: Option<TrackerHandle>,
    task: Option<JoinHandle<()>>,
}

impl JsonLinesConnector {
    pub fn new (addr: String, reconnect_delay: Option<Duration>)->Self {
        JsonLinesConnector { addr, reconnect_delay, tracker: None, task: None }
    }
}

#[async_trait]
impl DroneConnector for JsonLinesConnector {
    async fn start (&mut self, tracker: TrackerHandle)->Result<()> {
        if self.task.is_some() {
            return Err( OdinDroneError::OpFailedError( format!("json-lines connector for {} already started", self.addr)))
        }

        let addr = self.addr.clone();
        let session_tracker = tracker.clone();
        let loop_tracker = tracker.clone();

        self.task = Some( tokio::spawn(
            run_with_reconnect( self.addr.clone(), self.reconnect_delay, loop_tracker, move || {
                read_socket( addr.clone(), session_tracker.clone())
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
                warn!("failed to report disconnect of {} to tracker: {}", self.addr, e);
            }
        }
    }
}

/// one socket session. Returns Ok if the peer closed the connection
pub async fn read_socket (addr: String, tracker: TrackerHandle)->Result<()> {
    let stream = TcpStream::connect( addr.as_str()).await?;
    info!("connected to drone source {}", addr);
    tracker.set_connection( ConnectionState::Connected).await?;

    let reader = BufReader::with_capacity( 8192, stream);
    read_lines( reader, &tracker).await
}

/// forward each non-blank line of `reader` as a drone event, until EOF
pub async fn read_lines<R> (mut reader: R, tracker: &TrackerHandle)->Result<()> where R: AsyncBufRead + Unpin {
    let mut line = String::with_capacity(1024);

    loop {
        line.clear();
        if reader.read_line( &mut line).await? == 0 { break } // EOF

        let payload = line.trim();
        if !payload.is_empty() {
            process_payload( payload, tracker).await?;
        }
    }

    Ok(())
}
