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

use anyhow::{Result,anyhow};
use clap::Parser;
use futures_util::stream::StreamExt;
use tokio::{net::TcpStream, io::{AsyncBufReadExt, BufReader}};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use odin_drone::{classify::classify, event::decode_event};

#[derive(Parser, Debug)]
#[command(version, about = "drone event stream monitoring tool")]
pub struct Args {
    /// ws://, wss:// or tcp:// url from where to read drone events
    pub url: String,
}

fn print_event (payload: &str) {
    match decode_event( payload) {
        Ok(event) => {
            println!("{event}");
            for report in &event.reports {
                println!("  [{}] {}", classify( &report.id), report);
            }
        }
        Err(e) => println!("PARSE ERROR {} for {}", e, payload)
    }
}

#[tokio::main]
async fn main()->Result<()> {
    let args = Args::parse();

    if let Some(addr) = args.url.strip_prefix("tcp://") {
        let stream = TcpStream::connect( addr).await?;
        let mut lines = BufReader::with_capacity( 8192, stream).lines();
        while let Some(line) = lines.next_line().await? {
            if !line.trim().is_empty() { print_event( &line) }
        }

    } else if args.url.starts_with("ws://") || args.url.starts_with("wss://") {
        let (mut ws_stream,_) = connect_async( args.url.as_str()).await?;
        while let Some(msg) = ws_stream.next().await {
            match msg? {
                Message::Text(text) => print_event( text.as_str()),
                Message::Close(_) => break,
                _ => {}
            }
        }

    } else {
        return Err( anyhow!("unsupported url {}", args.url))
    }

    Ok(())
}
