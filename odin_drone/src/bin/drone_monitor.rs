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

use anyhow::Result;
use clap::Parser;
use tracing::{info,warn};
use odin_drone::{
    DroneStore,
    actor::{DroneTracker, spawn_tracker},
    config::{DroneConfig, MapAvailability, load_config},
    connector::connector_for,
    drone_service,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = "track drones from a live event stream and serve the drone views")]
pub struct Args {
    /// config file (looked up in $ODIN_ROOT/configs/odin_drone/ if not a path)
    #[arg(short,long, default_value = "drone.ron")]
    pub config: String,

    /// override the configured url of the drone event source
    #[arg(short,long)]
    pub url: Option<String>,

    /// print the drone list after each received event
    #[arg(short,long)]
    pub verbose: bool,
}

#[tokio::main]
async fn main()->Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let mut config: DroneConfig = load_config( &args.config)?;
    if let Some(url) = &args.url { config.url = url.clone(); }

    let map = config.map.availability();
    match &map {
        MapAvailability::Available{style,..} => info!("map available with style {}", style),
        MapAvailability::Unavailable{reason} => warn!("map unavailable: {}", reason)
    }

    let verbose = args.verbose;
    let tracker = DroneTracker::new( DroneStore::with_max_trace( config.max_trace))
        .with_update_action( move |store| {
            info!("{} drones, {} red", store.len(), store.red_count());
            if verbose {
                for drone in store.all() { println!("  {}", drone) }
            }
        });
    let (htracker, tracker_task) = spawn_tracker( tracker, config.channel_capacity);

    let mut connector = connector_for( &config)?;
    connector.start( htracker.clone()).await?;
    info!("importing drone events from {} ({})", config.source, config.url);

    let server_task = config.serve_addr.map( |addr| {
        let router = drone_service::router( htracker.clone(), map.clone());
        tokio::spawn( drone_service::serve( addr, router))
    });

    tokio::signal::ctrl_c().await?;
    info!("shutting down");

    connector.terminate();
    if let Some(task) = server_task { task.abort(); }
    htracker.terminate().await?;
    let tracker = tracker_task.await?;
    info!("processed {} events, {} drones tracked", tracker.n_events(), tracker.store().len());

    Ok(())
}
