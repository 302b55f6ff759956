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

use std::{env, fs, net::SocketAddr, path::{Path,PathBuf}, time::Duration};
use serde::{Serialize,Deserialize,de::DeserializeOwned};
use tracing::debug;

use crate::{DEFAULT_MAX_TRACE, errors::{Result,OdinDroneError}};

/// env var that can provide the map access token if it is not in the config file
pub const ACCESS_TOKEN_ENV: &'static str = "ODIN_MAP_ACCESS_TOKEN";

/// env var for the root of the ODIN directory tree (configs are looked up in `$ODIN_ROOT/configs/odin_drone/`)
pub const ODIN_ROOT_ENV: &'static str = "ODIN_ROOT";

pub const DEFAULT_SOURCE_URL: &'static str = "ws://localhost:9013";
pub const DEFAULT_MAP_STYLE: &'static str = "mapbox://styles/mapbox/light-v11";

#[derive(Deserialize,Serialize,Debug,Clone)]
pub struct DroneConfig {
    pub source: String, // name of the data source, only used for display and logging
    pub url: String, // ws://, wss:// or tcp:// url of the server that streams drone events

    #[serde(default="default_max_trace")]
    pub max_trace: usize, // max number of trajectory points to keep per drone

    #[serde(default)]
    pub reconnect_delay: Option<Duration>, // if set we try to reconnect after the stream was closed

    #[serde(default="default_channel_capacity")]
    pub channel_capacity: usize, // of the tracker message queue

    #[serde(default)]
    pub serve_addr: Option<SocketAddr>, // where to serve the view routes, no server if not set

    #[serde(default)]
    pub map: MapConfig,
}

fn default_max_trace ()->usize { DEFAULT_MAX_TRACE }
fn default_channel_capacity ()->usize { 256 }

impl Default for DroneConfig {
    fn default()->Self {
        DroneConfig {
            source: "drones".to_string(),
            url: DEFAULT_SOURCE_URL.to_string(),
            max_trace: DEFAULT_MAX_TRACE,
            reconnect_delay: Some( Duration::from_secs(5)),
            channel_capacity: default_channel_capacity(),
            serve_addr: None,
            map: MapConfig::default(),
        }
    }
}

#[derive(Deserialize,Serialize,Debug,Clone,PartialEq)]
pub struct Viewport {
    pub longitude: f64,
    pub latitude: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default()->Self {
        Viewport { longitude: 35.93131881204147, latitude: 31.94878648036645, zoom: 10.0 }
    }
}

/// the map display settings we hand out to view consumers. We don't render maps ourselves
#[derive(Deserialize,Serialize,Debug,Clone)]
pub struct MapConfig {
    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default="default_map_style")]
    pub style: String,

    #[serde(default)]
    pub viewport: Viewport,
}

fn default_map_style ()->String { DEFAULT_MAP_STYLE.to_string() }

impl Default for MapConfig {
    fn default()->Self {
        MapConfig { access_token: None, style: default_map_style(), viewport: Viewport::default() }
    }
}

impl MapConfig {
    /// check if we have a map access token, either from the config or from the ODIN_MAP_ACCESS_TOKEN env var
    pub fn availability (&self)->MapAvailability {
        self.availability_with( env::var( ACCESS_TOKEN_ENV).ok())
    }

    /// the configured token takes precedence over `env_token`. Blank tokens count as missing
    pub fn availability_with (&self, env_token: Option<String>)->MapAvailability {
        let token = self.access_token.iter().chain( env_token.iter())
            .map( |t| t.trim())
            .find( |t| !t.is_empty());

        match token {
            Some(token) => MapAvailability::Available {
                style: self.style.clone(),
                access_token: token.to_string(),
                viewport: self.viewport.clone()
            },
            None => MapAvailability::Unavailable {
                reason: format!("map access token is missing, set 'access_token' in the map config or the {} environment variable", ACCESS_TOKEN_ENV)
            }
        }
    }
}

/// what view consumers need to know about the map display. A missing credential is not an error, it just
/// makes the map unavailable
#[derive(Serialize,Debug,Clone,PartialEq)]
#[serde(tag="status", rename_all="lowercase")]
pub enum MapAvailability {
    Available { style: String, access_token: String, viewport: Viewport },
    Unavailable { reason: String }
}

impl MapAvailability {
    pub fn is_available (&self)->bool { matches!( self, MapAvailability::Available{..}) }
}

/// lookup order is: the filename as given, `$ODIN_ROOT/configs/odin_drone/<filename>`, `<crate>/configs/<filename>`
pub fn find_config_file (filename: &str)->Option<PathBuf> {
    let path = Path::new( filename);
    if path.is_file() { return Some( path.to_path_buf()) }

    if let Ok(root) = env::var( ODIN_ROOT_ENV) {
        let path = Path::new( &root).join( "configs").join( env!("CARGO_PKG_NAME")).join( filename);
        if path.is_file() { return Some( path) }
    }

    let path = Path::new( env!("CARGO_MANIFEST_DIR")).join( "configs").join( filename);
    if path.is_file() { Some( path) } else { None }
}

pub fn load_config<C> (filename: &str)->Result<C> where C: DeserializeOwned {
    match find_config_file( filename) {
        Some(path) => {
            debug!("loading config from {:?}", path);
            let src = fs::read_to_string( &path)?;
            parse_config( &src)
        }
        None => Err( OdinDroneError::ConfigNotFoundError( filename.to_string()))
    }
}

pub fn parse_config<C> (src: &str)->Result<C> where C: DeserializeOwned {
    Ok( ron::from_str( src)? )
}
