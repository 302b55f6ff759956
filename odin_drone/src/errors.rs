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

use thiserror::Error;

pub type Result<T> = std::result::Result<T,OdinDroneError>;

#[derive(Error,Debug)]
pub enum OdinDroneError {

    #[error("parse error {0}")]
    ParseError(String),

    #[error("JSON error {0}")]
    JsonError( #[from] serde_json::Error),

    #[error("config error {0}")]
    ConfigError( #[from] ron::error::SpannedError),

    #[error("config not found {0}")]
    ConfigNotFoundError(String),

    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("websocket error {0}")]
    WsError( #[from] Box<tokio_tungstenite::tungstenite::Error>),

    #[error("unsupported source url {0}")]
    UnsupportedUrlError(String),

    #[error("drone tracker is closed")]
    TrackerClosedError,

    #[error("operation failed {0}")]
    OpFailedError(String)
}

impl From<tokio_tungstenite::tungstenite::Error> for OdinDroneError {
    fn from (e: tokio_tungstenite::tungstenite::Error)->Self {
        OdinDroneError::WsError( Box::new(e))
    }
}

macro_rules! parse_error {
    ($fmt:literal $(, $arg:expr )* ) => {
        OdinDroneError::ParseError( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use parse_error;
