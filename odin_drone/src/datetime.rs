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

use std::{fmt, time::Duration};
use chrono::{DateTime,Utc};
use serde::{Serialize,Deserialize};

/// wall clock time stamp in milliseconds since the unix epoch.
/// This is what the store attaches to drone records and trajectory points, and what we
/// serialize (a plain JSON number)
#[derive(Debug,Clone,Copy,PartialEq,Eq,PartialOrd,Ord,Hash,Serialize,Deserialize)]
#[serde(transparent)]
pub struct EpochMillis(i64);

impl EpochMillis {
    pub fn now ()->Self { EpochMillis( utc_now().timestamp_millis()) }

    pub fn new (millis: i64)->Self { EpochMillis(millis) }

    pub fn millis (&self)->i64 { self.0 }

    /// time elapsed since `earlier`, saturating at zero if the clock went backwards
    pub fn since (&self, earlier: EpochMillis)->Duration {
        Duration::from_millis( self.0.saturating_sub( earlier.0).max(0) as u64)
    }

    pub fn to_datetime (&self)->Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp_millis( self.0)
    }
}

impl fmt::Display for EpochMillis {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(date) => write!( f, "{}", date.format("%Y-%m-%dT%H:%M:%S%.3fZ")),
            None => write!( f, "{}ms", self.0)
        }
    }
}

impl From<DateTime<Utc>> for EpochMillis {
    fn from (date: DateTime<Utc>)->Self { EpochMillis( date.timestamp_millis()) }
}

// single place to switch to a simulation clock
#[inline]
pub fn utc_now ()->DateTime<Utc> {
    Utc::now()
}
