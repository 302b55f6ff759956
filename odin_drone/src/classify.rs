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

//! drone classification. The category of a drone is derived from its identifier alone

use std::fmt;
use serde::Serialize;

/// identifiers containing this marker belong to flying drones
pub const FLYING_MARKER: &'static str = "-B";

pub const GREEN_DRONE_COLOR: &'static str = "#10B981";
pub const RED_DRONE_COLOR: &'static str = "#EF4444";

#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash,Serialize)]
#[serde(rename_all="lowercase")]
pub enum DroneCategory {
    Flying,   // green
    Grounded  // red
}

impl DroneCategory {
    pub fn color (&self)->&'static str {
        match self {
            DroneCategory::Flying => GREEN_DRONE_COLOR,
            DroneCategory::Grounded => RED_DRONE_COLOR,
        }
    }

    pub fn is_flying (&self)->bool { *self == DroneCategory::Flying }
}

impl fmt::Display for DroneCategory {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DroneCategory::Flying => write!( f, "flying"),
            DroneCategory::Grounded => write!( f, "grounded"),
        }
    }
}

pub fn classify (drone_id: &str)->DroneCategory {
    if drone_id.contains( FLYING_MARKER) { DroneCategory::Flying } else { DroneCategory::Grounded }
}

#[inline]
pub fn is_flying_drone (drone_id: &str)->bool {
    classify( drone_id).is_flying()
}

pub fn color_for (drone_id: &str)->&'static str {
    classify( drone_id).color()
}
