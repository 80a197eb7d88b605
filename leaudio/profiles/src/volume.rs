// Copyright 2024, The Android Open Source Project
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Absolute volume and volume offset control.

use num_derive::{FromPrimitive, ToPrimitive};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum VolumeAction {
    SetAbsoluteVolume = 0x01,
    Mute = 0x02,
    Unmute = 0x03,
    SetVolumeOffset = 0x04,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum VolumeEvent {
    State = 0x01,
    OffsetState = 0x02,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SetAbsoluteVolumeParams {
    pub conn_handle: u16,
    pub volume: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VolumeTargetParams {
    pub conn_handle: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SetVolumeOffsetParams {
    pub conn_handle: u16,
    /// Volume offset, -255..=255.
    pub offset: i16,
}

impl SetVolumeOffsetParams {
    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if !(-255..=255).contains(&self.offset) {
            return Err("volume offset out of range");
        }
        Ok(())
    }
}

/// Volume state characteristic value as notified by the remote.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VolumeState {
    pub conn_handle: u16,
    pub volume: u8,
    pub muted: bool,
    pub change_counter: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VolumeOffsetState {
    pub conn_handle: u16,
    pub offset: i16,
    pub change_counter: u8,
}
