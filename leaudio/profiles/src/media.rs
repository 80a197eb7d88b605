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

//! Media control.

use crate::HostStatus;
use num_derive::{FromPrimitive, ToPrimitive};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum MediaAction {
    Control = 0x01,
    ReadTrackTitle = 0x02,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum MediaEvent {
    State = 0x01,
    /// Track changed; the new title travels in the event buffer.
    TrackChanged = 0x02,
    ControlResult = 0x03,
    TitleRead = 0x04,
}

/// Media control point opcodes, as on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum MediaOp {
    Play = 0x01,
    Pause = 0x02,
    FastRewind = 0x03,
    FastForward = 0x04,
    Stop = 0x05,
    MoveRelative = 0x10,
    PreviousTrack = 0x30,
    NextTrack = 0x31,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MediaControlParams {
    pub conn_handle: u16,
    pub op: MediaOp,
    /// Position offset in 0.01 s units; meaningful only for
    /// `MediaOp::MoveRelative`.
    pub offset: i32,
}

impl MediaControlParams {
    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if self.op != MediaOp::MoveRelative && self.offset != 0 {
            return Err("offset given for an opcode that takes none");
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadTrackTitleParams {
    pub conn_handle: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum MediaPhase {
    Inactive = 0x00,
    Playing = 0x01,
    Paused = 0x02,
    Seeking = 0x03,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MediaState {
    pub conn_handle: u16,
    pub phase: MediaPhase,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrackChanged {
    pub conn_handle: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControlResult {
    pub conn_handle: u16,
    pub op: MediaOp,
    pub result: HostStatus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TitleRead {
    pub conn_handle: u16,
    pub status: HostStatus,
}
