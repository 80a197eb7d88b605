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

//! Microphone mute and input gain control.

use num_derive::{FromPrimitive, ToPrimitive};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum MicAction {
    Mute = 0x01,
    Unmute = 0x02,
    SetGain = 0x03,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum MicEvent {
    State = 0x01,
    GainState = 0x02,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MicTargetParams {
    pub conn_handle: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SetMicGainParams {
    pub conn_handle: u16,
    /// Gain setting in units declared by the remote's gain properties.
    pub gain: i8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MicState {
    pub conn_handle: u16,
    pub muted: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MicGainState {
    pub conn_handle: u16,
    pub gain: i8,
    pub change_counter: u8,
}
