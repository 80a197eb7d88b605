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

//! Coordinated set discovery and locking.

use crate::{Addr, HostStatus};
use num_derive::{FromPrimitive, ToPrimitive};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum CoordSetAction {
    Discover = 0x01,
    LockRequest = 0x02,
    LockRelease = 0x03,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum CoordSetEvent {
    SetFound = 0x01,
    LockState = 0x02,
    DiscoverDone = 0x03,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiscoverParams {
    pub conn_handle: u16,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockParams {
    /// Set members to lock or unlock, in rank order.
    pub conn_handles: Vec<u16>,
}

impl LockParams {
    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if self.conn_handles.is_empty() {
            return Err("no set members given");
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SetFound {
    pub addr: Addr,
    pub sirk: [u8; 16],
    pub set_size: u8,
    pub rank: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LockState {
    pub conn_handle: u16,
    pub locked: bool,
    pub status: HostStatus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiscoverDone {
    pub conn_handle: u16,
    pub set_size: u8,
    pub status: HostStatus,
}
