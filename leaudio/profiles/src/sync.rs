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

//! Broadcast announcement discovery and periodic-advertising sync.

use crate::{Addr, HostStatus};
use num_derive::{FromPrimitive, ToPrimitive};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum SyncAction {
    ScanStart = 0x01,
    ScanStop = 0x02,
    PaSyncEstablish = 0x03,
    PaSyncTerminate = 0x04,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum SyncEvent {
    /// Broadcast announcement seen while scanning. Carries the raw
    /// advertising payload in the event buffer.
    AnnouncementReport = 0x01,
    ScanState = 0x02,
    PaSyncState = 0x03,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanStartParams {
    /// Scan interval, in 0.625 ms units.
    pub interval: u16,
    /// Scan window, in 0.625 ms units. Must not exceed the interval.
    pub window: u16,
}

impl ScanStartParams {
    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if self.interval == 0 {
            return Err("scan interval is zero");
        }
        if self.window == 0 || self.window > self.interval {
            return Err("scan window out of range");
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaSyncEstablishParams {
    pub adv_addr: Addr,
    /// Advertising set id, 0x00..=0x0F.
    pub adv_sid: u8,
    /// Number of periodic advertising events that may be skipped,
    /// 0x0000..=0x01F3.
    pub skip: u16,
    /// Sync timeout in 10 ms units, 0x000A..=0x4000.
    pub timeout: u16,
}

impl PaSyncEstablishParams {
    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if self.adv_sid > 0x0f {
            return Err("advertising sid out of range");
        }
        if self.skip > 0x01f3 {
            return Err("pa sync skip out of range");
        }
        if !(0x000a..=0x4000).contains(&self.timeout) {
            return Err("pa sync timeout out of range");
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaSyncTerminateParams {
    pub sync_handle: u16,
}

/// Scan enable/disable transition reported by the stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanState {
    pub scanning: bool,
    pub status: HostStatus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum PaSyncPhase {
    Synchronizing = 0x00,
    Synchronized = 0x01,
    Terminated = 0x02,
    Lost = 0x03,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaSyncState {
    pub sync_handle: u16,
    pub phase: PaSyncPhase,
    pub status: HostStatus,
}

/// Fixed fields of an announcement report. The advertising payload
/// travels in the event buffer, copied out of the stack's report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnnouncementReport {
    pub addr: Addr,
    pub adv_sid: u8,
    pub broadcast_id: u32,
    pub rssi: i8,
}
