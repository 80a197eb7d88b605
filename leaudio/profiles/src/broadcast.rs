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

//! Broadcast source configuration and broadcast sink (BIG) sync.

use crate::{Addr, HostStatus};
use num_derive::{FromPrimitive, ToPrimitive};

pub const MAX_SUBGROUPS: usize = 2;
pub const MAX_BIS: usize = 4;
pub const MAX_METADATA_LEN: usize = 128;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum SourceAction {
    Start = 0x01,
    Reconfigure = 0x02,
    UpdateMetadata = 0x03,
    Stop = 0x04,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum SourceEvent {
    State = 0x01,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum SinkAction {
    BigSyncEstablish = 0x01,
    BigSyncTerminate = 0x02,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum SinkEvent {
    State = 0x01,
    /// Received ISO SDU, delivered with the payload in the event buffer.
    IsoData = 0x02,
    /// The stack asks which PA sync parameters to use for a source added
    /// by a remote scan assistant.
    PaSyncRequest = 0x03,
    /// The stack asks which BIS to synchronize to and with what timeout.
    BigSyncRequest = 0x04,
    /// The stack asks for the broadcast code of an encrypted stream.
    BroadcastCodeRequest = 0x05,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubgroupConfig {
    /// Number of BIS carried by this subgroup.
    pub bis_count: u8,
    /// Codec-specific configuration LTVs.
    pub codec_cfg: Vec<u8>,
    /// Streaming context metadata LTVs.
    pub metadata: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceStartParams {
    pub subgroups: Vec<SubgroupConfig>,
    /// SDU interval in microseconds.
    pub sdu_interval: u32,
    pub max_sdu: u16,
    pub retransmission_number: u8,
    pub encrypted: bool,
    pub broadcast_code: [u8; 16],
}

impl SourceStartParams {
    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if self.subgroups.is_empty() || self.subgroups.len() > MAX_SUBGROUPS {
            return Err("subgroup count out of range");
        }
        let bis: usize = self.subgroups.iter().map(|s| s.bis_count as usize).sum();
        if bis == 0 || bis > MAX_BIS {
            return Err("bis count out of range");
        }
        if self.subgroups.iter().any(|s| s.metadata.len() > MAX_METADATA_LEN) {
            return Err("subgroup metadata too long");
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceReconfigureParams {
    pub broadcast_id: u32,
    pub subgroups: Vec<SubgroupConfig>,
}

impl SourceReconfigureParams {
    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if self.subgroups.is_empty() || self.subgroups.len() > MAX_SUBGROUPS {
            return Err("subgroup count out of range");
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceUpdateMetadataParams {
    pub broadcast_id: u32,
    pub metadata: Vec<u8>,
}

impl SourceUpdateMetadataParams {
    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if self.metadata.len() > MAX_METADATA_LEN {
            return Err("metadata too long");
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceStopParams {
    pub broadcast_id: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BigSyncEstablishParams {
    pub sync_handle: u16,
    /// Indices of the BIS to synchronize to, 1..=31 each.
    pub bis: Vec<u8>,
    pub broadcast_code: Option<[u8; 16]>,
    /// Maximum subevents the controller may use, 0 = any.
    pub mse: u8,
    /// Sync timeout in 10 ms units, 0x000A..=0x4000.
    pub timeout: u16,
}

impl BigSyncEstablishParams {
    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if self.bis.is_empty() || self.bis.len() > MAX_BIS {
            return Err("bis selection out of range");
        }
        if self.bis.iter().any(|&i| i == 0 || i > 0x1f) {
            return Err("bis index out of range");
        }
        if !(0x000a..=0x4000).contains(&self.timeout) {
            return Err("big sync timeout out of range");
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BigSyncTerminateParams {
    pub big_handle: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum SourcePhase {
    Idle = 0x00,
    Configured = 0x01,
    Streaming = 0x02,
    Stopped = 0x03,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceState {
    pub broadcast_id: u32,
    pub phase: SourcePhase,
    pub status: HostStatus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum SinkPhase {
    Synchronizing = 0x00,
    Synchronized = 0x01,
    Terminated = 0x02,
    Lost = 0x03,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkState {
    pub big_handle: u16,
    pub phase: SinkPhase,
    pub status: HostStatus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum SduStatus {
    Valid = 0x00,
    PossiblyInvalid = 0x01,
    Lost = 0x02,
}

/// Fixed fields of a received ISO SDU. The SDU bytes travel in the event
/// buffer; the stack's own buffer is acknowledged by the router.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IsoSdu {
    pub conn_handle: u16,
    pub seq_num: u16,
    pub timestamp: u32,
    pub status: SduStatus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaSyncRequest {
    pub source_id: u8,
    pub addr: Addr,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BigSyncRequest {
    pub source_id: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BroadcastCodeRequest {
    pub source_id: u8,
}

/// PA sync parameters answered through the direct-call path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaSyncAnswer {
    pub skip: u16,
    /// Sync timeout in 10 ms units.
    pub timeout: u16,
}

impl Default for PaSyncAnswer {
    fn default() -> Self {
        Self { skip: 0, timeout: 0x0064 }
    }
}

/// BIG sync parameters answered through the direct-call path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BigSyncAnswer {
    /// Bitmask of BIS indices to synchronize to.
    pub bis_mask: u32,
    /// Sync timeout in 10 ms units.
    pub timeout: u16,
}

impl Default for BigSyncAnswer {
    fn default() -> Self {
        Self { bis_mask: 0x0000_0001, timeout: 0x0064 }
    }
}
