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

//! ASE codec/QoS negotiation for unicast stream establishment.

use crate::HostStatus;
use num_derive::{FromPrimitive, ToPrimitive};

/// Longest codec configuration / metadata LTV blob accepted from the
/// application. Matches the stack's own limit.
pub const MAX_LTV_LEN: usize = 128;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum UnicastAction {
    AseCodecConfigure = 0x01,
    AseQosConfigure = 0x02,
    AseEnable = 0x03,
    AseDisable = 0x04,
    AseRelease = 0x05,
    AseUpdateMetadata = 0x06,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum UnicastEvent {
    AseState = 0x01,
    /// The stack asks for the application's preferred QoS for an ASE
    /// before answering a codec-configure request from the remote.
    PreferQos = 0x02,
    MetadataUpdated = 0x03,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum AseDirection {
    Sink = 0x01,
    Source = 0x02,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AseCodecConfigureParams {
    pub conn_handle: u16,
    pub ase_id: u8,
    pub direction: AseDirection,
    /// Coding format plus company/vendor id, as on the wire.
    pub codec_id: [u8; 5],
    /// Codec-specific configuration LTVs, opaque to the bridge.
    pub codec_cfg: Vec<u8>,
}

impl AseCodecConfigureParams {
    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if self.ase_id == 0 {
            return Err("ase id is zero");
        }
        if self.codec_cfg.len() > MAX_LTV_LEN {
            return Err("codec configuration too long");
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AseQosConfigureParams {
    pub conn_handle: u16,
    pub ase_id: u8,
    pub cig_id: u8,
    pub cis_id: u8,
    /// SDU interval in microseconds, 0x0000FF..=0x0FFFFF.
    pub sdu_interval: u32,
    pub framed: bool,
    /// Maximum SDU size, 0x000..=0xFFF.
    pub max_sdu: u16,
    pub retransmission_number: u8,
    /// Maximum transport latency in milliseconds.
    pub max_transport_latency: u16,
    /// Presentation delay in microseconds.
    pub presentation_delay: u32,
}

impl AseQosConfigureParams {
    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if self.ase_id == 0 {
            return Err("ase id is zero");
        }
        if !(0x0000ff..=0x0fffff).contains(&self.sdu_interval) {
            return Err("sdu interval out of range");
        }
        if self.max_sdu > 0x0fff {
            return Err("max sdu out of range");
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AseEnableParams {
    pub conn_handle: u16,
    pub ase_id: u8,
    /// Streaming context metadata LTVs.
    pub metadata: Vec<u8>,
}

impl AseEnableParams {
    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if self.ase_id == 0 {
            return Err("ase id is zero");
        }
        if self.metadata.len() > MAX_LTV_LEN {
            return Err("metadata too long");
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AseParams {
    pub conn_handle: u16,
    pub ase_id: u8,
}

impl AseParams {
    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if self.ase_id == 0 {
            return Err("ase id is zero");
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AseUpdateMetadataParams {
    pub conn_handle: u16,
    pub ase_id: u8,
    pub metadata: Vec<u8>,
}

impl AseUpdateMetadataParams {
    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if self.ase_id == 0 {
            return Err("ase id is zero");
        }
        if self.metadata.len() > MAX_LTV_LEN {
            return Err("metadata too long");
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum AsePhase {
    Idle = 0x00,
    CodecConfigured = 0x01,
    QosConfigured = 0x02,
    Enabling = 0x03,
    Streaming = 0x04,
    Disabling = 0x05,
    Releasing = 0x06,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AseState {
    pub conn_handle: u16,
    pub ase_id: u8,
    pub phase: AsePhase,
    pub status: HostStatus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PreferQos {
    pub conn_handle: u16,
    pub ase_id: u8,
    pub direction: AseDirection,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MetadataUpdated {
    pub conn_handle: u16,
    pub ase_id: u8,
    pub status: HostStatus,
}

/// The application's QoS preference for one ASE, returned through the
/// direct-call path (or from the cached policy fallback).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QosPreference {
    pub retransmission_number: u8,
    /// Maximum transport latency in milliseconds.
    pub max_transport_latency: u16,
    /// Preferred presentation delay in microseconds.
    pub presentation_delay: u32,
}

impl Default for QosPreference {
    fn default() -> Self {
        Self { retransmission_number: 2, max_transport_latency: 20, presentation_delay: 40_000 }
    }
}
