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

use crate::broadcast::{
    BigSyncEstablishParams, BigSyncTerminateParams, SinkAction, SourceAction,
    SourceReconfigureParams, SourceStartParams, SourceStopParams, SourceUpdateMetadataParams,
};
use crate::csip::{CoordSetAction, DiscoverParams, LockParams};
use crate::media::{MediaAction, MediaControlParams, ReadTrackTitleParams};
use crate::mic::{MicAction, MicTargetParams, SetMicGainParams};
use crate::sync::{PaSyncEstablishParams, PaSyncTerminateParams, ScanStartParams, SyncAction};
use crate::unicast::{
    AseCodecConfigureParams, AseEnableParams, AseParams, AseQosConfigureParams,
    AseUpdateMetadataParams, UnicastAction,
};
use crate::volume::{
    SetAbsoluteVolumeParams, SetVolumeOffsetParams, VolumeAction, VolumeTargetParams,
};
use crate::{volume, Capabilities, Group};

/// Identifier of a caller-initiated operation: the (group, code) pair
/// that keys an outstanding call in the pending-command table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Sync(SyncAction),
    Unicast(UnicastAction),
    Volume(VolumeAction),
    Mic(MicAction),
    BroadcastSource(SourceAction),
    BroadcastSink(SinkAction),
    CoordSet(CoordSetAction),
    Media(MediaAction),
}

impl Action {
    pub fn group(self) -> Group {
        match self {
            Self::Sync(_) => Group::Sync,
            Self::Unicast(_) => Group::Unicast,
            Self::Volume(_) => Group::Volume,
            Self::Mic(_) => Group::Mic,
            Self::BroadcastSource(_) => Group::BroadcastSource,
            Self::BroadcastSink(_) => Group::BroadcastSink,
            Self::CoordSet(_) => Group::CoordSet,
            Self::Media(_) => Group::Media,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Sync(a) => a as u8,
            Self::Unicast(a) => a as u8,
            Self::Volume(a) => a as u8,
            Self::Mic(a) => a as u8,
            Self::BroadcastSource(a) => a as u8,
            Self::BroadcastSink(a) => a as u8,
            Self::CoordSet(a) => a as u8,
            Self::Media(a) => a as u8,
        }
    }
}

/// Typed parameters of every action the bridge can issue, one variant
/// per action. The bridge validates these against the preconditions the
/// stack documents and otherwise treats them as opaque.
#[derive(Clone, Debug, PartialEq)]
pub enum ActionParams {
    ScanStart(ScanStartParams),
    ScanStop,
    PaSyncEstablish(PaSyncEstablishParams),
    PaSyncTerminate(PaSyncTerminateParams),
    AseCodecConfigure(AseCodecConfigureParams),
    AseQosConfigure(AseQosConfigureParams),
    AseEnable(AseEnableParams),
    AseDisable(AseParams),
    AseRelease(AseParams),
    AseUpdateMetadata(AseUpdateMetadataParams),
    SetAbsoluteVolume(SetAbsoluteVolumeParams),
    Mute(VolumeTargetParams),
    Unmute(VolumeTargetParams),
    SetVolumeOffset(SetVolumeOffsetParams),
    MicMute(MicTargetParams),
    MicUnmute(MicTargetParams),
    SetMicGain(SetMicGainParams),
    SourceStart(SourceStartParams),
    SourceReconfigure(SourceReconfigureParams),
    SourceUpdateMetadata(SourceUpdateMetadataParams),
    SourceStop(SourceStopParams),
    BigSyncEstablish(BigSyncEstablishParams),
    BigSyncTerminate(BigSyncTerminateParams),
    CoordSetDiscover(DiscoverParams),
    CoordSetLockRequest(LockParams),
    CoordSetLockRelease(LockParams),
    MediaControl(MediaControlParams),
    MediaReadTrackTitle(ReadTrackTitleParams),
}

impl ActionParams {
    pub fn action(&self) -> Action {
        match self {
            Self::ScanStart(_) => Action::Sync(SyncAction::ScanStart),
            Self::ScanStop => Action::Sync(SyncAction::ScanStop),
            Self::PaSyncEstablish(_) => Action::Sync(SyncAction::PaSyncEstablish),
            Self::PaSyncTerminate(_) => Action::Sync(SyncAction::PaSyncTerminate),
            Self::AseCodecConfigure(_) => Action::Unicast(UnicastAction::AseCodecConfigure),
            Self::AseQosConfigure(_) => Action::Unicast(UnicastAction::AseQosConfigure),
            Self::AseEnable(_) => Action::Unicast(UnicastAction::AseEnable),
            Self::AseDisable(_) => Action::Unicast(UnicastAction::AseDisable),
            Self::AseRelease(_) => Action::Unicast(UnicastAction::AseRelease),
            Self::AseUpdateMetadata(_) => Action::Unicast(UnicastAction::AseUpdateMetadata),
            Self::SetAbsoluteVolume(_) => Action::Volume(VolumeAction::SetAbsoluteVolume),
            Self::Mute(_) => Action::Volume(VolumeAction::Mute),
            Self::Unmute(_) => Action::Volume(VolumeAction::Unmute),
            Self::SetVolumeOffset(_) => Action::Volume(VolumeAction::SetVolumeOffset),
            Self::MicMute(_) => Action::Mic(MicAction::Mute),
            Self::MicUnmute(_) => Action::Mic(MicAction::Unmute),
            Self::SetMicGain(_) => Action::Mic(MicAction::SetGain),
            Self::SourceStart(_) => Action::BroadcastSource(SourceAction::Start),
            Self::SourceReconfigure(_) => Action::BroadcastSource(SourceAction::Reconfigure),
            Self::SourceUpdateMetadata(_) => {
                Action::BroadcastSource(SourceAction::UpdateMetadata)
            }
            Self::SourceStop(_) => Action::BroadcastSource(SourceAction::Stop),
            Self::BigSyncEstablish(_) => Action::BroadcastSink(SinkAction::BigSyncEstablish),
            Self::BigSyncTerminate(_) => Action::BroadcastSink(SinkAction::BigSyncTerminate),
            Self::CoordSetDiscover(_) => Action::CoordSet(CoordSetAction::Discover),
            Self::CoordSetLockRequest(_) => Action::CoordSet(CoordSetAction::LockRequest),
            Self::CoordSetLockRelease(_) => Action::CoordSet(CoordSetAction::LockRelease),
            Self::MediaControl(_) => Action::Media(MediaAction::Control),
            Self::MediaReadTrackTitle(_) => Action::Media(MediaAction::ReadTrackTitle),
        }
    }

    /// Capability bits the local configuration must carry before this
    /// action may be issued.
    pub fn required_caps(&self) -> Capabilities {
        match self.action().group() {
            Group::Sync => Capabilities::SCAN,
            Group::Unicast => Capabilities::UNICAST,
            Group::Volume => Capabilities::VOLUME,
            Group::Mic => Capabilities::MIC,
            Group::BroadcastSource => Capabilities::BROADCAST_SOURCE,
            Group::BroadcastSink => Capabilities::BROADCAST_SINK,
            Group::CoordSet => Capabilities::COORD_SET,
            Group::Media => Capabilities::MEDIA,
        }
    }

    /// Checks the stack-documented preconditions. Violations are
    /// reported before the command ever reaches the pending table.
    pub fn validate(&self) -> Result<(), &'static str> {
        match self {
            Self::ScanStart(p) => p.validate(),
            Self::PaSyncEstablish(p) => p.validate(),
            Self::AseCodecConfigure(p) => p.validate(),
            Self::AseQosConfigure(p) => p.validate(),
            Self::AseEnable(p) => p.validate(),
            Self::AseDisable(p) | Self::AseRelease(p) => p.validate(),
            Self::AseUpdateMetadata(p) => p.validate(),
            Self::SetVolumeOffset(p) => p.validate(),
            Self::SourceStart(p) => p.validate(),
            Self::SourceReconfigure(p) => p.validate(),
            Self::SourceUpdateMetadata(p) => p.validate(),
            Self::BigSyncEstablish(p) => p.validate(),
            Self::CoordSetLockRequest(p) | Self::CoordSetLockRelease(p) => p.validate(),
            Self::MediaControl(p) => p.validate(),
            _ => Ok(()),
        }
    }
}

/// Richly-typed output a completion hands back to the blocked caller,
/// beyond the bare result code.
#[derive(Clone, Debug, PartialEq)]
pub enum ActionReturn {
    /// Handle of the periodic-advertising train just synchronized to.
    SyncHandle(u16),
    /// Identifier allocated for a started broadcast.
    BroadcastId(u32),
    /// Volume state confirmed by the remote.
    Volume(volume::VolumeState),
    /// Number of members discovered in a coordinated set.
    SetSize(u8),
    /// Current track title, decoded from the completion payload.
    TrackTitle(String),
    /// Handle of the BIG just synchronized to.
    BigHandle(u16),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preconditions_reject_out_of_range_values() {
        let params = ActionParams::PaSyncEstablish(PaSyncEstablishParams {
            adv_addr: crate::Addr { kind: crate::AddrKind::Public, val: [0; 6] },
            adv_sid: 0x10,
            skip: 0,
            timeout: 0x0100,
        });
        assert!(params.validate().is_err());

        let params = ActionParams::BigSyncEstablish(BigSyncEstablishParams {
            sync_handle: 1,
            bis: vec![0],
            broadcast_code: None,
            mse: 0,
            timeout: 0x0100,
        });
        assert!(params.validate().is_err());

        let params = ActionParams::ScanStop;
        assert!(params.validate().is_ok());
    }

    #[test]
    fn capability_follows_group() {
        let params = ActionParams::MicMute(MicTargetParams { conn_handle: 1 });
        assert_eq!(params.required_caps(), crate::Capabilities::MIC);
        assert_eq!(params.action(), Action::Mic(MicAction::Mute));
        assert_eq!(params.action().group(), Group::Mic);
        assert_eq!(params.action().code(), MicAction::Mute as u8);
    }
}
