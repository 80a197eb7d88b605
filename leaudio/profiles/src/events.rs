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
    BigSyncRequest, BroadcastCodeRequest, IsoSdu, PaSyncRequest, SinkEvent, SinkState, SourceEvent,
    SourceState,
};
use crate::csip::{CoordSetEvent, DiscoverDone, LockState, SetFound};
use crate::media::{ControlResult, MediaEvent, MediaState, TitleRead, TrackChanged};
use crate::mic::{MicEvent, MicGainState, MicState};
use crate::sync::{AnnouncementReport, PaSyncState, ScanState, SyncEvent};
use crate::unicast::{AseState, MetadataUpdated, PreferQos, UnicastEvent};
use crate::volume::{VolumeEvent, VolumeOffsetState, VolumeState};
use crate::Group;

/// Fixed fields of every event kind the bridge knows, sized by the
/// variant. Variable-length data (advertising payloads, SDUs, track
/// titles) never lives here; it is deep-copied into the event's owned
/// buffer before the stack callback returns.
#[derive(Clone, Debug, PartialEq)]
pub enum EventBody {
    // Sync
    AnnouncementReport(AnnouncementReport),
    ScanState(ScanState),
    PaSyncState(PaSyncState),
    // Unicast
    AseState(AseState),
    PreferQos(PreferQos),
    MetadataUpdated(MetadataUpdated),
    // Volume
    VolumeState(VolumeState),
    VolumeOffsetState(VolumeOffsetState),
    // Mic
    MicState(MicState),
    MicGainState(MicGainState),
    // Broadcast source
    SourceState(SourceState),
    // Broadcast sink
    SinkState(SinkState),
    IsoSdu(IsoSdu),
    PaSyncRequest(PaSyncRequest),
    BigSyncRequest(BigSyncRequest),
    BroadcastCodeRequest(BroadcastCodeRequest),
    // Coordinated sets
    SetFound(SetFound),
    LockState(LockState),
    DiscoverDone(DiscoverDone),
    // Media
    MediaState(MediaState),
    TrackChanged(TrackChanged),
    ControlResult(ControlResult),
    TitleRead(TitleRead),
}

impl EventBody {
    pub fn group(&self) -> Group {
        match self {
            Self::AnnouncementReport(_) | Self::ScanState(_) | Self::PaSyncState(_) => Group::Sync,
            Self::AseState(_) | Self::PreferQos(_) | Self::MetadataUpdated(_) => Group::Unicast,
            Self::VolumeState(_) | Self::VolumeOffsetState(_) => Group::Volume,
            Self::MicState(_) | Self::MicGainState(_) => Group::Mic,
            Self::SourceState(_) => Group::BroadcastSource,
            Self::SinkState(_)
            | Self::IsoSdu(_)
            | Self::PaSyncRequest(_)
            | Self::BigSyncRequest(_)
            | Self::BroadcastCodeRequest(_) => Group::BroadcastSink,
            Self::SetFound(_) | Self::LockState(_) | Self::DiscoverDone(_) => Group::CoordSet,
            Self::MediaState(_) | Self::TrackChanged(_) | Self::ControlResult(_)
            | Self::TitleRead(_) => Group::Media,
        }
    }

    pub fn subtype(&self) -> u8 {
        match self {
            Self::AnnouncementReport(_) => SyncEvent::AnnouncementReport as u8,
            Self::ScanState(_) => SyncEvent::ScanState as u8,
            Self::PaSyncState(_) => SyncEvent::PaSyncState as u8,
            Self::AseState(_) => UnicastEvent::AseState as u8,
            Self::PreferQos(_) => UnicastEvent::PreferQos as u8,
            Self::MetadataUpdated(_) => UnicastEvent::MetadataUpdated as u8,
            Self::VolumeState(_) => VolumeEvent::State as u8,
            Self::VolumeOffsetState(_) => VolumeEvent::OffsetState as u8,
            Self::MicState(_) => MicEvent::State as u8,
            Self::MicGainState(_) => MicEvent::GainState as u8,
            Self::SourceState(_) => SourceEvent::State as u8,
            Self::SinkState(_) => SinkEvent::State as u8,
            Self::IsoSdu(_) => SinkEvent::IsoData as u8,
            Self::PaSyncRequest(_) => SinkEvent::PaSyncRequest as u8,
            Self::BigSyncRequest(_) => SinkEvent::BigSyncRequest as u8,
            Self::BroadcastCodeRequest(_) => SinkEvent::BroadcastCodeRequest as u8,
            Self::SetFound(_) => CoordSetEvent::SetFound as u8,
            Self::LockState(_) => CoordSetEvent::LockState as u8,
            Self::DiscoverDone(_) => CoordSetEvent::DiscoverDone as u8,
            Self::MediaState(_) => MediaEvent::State as u8,
            Self::TrackChanged(_) => MediaEvent::TrackChanged as u8,
            Self::ControlResult(_) => MediaEvent::ControlResult as u8,
            Self::TitleRead(_) => MediaEvent::TitleRead as u8,
        }
    }

    /// Whether this event kind carries variable-length data that must be
    /// copied into the event's owned buffer.
    pub fn expects_buffer(&self) -> bool {
        matches!(
            self,
            Self::AnnouncementReport(_) | Self::IsoSdu(_) | Self::TrackChanged(_)
                | Self::TitleRead(_)
        )
    }

    pub fn message_id(&self) -> u16 {
        crate::message_id(self.group(), self.subtype())
    }
}

/// Answer fed into the stack's synchronous confirmation entry point by
/// the direct-call path, either from the application's reentrant handler
/// or from the policy's cached fallback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReentrantAnswer {
    PreferredQos(crate::unicast::QosPreference),
    PaSyncParams(crate::broadcast::PaSyncAnswer),
    BigSyncParams(crate::broadcast::BigSyncAnswer),
    BroadcastCode([u8; 16]),
}
