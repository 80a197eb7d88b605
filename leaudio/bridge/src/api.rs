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

//! Typed blocking operations, one per action the stack exposes. Each
//! validates through the dispatcher, picks the correlation token the
//! router's completion mapping expects, and unpacks the typed output.

use crate::bridge::Bridge;
use crate::dispatch::CommandResult;
use crate::error::ErrorKind;
use crate::router::ase_token;
use bt_leaudio_profiles::broadcast::{
    BigSyncEstablishParams, BigSyncTerminateParams, SourceReconfigureParams, SourceStartParams,
    SourceStopParams, SourceUpdateMetadataParams,
};
use bt_leaudio_profiles::csip::{DiscoverParams, LockParams};
use bt_leaudio_profiles::media::{MediaControlParams, ReadTrackTitleParams};
use bt_leaudio_profiles::mic::{MicTargetParams, SetMicGainParams};
use bt_leaudio_profiles::sync::{
    PaSyncEstablishParams, PaSyncTerminateParams, ScanStartParams,
};
use bt_leaudio_profiles::unicast::{
    AseCodecConfigureParams, AseEnableParams, AseParams, AseQosConfigureParams,
    AseUpdateMetadataParams,
};
use bt_leaudio_profiles::volume::{
    SetAbsoluteVolumeParams, SetVolumeOffsetParams, VolumeState, VolumeTargetParams,
};
use bt_leaudio_profiles::{ActionParams, ActionReturn, HostStatus};
use std::time::Duration;

/// Unpacks a completion, mapping a non-success result code onto the
/// error the wrapped stack reported.
fn done(result: CommandResult) -> Result<Option<ActionReturn>, ErrorKind> {
    if result.status == HostStatus::Success {
        Ok(result.output)
    } else {
        Err(ErrorKind::LowerStackApi(result.status))
    }
}

impl Bridge {
    pub fn scan_start(&self, params: ScanStartParams, timeout: Duration) -> Result<(), ErrorKind> {
        done(self.submit_blocking(ActionParams::ScanStart(params), None, timeout)?)?;
        Ok(())
    }

    pub fn scan_stop(&self, timeout: Duration) -> Result<(), ErrorKind> {
        done(self.submit_blocking(ActionParams::ScanStop, None, timeout)?)?;
        Ok(())
    }

    /// Synchronizes to a periodic advertising train and returns the
    /// sync handle the stack allocated.
    pub fn pa_sync_establish(
        &self,
        params: PaSyncEstablishParams,
        timeout: Duration,
    ) -> Result<u16, ErrorKind> {
        let out = done(self.submit_blocking(ActionParams::PaSyncEstablish(params), None, timeout)?)?;
        match out {
            Some(ActionReturn::SyncHandle(handle)) => Ok(handle),
            _ => Err(ErrorKind::LowerStackApi(HostStatus::Fail)),
        }
    }

    pub fn pa_sync_terminate(
        &self,
        params: PaSyncTerminateParams,
        timeout: Duration,
    ) -> Result<(), ErrorKind> {
        let token = Some(u32::from(params.sync_handle));
        done(self.submit_blocking(ActionParams::PaSyncTerminate(params), token, timeout)?)?;
        Ok(())
    }

    pub fn ase_codec_configure(
        &self,
        params: AseCodecConfigureParams,
        timeout: Duration,
    ) -> Result<(), ErrorKind> {
        let token = Some(ase_token(params.conn_handle, params.ase_id));
        done(self.submit_blocking(ActionParams::AseCodecConfigure(params), token, timeout)?)?;
        Ok(())
    }

    pub fn ase_qos_configure(
        &self,
        params: AseQosConfigureParams,
        timeout: Duration,
    ) -> Result<(), ErrorKind> {
        let token = Some(ase_token(params.conn_handle, params.ase_id));
        done(self.submit_blocking(ActionParams::AseQosConfigure(params), token, timeout)?)?;
        Ok(())
    }

    pub fn ase_enable(&self, params: AseEnableParams, timeout: Duration) -> Result<(), ErrorKind> {
        let token = Some(ase_token(params.conn_handle, params.ase_id));
        done(self.submit_blocking(ActionParams::AseEnable(params), token, timeout)?)?;
        Ok(())
    }

    pub fn ase_disable(&self, params: AseParams, timeout: Duration) -> Result<(), ErrorKind> {
        let token = Some(ase_token(params.conn_handle, params.ase_id));
        done(self.submit_blocking(ActionParams::AseDisable(params), token, timeout)?)?;
        Ok(())
    }

    pub fn ase_release(&self, params: AseParams, timeout: Duration) -> Result<(), ErrorKind> {
        let token = Some(ase_token(params.conn_handle, params.ase_id));
        done(self.submit_blocking(ActionParams::AseRelease(params), token, timeout)?)?;
        Ok(())
    }

    pub fn ase_update_metadata(
        &self,
        params: AseUpdateMetadataParams,
        timeout: Duration,
    ) -> Result<(), ErrorKind> {
        let token = Some(ase_token(params.conn_handle, params.ase_id));
        done(self.submit_blocking(ActionParams::AseUpdateMetadata(params), token, timeout)?)?;
        Ok(())
    }

    /// Sets the absolute volume and returns the state the remote
    /// confirmed.
    pub fn set_absolute_volume(
        &self,
        params: SetAbsoluteVolumeParams,
        timeout: Duration,
    ) -> Result<VolumeState, ErrorKind> {
        let token = Some(u32::from(params.conn_handle));
        let out =
            done(self.submit_blocking(ActionParams::SetAbsoluteVolume(params), token, timeout)?)?;
        match out {
            Some(ActionReturn::Volume(state)) => Ok(state),
            _ => Err(ErrorKind::LowerStackApi(HostStatus::Fail)),
        }
    }

    pub fn volume_mute(
        &self,
        params: VolumeTargetParams,
        timeout: Duration,
    ) -> Result<VolumeState, ErrorKind> {
        let token = Some(u32::from(params.conn_handle));
        let out = done(self.submit_blocking(ActionParams::Mute(params), token, timeout)?)?;
        match out {
            Some(ActionReturn::Volume(state)) => Ok(state),
            _ => Err(ErrorKind::LowerStackApi(HostStatus::Fail)),
        }
    }

    pub fn volume_unmute(
        &self,
        params: VolumeTargetParams,
        timeout: Duration,
    ) -> Result<VolumeState, ErrorKind> {
        let token = Some(u32::from(params.conn_handle));
        let out = done(self.submit_blocking(ActionParams::Unmute(params), token, timeout)?)?;
        match out {
            Some(ActionReturn::Volume(state)) => Ok(state),
            _ => Err(ErrorKind::LowerStackApi(HostStatus::Fail)),
        }
    }

    pub fn set_volume_offset(
        &self,
        params: SetVolumeOffsetParams,
        timeout: Duration,
    ) -> Result<(), ErrorKind> {
        let token = Some(u32::from(params.conn_handle));
        done(self.submit_blocking(ActionParams::SetVolumeOffset(params), token, timeout)?)?;
        Ok(())
    }

    pub fn mic_mute(&self, params: MicTargetParams, timeout: Duration) -> Result<(), ErrorKind> {
        let token = Some(u32::from(params.conn_handle));
        done(self.submit_blocking(ActionParams::MicMute(params), token, timeout)?)?;
        Ok(())
    }

    pub fn mic_unmute(&self, params: MicTargetParams, timeout: Duration) -> Result<(), ErrorKind> {
        let token = Some(u32::from(params.conn_handle));
        done(self.submit_blocking(ActionParams::MicUnmute(params), token, timeout)?)?;
        Ok(())
    }

    pub fn set_mic_gain(&self, params: SetMicGainParams, timeout: Duration) -> Result<(), ErrorKind> {
        let token = Some(u32::from(params.conn_handle));
        done(self.submit_blocking(ActionParams::SetMicGain(params), token, timeout)?)?;
        Ok(())
    }

    /// Starts a broadcast and returns the identifier the stack
    /// allocated for it.
    pub fn broadcast_source_start(
        &self,
        params: SourceStartParams,
        timeout: Duration,
    ) -> Result<u32, ErrorKind> {
        let out = done(self.submit_blocking(ActionParams::SourceStart(params), None, timeout)?)?;
        match out {
            Some(ActionReturn::BroadcastId(id)) => Ok(id),
            _ => Err(ErrorKind::LowerStackApi(HostStatus::Fail)),
        }
    }

    pub fn broadcast_source_reconfigure(
        &self,
        params: SourceReconfigureParams,
        timeout: Duration,
    ) -> Result<(), ErrorKind> {
        let token = Some(params.broadcast_id);
        done(self.submit_blocking(ActionParams::SourceReconfigure(params), token, timeout)?)?;
        Ok(())
    }

    pub fn broadcast_source_update_metadata(
        &self,
        params: SourceUpdateMetadataParams,
        timeout: Duration,
    ) -> Result<(), ErrorKind> {
        let token = Some(params.broadcast_id);
        done(self.submit_blocking(ActionParams::SourceUpdateMetadata(params), token, timeout)?)?;
        Ok(())
    }

    pub fn broadcast_source_stop(
        &self,
        params: SourceStopParams,
        timeout: Duration,
    ) -> Result<(), ErrorKind> {
        let token = Some(params.broadcast_id);
        done(self.submit_blocking(ActionParams::SourceStop(params), token, timeout)?)?;
        Ok(())
    }

    /// Synchronizes to a BIG and returns its handle.
    pub fn big_sync_establish(
        &self,
        params: BigSyncEstablishParams,
        timeout: Duration,
    ) -> Result<u16, ErrorKind> {
        let out = done(self.submit_blocking(ActionParams::BigSyncEstablish(params), None, timeout)?)?;
        match out {
            Some(ActionReturn::BigHandle(handle)) => Ok(handle),
            _ => Err(ErrorKind::LowerStackApi(HostStatus::Fail)),
        }
    }

    pub fn big_sync_terminate(
        &self,
        params: BigSyncTerminateParams,
        timeout: Duration,
    ) -> Result<(), ErrorKind> {
        let token = Some(u32::from(params.big_handle));
        done(self.submit_blocking(ActionParams::BigSyncTerminate(params), token, timeout)?)?;
        Ok(())
    }

    /// Discovers the coordinated set the connected device belongs to
    /// and returns the set size.
    pub fn coord_set_discover(
        &self,
        params: DiscoverParams,
        timeout: Duration,
    ) -> Result<u8, ErrorKind> {
        let token = Some(u32::from(params.conn_handle));
        let out =
            done(self.submit_blocking(ActionParams::CoordSetDiscover(params), token, timeout)?)?;
        match out {
            Some(ActionReturn::SetSize(size)) => Ok(size),
            _ => Err(ErrorKind::LowerStackApi(HostStatus::Fail)),
        }
    }

    pub fn coord_set_lock(&self, params: LockParams, timeout: Duration) -> Result<(), ErrorKind> {
        done(self.submit_blocking(ActionParams::CoordSetLockRequest(params), None, timeout)?)?;
        Ok(())
    }

    pub fn coord_set_unlock(&self, params: LockParams, timeout: Duration) -> Result<(), ErrorKind> {
        done(self.submit_blocking(ActionParams::CoordSetLockRelease(params), None, timeout)?)?;
        Ok(())
    }

    pub fn media_control(
        &self,
        params: MediaControlParams,
        timeout: Duration,
    ) -> Result<(), ErrorKind> {
        let token = Some(u32::from(params.op as u8));
        done(self.submit_blocking(ActionParams::MediaControl(params), token, timeout)?)?;
        Ok(())
    }

    pub fn media_read_track_title(
        &self,
        params: ReadTrackTitleParams,
        timeout: Duration,
    ) -> Result<String, ErrorKind> {
        let token = Some(u32::from(params.conn_handle));
        let out =
            done(self.submit_blocking(ActionParams::MediaReadTrackTitle(params), token, timeout)?)?;
        match out {
            Some(ActionReturn::TrackTitle(title)) => Ok(title),
            _ => Err(ErrorKind::LowerStackApi(HostStatus::Fail)),
        }
    }
}
