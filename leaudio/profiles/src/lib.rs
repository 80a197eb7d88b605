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

//! Typed vocabulary of the LE Audio host bridge: profile groups, actions,
//! event bodies and the flat numeric message-id scheme shared with the
//! wrapped protocol stack. The bridge routes these payloads but does not
//! interpret profile semantics.

use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;
use std::fmt;

mod action;
mod events;
mod status;

pub mod broadcast;
pub mod csip;
pub mod media;
pub mod mic;
pub mod sync;
pub mod unicast;
pub mod volume;

pub use action::{Action, ActionParams, ActionReturn};
pub use events::{EventBody, ReentrantAnswer};
pub use status::HostStatus;

/// Profile group, the first level of the (group, subtype) routing key.
/// The numeric values are part of the stack-facing message-id scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum Group {
    /// Broadcast announcement discovery and periodic-advertising sync.
    Sync = 0x01,
    /// ASE codec/QoS negotiation (unicast stream establishment).
    Unicast = 0x02,
    /// Absolute volume and volume offset control.
    Volume = 0x03,
    /// Microphone mute and input gain control.
    Mic = 0x04,
    /// Broadcast source configuration and streaming.
    BroadcastSource = 0x05,
    /// Broadcast sink / BIG synchronization.
    BroadcastSink = 0x06,
    /// Coordinated set discovery and locking.
    CoordSet = 0x07,
    /// Media control.
    Media = 0x08,
}

bitflags::bitflags! {
    /// Locally supported capability bits, declared by the bridge
    /// configuration and checked before an action is issued.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Capabilities: u32 {
        const SCAN             = 1 << 0;
        const UNICAST          = 1 << 1;
        const VOLUME           = 1 << 2;
        const MIC              = 1 << 3;
        const BROADCAST_SOURCE = 1 << 4;
        const BROADCAST_SINK   = 1 << 5;
        const COORD_SET        = 1 << 6;
        const MEDIA            = 1 << 7;
    }
}

/// Opaque handle naming a stack-owned buffer that must be acknowledged
/// back to the stack exactly once per delivered callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferToken(pub u32);

/// Address type of a remote device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum AddrKind {
    Public = 0x00,
    Random = 0x01,
    RpaPublic = 0x02,
    RpaRandom = 0x03,
}

/// Remote device address, printed most-significant byte first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Addr {
    pub kind: AddrKind,
    pub val: [u8; 6],
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            AddrKind::Public => "public",
            AddrKind::Random => "random",
            AddrKind::RpaPublic => "public-id",
            AddrKind::RpaRandom => "random-id",
        };
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}({})",
            self.val[5], self.val[4], self.val[3], self.val[2], self.val[1], self.val[0], kind
        )
    }
}

/// Composes the flat stack message id from the two-level routing key.
pub fn message_id(group: Group, subtype: u8) -> u16 {
    ((group as u16) << 8) | subtype as u16
}

/// Decomposes a stack message id into its (group, subtype) routing key.
/// Returns `None` for group values this revision of the bridge does not
/// know; callers reject such messages instead of panicking.
pub fn split_message_id(id: u16) -> Option<(Group, u8)> {
    Group::from_u8((id >> 8) as u8).map(|g| (g, id as u8))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_id_round_trip() {
        for group in [
            Group::Sync,
            Group::Unicast,
            Group::Volume,
            Group::Mic,
            Group::BroadcastSource,
            Group::BroadcastSink,
            Group::CoordSet,
            Group::Media,
        ] {
            let id = message_id(group, 0x03);
            assert_eq!(split_message_id(id), Some((group, 0x03)));
        }
    }

    #[test]
    fn unknown_group_rejected() {
        assert_eq!(split_message_id(0x7f02), None);
        assert_eq!(split_message_id(0x0001), None);
    }

    #[test]
    fn addr_formats_reversed() {
        let addr = Addr { kind: AddrKind::Public, val: [0x01, 0x02, 0x03, 0x04, 0x05, 0x06] };
        assert_eq!(addr.to_string(), "06:05:04:03:02:01(public)");
    }
}
