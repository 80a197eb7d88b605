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

//! Direct-call policy.
//!
//! An event kind is delivered synchronously on the stack's callback
//! thread only if the application opted in for that exact
//! (group, subtype). Everything else falls back to the cached answer
//! held here, and the event is indicated asynchronously instead.

use bt_leaudio_profiles::broadcast::{BigSyncAnswer, PaSyncAnswer};
use bt_leaudio_profiles::unicast::QosPreference;
use bt_leaudio_profiles::{Group, ReentrantAnswer};
use std::collections::HashMap;

/// Which answer a direct-call event kind expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReentrantKind {
    PreferQos,
    PaSyncParams,
    BigSyncParams,
    BroadcastCode,
}

pub(crate) struct DirectCallReentry {
    /// Per-group opt-in mask, one bit per subtype.
    masks: HashMap<Group, u32>,
    preferred_qos: QosPreference,
    pa_sync: PaSyncAnswer,
    big_sync: BigSyncAnswer,
    broadcast_code: [u8; 16],
}

impl DirectCallReentry {
    pub fn new() -> Self {
        Self {
            masks: HashMap::new(),
            preferred_qos: QosPreference::default(),
            pa_sync: PaSyncAnswer::default(),
            big_sync: BigSyncAnswer::default(),
            broadcast_code: [0; 16],
        }
    }

    pub fn set(&mut self, group: Group, subtype: u8, enabled: bool) {
        if subtype >= 32 {
            log::error!("direct-call subtype {:#04x} beyond mask width", subtype);
            return;
        }
        let mask = self.masks.entry(group).or_insert(0);
        if enabled {
            *mask |= 1 << subtype;
        } else {
            *mask &= !(1 << subtype);
        }
    }

    pub fn enabled(&self, group: Group, subtype: u8) -> bool {
        if subtype >= 32 {
            return false;
        }
        self.masks.get(&group).is_some_and(|mask| mask & (1 << subtype) != 0)
    }

    /// The answer given to the stack when the application has not opted
    /// in for a direct-call event kind.
    pub fn fallback(&self, kind: ReentrantKind) -> ReentrantAnswer {
        match kind {
            ReentrantKind::PreferQos => ReentrantAnswer::PreferredQos(self.preferred_qos),
            ReentrantKind::PaSyncParams => ReentrantAnswer::PaSyncParams(self.pa_sync),
            ReentrantKind::BigSyncParams => ReentrantAnswer::BigSyncParams(self.big_sync),
            ReentrantKind::BroadcastCode => ReentrantAnswer::BroadcastCode(self.broadcast_code),
        }
    }

    pub fn cache_preferred_qos(&mut self, qos: QosPreference) {
        self.preferred_qos = qos;
    }

    pub fn cache_pa_sync(&mut self, answer: PaSyncAnswer) {
        self.pa_sync = answer;
    }

    pub fn cache_big_sync(&mut self, answer: BigSyncAnswer) {
        self.big_sync = answer;
    }

    pub fn cache_broadcast_code(&mut self, code: [u8; 16]) {
        self.broadcast_code = code;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opt_in_is_per_subtype() {
        let mut policy = DirectCallReentry::new();
        assert!(!policy.enabled(Group::Unicast, 0x02));

        policy.set(Group::Unicast, 0x02, true);
        assert!(policy.enabled(Group::Unicast, 0x02));
        assert!(!policy.enabled(Group::Unicast, 0x01));
        assert!(!policy.enabled(Group::BroadcastSink, 0x02));

        policy.set(Group::Unicast, 0x02, false);
        assert!(!policy.enabled(Group::Unicast, 0x02));
    }

    #[test]
    fn fallback_reflects_cached_answer() {
        let mut policy = DirectCallReentry::new();
        let qos = QosPreference {
            retransmission_number: 5,
            max_transport_latency: 40,
            presentation_delay: 20_000,
        };
        policy.cache_preferred_qos(qos);
        assert_eq!(policy.fallback(ReentrantKind::PreferQos), ReentrantAnswer::PreferredQos(qos));
    }
}
