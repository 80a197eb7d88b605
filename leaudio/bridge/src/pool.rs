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

//! Event allocation and ownership.
//!
//! An [`Event`] owns its payload: the fixed fields live in the typed
//! body, variable-length data in a buffer copied before the stack's own
//! buffer becomes invalid. Release happens on `Drop`, so an event can
//! be freed neither twice nor while still readable.

use bt_leaudio_profiles::{EventBody, Group};
use std::sync::{Arc, Mutex};

pub(crate) struct PoolExhausted;

struct PoolCounters {
    live: usize,
    high_water: usize,
    exhausted: u64,
}

struct PoolShared {
    max_live: usize,
    max_buffer: usize,
    counters: Mutex<PoolCounters>,
}

/// Counted allocator for event records. Exhaustion is reported to the
/// caller, which drops the event; the pool never blocks the stack's
/// callback thread waiting for space.
pub(crate) struct EventPool {
    shared: Arc<PoolShared>,
}

/// Accounting guard held by each live event; returns the slot on drop.
struct PoolSlot {
    shared: Arc<PoolShared>,
}

impl Drop for PoolSlot {
    fn drop(&mut self) {
        let mut counters = self.shared.counters.lock().unwrap();
        counters.live -= 1;
    }
}

/// One stack notification, owned by exactly one consumer path.
pub struct Event {
    body: EventBody,
    buffer: Option<Box<[u8]>>,
    _slot: PoolSlot,
}

impl Event {
    pub fn group(&self) -> Group {
        self.body.group()
    }

    pub fn subtype(&self) -> u8 {
        self.body.subtype()
    }

    pub fn body(&self) -> &EventBody {
        &self.body
    }

    /// The deep-copied variable-length payload, present only for event
    /// kinds that declare one.
    pub fn payload(&self) -> Option<&[u8]> {
        self.buffer.as_deref()
    }
}

impl EventPool {
    pub fn new(max_live: usize, max_buffer: usize) -> Self {
        Self {
            shared: Arc::new(PoolShared {
                max_live,
                max_buffer,
                counters: Mutex::new(PoolCounters { live: 0, high_water: 0, exhausted: 0 }),
            }),
        }
    }

    /// Builds an event record, copying `variable` into the owned buffer
    /// when the body's kind declares variable-length data. The copy is
    /// mandatory: the stack's buffer is not valid past the callback.
    pub fn allocate(
        &self,
        body: EventBody,
        variable: Option<&[u8]>,
    ) -> Result<Event, PoolExhausted> {
        let wants = body.expects_buffer();
        if wants != variable.is_some() {
            log::warn!(
                "event ({:?}, {:#04x}) buffer mismatch: declared {}, given {}",
                body.group(),
                body.subtype(),
                wants,
                variable.is_some()
            );
        }
        let variable = if wants { variable } else { None };

        if variable.map_or(0, <[u8]>::len) > self.shared.max_buffer {
            self.note_exhausted();
            return Err(PoolExhausted);
        }

        {
            let mut counters = self.shared.counters.lock().unwrap();
            if counters.live >= self.shared.max_live {
                counters.exhausted += 1;
                return Err(PoolExhausted);
            }
            counters.live += 1;
            counters.high_water = counters.high_water.max(counters.live);
        }

        Ok(Event {
            body,
            buffer: variable.map(Box::from),
            _slot: PoolSlot { shared: self.shared.clone() },
        })
    }

    fn note_exhausted(&self) {
        self.shared.counters.lock().unwrap().exhausted += 1;
    }

    pub fn live(&self) -> usize {
        self.shared.counters.lock().unwrap().live
    }

    pub fn high_water(&self) -> usize {
        self.shared.counters.lock().unwrap().high_water
    }

    pub fn exhausted(&self) -> u64 {
        self.shared.counters.lock().unwrap().exhausted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bt_leaudio_profiles::broadcast::{IsoSdu, SduStatus};
    use bt_leaudio_profiles::volume::VolumeState;

    fn iso_body() -> EventBody {
        EventBody::IsoSdu(IsoSdu {
            conn_handle: 0x10,
            seq_num: 1,
            timestamp: 0,
            status: SduStatus::Valid,
        })
    }

    #[test]
    fn buffer_follows_declared_kind() {
        let pool = EventPool::new(4, 64);

        let ev = pool.allocate(iso_body(), Some(&[1, 2, 3])).ok().unwrap();
        assert_eq!(ev.payload(), Some(&[1u8, 2, 3][..]));

        // A fixed-only kind never grows a buffer, even if one is offered.
        let body = EventBody::VolumeState(VolumeState {
            conn_handle: 1,
            volume: 10,
            muted: false,
            change_counter: 0,
        });
        let ev = pool.allocate(body, Some(&[9])).ok().unwrap();
        assert!(ev.payload().is_none());
    }

    #[test]
    fn accounting_returns_on_drop() {
        let pool = EventPool::new(2, 64);
        let a = pool.allocate(iso_body(), Some(&[0])).ok().unwrap();
        let b = pool.allocate(iso_body(), Some(&[0])).ok().unwrap();
        assert_eq!(pool.live(), 2);
        assert!(pool.allocate(iso_body(), Some(&[0])).is_err());
        assert_eq!(pool.exhausted(), 1);

        drop(a);
        assert_eq!(pool.live(), 1);
        assert!(pool.allocate(iso_body(), Some(&[0])).is_ok());
        drop(b);
        assert_eq!(pool.live(), 0);
        assert_eq!(pool.high_water(), 2);
    }

    #[test]
    fn oversized_payload_rejected() {
        let pool = EventPool::new(4, 2);
        assert!(pool.allocate(iso_body(), Some(&[0, 1, 2])).is_err());
        assert_eq!(pool.live(), 0);
    }
}
