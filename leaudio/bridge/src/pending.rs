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

//! In-flight command table, the single structure shared between
//! application threads and the stack's callback thread.

use bt_leaudio_profiles::{Action, ActionReturn, HostStatus};
use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex};

/// Key of one outstanding call. `token` disambiguates actions whose
/// identifier alone is ambiguous, e.g. two terminates against different
/// sync handles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CommandKey {
    pub action: Action,
    pub token: Option<u32>,
}

#[derive(Debug)]
pub(crate) struct CompletionState {
    pub done: bool,
    pub status: HostStatus,
    pub output: Option<ActionReturn>,
}

/// Single-use wait handle correlating one blocked caller to one
/// eventual result. The caller's stack frame owns the Arc; the table
/// entry only references it, so removal can never invalidate a waiter.
pub(crate) type CompletionSlot = Arc<(Mutex<CompletionState>, Condvar)>;

pub(crate) fn new_slot() -> CompletionSlot {
    Arc::new((
        Mutex::new(CompletionState { done: false, status: HostStatus::Fail, output: None }),
        Condvar::new(),
    ))
}

pub(crate) struct PendingEntry {
    pub slot: CompletionSlot,
}

/// Writes the result exactly once and wakes the waiter. A second
/// completion against the same slot is a no-op.
pub(crate) fn complete(entry: &PendingEntry, status: HostStatus, output: Option<ActionReturn>) {
    let (lock, cvar) = &*entry.slot;
    let mut state = lock.lock().unwrap();
    if state.done {
        log::warn!("completion slot already resolved, ignoring");
        return;
    }
    state.done = true;
    state.status = status;
    state.output = output;
    cvar.notify_one();
}

pub(crate) struct DuplicateKey;

/// Mutex-guarded collection of in-flight commands. The lock is held
/// only for the map mutation itself, never across the stack entry point
/// or an application callback.
pub(crate) struct PendingCommandTable {
    entries: Mutex<HashMap<CommandKey, PendingEntry>>,
}

impl PendingCommandTable {
    pub fn new() -> Self {
        Self { entries: Mutex::new(HashMap::new()) }
    }

    /// Registers an in-flight command. Two concurrent calls with the
    /// same key are never merged; the second is rejected.
    pub fn insert(&self, key: CommandKey, entry: PendingEntry) -> Result<(), DuplicateKey> {
        let mut entries = self.entries.lock().unwrap();
        if entries.contains_key(&key) {
            return Err(DuplicateKey);
        }
        entries.insert(key, entry);
        Ok(())
    }

    /// Removal on the completion path. Atomic with respect to
    /// concurrent inserts and removals: exactly one of the router and
    /// the timed-out caller wins; the loser observes `None`.
    pub fn find_and_remove(&self, key: CommandKey) -> Option<PendingEntry> {
        self.entries.lock().unwrap().remove(&key)
    }

    /// Removal on the caller's timeout path, with the same atomicity
    /// guarantee as [`Self::find_and_remove`].
    pub fn timeout_remove(&self, key: CommandKey) -> Option<PendingEntry> {
        self.entries.lock().unwrap().remove(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bt_leaudio_profiles::sync::SyncAction;

    fn key(token: Option<u32>) -> CommandKey {
        CommandKey { action: Action::Sync(SyncAction::PaSyncTerminate), token }
    }

    #[test]
    fn duplicate_key_rejected() {
        let table = PendingCommandTable::new();
        assert!(table.insert(key(None), PendingEntry { slot: new_slot() }).is_ok());
        assert!(table.insert(key(None), PendingEntry { slot: new_slot() }).is_err());
        assert!(table.insert(key(Some(7)), PendingEntry { slot: new_slot() }).is_ok());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn removal_happens_once() {
        let table = PendingCommandTable::new();
        table.insert(key(Some(1)), PendingEntry { slot: new_slot() }).ok();
        assert!(table.find_and_remove(key(Some(1))).is_some());
        assert!(table.find_and_remove(key(Some(1))).is_none());
        assert!(table.timeout_remove(key(Some(1))).is_none());
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn complete_resolves_slot_once() {
        let entry = PendingEntry { slot: new_slot() };
        complete(&entry, HostStatus::Success, Some(ActionReturn::SyncHandle(3)));
        complete(&entry, HostStatus::Fail, None);

        let state = entry.slot.0.lock().unwrap();
        assert!(state.done);
        assert_eq!(state.status, HostStatus::Success);
        assert_eq!(state.output, Some(ActionReturn::SyncHandle(3)));
    }
}
