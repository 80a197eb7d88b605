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

//! Asynchronous indication path: a bounded queue drained by a worker
//! thread that invokes the per-group subscriber callback and releases
//! the event afterwards.

use crate::pool::Event;
use bt_leaudio_profiles::Group;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

pub(crate) type Subscriber = Arc<dyn Fn(&Event) + Send + Sync>;

/// Per-group subscriber callbacks, registered by the application.
pub(crate) struct SubscriberTable {
    inner: Mutex<HashMap<Group, Subscriber>>,
}

impl SubscriberTable {
    pub fn new() -> Self {
        Self { inner: Mutex::new(HashMap::new()) }
    }

    pub fn register(&self, group: Group, callback: Subscriber) {
        self.inner.lock().unwrap().insert(group, callback);
    }

    pub fn unregister(&self, group: Group) -> bool {
        self.inner.lock().unwrap().remove(&group).is_some()
    }

    /// Clones the callback handle out so no table lock is held while it
    /// runs.
    fn get(&self, group: Group) -> Option<Subscriber> {
        self.inner.lock().unwrap().get(&group).cloned()
    }
}

struct QueueState {
    /// Halt indication of the worker thread.
    halt: bool,
    queue: VecDeque<Event>,
    dropped: u64,
}

pub(crate) struct Indications {
    state_cvar: Arc<(Mutex<QueueState>, Condvar)>,
    thread: Option<JoinHandle<()>>,
    depth: usize,
}

impl Indications {
    pub fn new(depth: usize, subscribers: Arc<SubscriberTable>) -> Self {
        let state_cvar = Arc::new((
            Mutex::new(QueueState { halt: false, queue: VecDeque::new(), dropped: 0 }),
            Condvar::new(),
        ));
        let thread = {
            let state_cvar = state_cvar.clone();
            thread::spawn(move || Self::thread_loop(state_cvar, subscribers))
        };

        Self { state_cvar, thread: Some(thread), depth }
    }

    /// Queues an event for asynchronous delivery. Never blocks: when
    /// the queue is full the event is dropped and released here.
    pub fn push(&self, event: Event) -> bool {
        let (state, cvar) = &*self.state_cvar;
        let mut state = state.lock().unwrap();
        if state.queue.len() >= self.depth {
            state.dropped += 1;
            log::warn!(
                "indication queue full, dropping event ({:?}, {:#04x})",
                event.group(),
                event.subtype()
            );
            return false;
        }
        state.queue.push_back(event);
        cvar.notify_one();
        true
    }

    pub fn dropped(&self) -> u64 {
        self.state_cvar.0.lock().unwrap().dropped
    }

    fn thread_loop(state_cvar: Arc<(Mutex<QueueState>, Condvar)>, subscribers: Arc<SubscriberTable>) {
        let (state, cvar) = &*state_cvar;
        loop {
            let event = {
                let mut state = state.lock().unwrap();
                while !state.halt && state.queue.is_empty() {
                    state = cvar.wait(state).unwrap();
                }
                if state.halt {
                    break;
                }
                state.queue.pop_front().unwrap()
            };

            match subscribers.get(event.group()) {
                Some(callback) => callback(&event),
                None => log::debug!("no subscriber for group {:?}", event.group()),
            }
            // `event` is released here, after the subscriber consumed it.
        }
    }
}

impl Drop for Indications {
    fn drop(&mut self) {
        let (state, cvar) = &*self.state_cvar;
        {
            let mut state = state.lock().unwrap();
            state.halt = true;
            cvar.notify_one();
        }
        let thread = self.thread.take().unwrap();
        thread.join().expect("End of indication loop");
    }
}
