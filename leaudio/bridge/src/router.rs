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

//! Event routing.
//!
//! Every stack notification is dispatched by its (group, subtype) key
//! through a handler table built at initialization. A handler either
//! drives completion of a matching pending command, indicates the event
//! to subscribers, or resolves it synchronously through the direct-call
//! policy. Unknown keys are rejected, never panicked on: a future stack
//! revision may raise subtypes this bridge does not know yet.

use crate::indicate::Indications;
use crate::pending::{self, CommandKey, PendingCommandTable};
use crate::pool::EventPool;
use crate::reentry::{DirectCallReentry, ReentrantKind};
use crate::StackEndpoint;
use bt_leaudio_profiles::broadcast::{SinkAction, SinkPhase, SourceAction, SourcePhase};
use bt_leaudio_profiles::csip::CoordSetAction;
use bt_leaudio_profiles::media::MediaAction;
use bt_leaudio_profiles::mic::MicAction;
use bt_leaudio_profiles::sync::{PaSyncPhase, SyncAction};
use bt_leaudio_profiles::unicast::{AsePhase, UnicastAction};
use bt_leaudio_profiles::volume::VolumeAction;
use bt_leaudio_profiles::{
    Action, ActionReturn, BufferToken, EventBody, Group, HostStatus, ReentrantAnswer,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Borrowed, stack-allocated view of an event, handed to reentrant
/// handlers on the stack's own callback thread. Never heap-allocated,
/// never outlives the originating callback.
#[derive(Clone, Copy)]
pub struct EventView<'a> {
    pub body: &'a EventBody,
    pub payload: Option<&'a [u8]>,
}

pub(crate) type ReentrantHandler = Arc<dyn Fn(EventView<'_>) -> ReentrantAnswer + Send + Sync>;

/// Result of mapping a completion event onto the pending table: the
/// candidate keys it may resolve, in match order, plus the result the
/// winner's caller receives.
struct Completion {
    candidates: Vec<CommandKey>,
    status: HostStatus,
    output: Option<ActionReturn>,
}

impl Completion {
    /// A state transition with no corresponding blocked caller.
    fn none() -> Self {
        Self { candidates: Vec::new(), status: HostStatus::Success, output: None }
    }
}

type CompletionFn = fn(&EventBody, Option<&[u8]>) -> Completion;

enum Disposition {
    /// Drives completion of a matching pending command.
    Completes(CompletionFn),
    /// Indicated to subscribers through the asynchronous queue.
    Indicates,
    /// Answered synchronously through the direct-call policy.
    Reentrant(ReentrantKind),
}

#[derive(Default)]
struct Counters {
    completions: AtomicU64,
    orphaned: AtomicU64,
    unknown: AtomicU64,
    dropped: AtomicU64,
}

/// Snapshot of the router's diagnostic counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CountersSnapshot {
    /// Commands completed through the table.
    pub completions: u64,
    /// Completions that found no pending entry (late or duplicate).
    pub orphaned: u64,
    /// Notifications with no registered handler.
    pub unknown: u64,
    /// Events dropped for pool or queue exhaustion.
    pub dropped: u64,
    /// Indications dropped because the queue was full.
    pub queue_dropped: u64,
    /// Allocations refused by the event pool.
    pub pool_exhausted: u64,
    /// Event records currently alive.
    pub live_events: usize,
    /// Most event records alive at once.
    pub events_high_water: usize,
}

pub(crate) struct EventRouter {
    table: HashMap<(Group, u8), Disposition>,
    pending: Arc<PendingCommandTable>,
    pool: EventPool,
    indications: Indications,
    reentry: Mutex<DirectCallReentry>,
    reentrant_handlers: Mutex<HashMap<(Group, u8), ReentrantHandler>>,
    endpoint: Arc<dyn StackEndpoint>,
    counters: Counters,
}

impl EventRouter {
    pub fn new(
        pending: Arc<PendingCommandTable>,
        pool: EventPool,
        indications: Indications,
        endpoint: Arc<dyn StackEndpoint>,
    ) -> Self {
        Self {
            table: handler_table(),
            pending,
            pool,
            indications,
            reentry: Mutex::new(DirectCallReentry::new()),
            reentrant_handlers: Mutex::new(HashMap::new()),
            endpoint,
            counters: Counters::default(),
        }
    }

    /// Routes one stack notification. Runs on the stack's callback
    /// thread; must not block and must not panic. Whatever path the
    /// event takes, a carried buffer token is acknowledged exactly once
    /// before this returns.
    pub fn dispatch(&self, body: EventBody, payload: Option<&[u8]>, token: Option<BufferToken>) {
        self.route(body, payload);
        if let Some(token) = token {
            self.endpoint.ack_buffer(token);
        }
    }

    /// Rejection path for messages that do not decompose into a known
    /// routing key. The stack's buffer is still acknowledged.
    pub fn reject(&self, message_id: u16, token: Option<BufferToken>) {
        self.counters.unknown.fetch_add(1, Ordering::Relaxed);
        log::warn!("rejecting stack message {:#06x}: unknown routing key", message_id);
        if let Some(token) = token {
            self.endpoint.ack_buffer(token);
        }
    }

    fn route(&self, body: EventBody, payload: Option<&[u8]>) {
        let key = (body.group(), body.subtype());
        match self.table.get(&key) {
            None => {
                self.counters.unknown.fetch_add(1, Ordering::Relaxed);
                log::warn!("no handler for event ({:?}, {:#04x})", key.0, key.1);
            }
            Some(Disposition::Completes(map)) => {
                let completion = map(&body, payload);
                if completion.candidates.is_empty() {
                    return;
                }
                let entry = completion
                    .candidates
                    .iter()
                    .find_map(|&candidate| self.pending.find_and_remove(candidate));
                match entry {
                    Some(entry) => {
                        self.counters.completions.fetch_add(1, Ordering::Relaxed);
                        pending::complete(&entry, completion.status, completion.output);
                    }
                    None => {
                        // Already timed out, or a duplicate callback.
                        // Absorbed: no caller state is touched.
                        self.counters.orphaned.fetch_add(1, Ordering::Relaxed);
                        log::debug!(
                            "orphaned completion for event ({:?}, {:#04x})",
                            key.0,
                            key.1
                        );
                    }
                }
            }
            Some(Disposition::Indicates) => self.indicate(body, payload),
            Some(Disposition::Reentrant(kind)) => {
                let handler = if self.reentry.lock().unwrap().enabled(key.0, key.1) {
                    self.reentrant_handlers.lock().unwrap().get(&key).cloned()
                } else {
                    None
                };
                match handler {
                    Some(handler) => {
                        // Synchronous call into the application, on the
                        // stack's own thread; no bridge lock is held.
                        let answer = handler(EventView { body: &body, payload });
                        self.endpoint.confirm(answer);
                    }
                    None => {
                        let answer = self.reentry.lock().unwrap().fallback(*kind);
                        self.endpoint.confirm(answer);
                        // The application still learns of the request
                        // through the asynchronous path.
                        self.indicate(body, payload);
                    }
                }
            }
        }
    }

    fn indicate(&self, body: EventBody, payload: Option<&[u8]>) {
        let key = (body.group(), body.subtype());
        match self.pool.allocate(body, payload) {
            Ok(event) => {
                if !self.indications.push(event) {
                    self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                }
            }
            Err(_) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                log::warn!("dropping event ({:?}, {:#04x}): event pool exhausted", key.0, key.1);
            }
        }
    }

    pub fn set_reentry_policy(&self, group: Group, subtype: u8, enabled: bool) {
        self.reentry.lock().unwrap().set(group, subtype, enabled);
    }

    pub fn register_reentrant_handler(&self, group: Group, subtype: u8, handler: ReentrantHandler) {
        self.reentrant_handlers.lock().unwrap().insert((group, subtype), handler);
    }

    pub fn with_reentry<R>(&self, f: impl FnOnce(&mut DirectCallReentry) -> R) -> R {
        f(&mut self.reentry.lock().unwrap())
    }

    pub fn counters(&self) -> CountersSnapshot {
        CountersSnapshot {
            completions: self.counters.completions.load(Ordering::Relaxed),
            orphaned: self.counters.orphaned.load(Ordering::Relaxed),
            unknown: self.counters.unknown.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
            queue_dropped: self.indications.dropped(),
            pool_exhausted: self.pool.exhausted(),
            live_events: self.pool.live(),
            events_high_water: self.pool.high_water(),
        }
    }
}

/// Correlation token for an ASE-scoped command: connection and ASE id
/// together name the stream endpoint.
pub(crate) fn ase_token(conn_handle: u16, ase_id: u8) -> u32 {
    (u32::from(conn_handle) << 8) | u32::from(ase_id)
}

fn key(action: Action, token: Option<u32>) -> CommandKey {
    CommandKey { action, token }
}

/// The registration table: every event kind this bridge revision knows,
/// with its handler classification. Built once per bridge.
fn handler_table() -> HashMap<(Group, u8), Disposition> {
    use bt_leaudio_profiles::broadcast::{SinkEvent, SourceEvent};
    use bt_leaudio_profiles::csip::CoordSetEvent;
    use bt_leaudio_profiles::media::MediaEvent;
    use bt_leaudio_profiles::mic::MicEvent;
    use bt_leaudio_profiles::sync::SyncEvent;
    use bt_leaudio_profiles::unicast::UnicastEvent;
    use bt_leaudio_profiles::volume::VolumeEvent;

    let mut table: HashMap<(Group, u8), Disposition> = HashMap::new();

    table.insert(
        (Group::Sync, SyncEvent::AnnouncementReport as u8),
        Disposition::Indicates,
    );
    table.insert(
        (Group::Sync, SyncEvent::ScanState as u8),
        Disposition::Completes(scan_state_completion),
    );
    table.insert(
        (Group::Sync, SyncEvent::PaSyncState as u8),
        Disposition::Completes(pa_sync_state_completion),
    );

    table.insert(
        (Group::Unicast, UnicastEvent::AseState as u8),
        Disposition::Completes(ase_state_completion),
    );
    table.insert(
        (Group::Unicast, UnicastEvent::PreferQos as u8),
        Disposition::Reentrant(ReentrantKind::PreferQos),
    );
    table.insert(
        (Group::Unicast, UnicastEvent::MetadataUpdated as u8),
        Disposition::Completes(metadata_updated_completion),
    );

    table.insert(
        (Group::Volume, VolumeEvent::State as u8),
        Disposition::Completes(volume_state_completion),
    );
    table.insert(
        (Group::Volume, VolumeEvent::OffsetState as u8),
        Disposition::Completes(volume_offset_completion),
    );

    table.insert(
        (Group::Mic, MicEvent::State as u8),
        Disposition::Completes(mic_state_completion),
    );
    table.insert(
        (Group::Mic, MicEvent::GainState as u8),
        Disposition::Completes(mic_gain_completion),
    );

    table.insert(
        (Group::BroadcastSource, SourceEvent::State as u8),
        Disposition::Completes(source_state_completion),
    );

    table.insert(
        (Group::BroadcastSink, SinkEvent::State as u8),
        Disposition::Completes(sink_state_completion),
    );
    table.insert((Group::BroadcastSink, SinkEvent::IsoData as u8), Disposition::Indicates);
    table.insert(
        (Group::BroadcastSink, SinkEvent::PaSyncRequest as u8),
        Disposition::Reentrant(ReentrantKind::PaSyncParams),
    );
    table.insert(
        (Group::BroadcastSink, SinkEvent::BigSyncRequest as u8),
        Disposition::Reentrant(ReentrantKind::BigSyncParams),
    );
    table.insert(
        (Group::BroadcastSink, SinkEvent::BroadcastCodeRequest as u8),
        Disposition::Reentrant(ReentrantKind::BroadcastCode),
    );

    table.insert((Group::CoordSet, CoordSetEvent::SetFound as u8), Disposition::Indicates);
    table.insert(
        (Group::CoordSet, CoordSetEvent::LockState as u8),
        Disposition::Completes(lock_state_completion),
    );
    table.insert(
        (Group::CoordSet, CoordSetEvent::DiscoverDone as u8),
        Disposition::Completes(discover_done_completion),
    );

    table.insert((Group::Media, MediaEvent::State as u8), Disposition::Indicates);
    table.insert((Group::Media, MediaEvent::TrackChanged as u8), Disposition::Indicates);
    table.insert(
        (Group::Media, MediaEvent::ControlResult as u8),
        Disposition::Completes(control_result_completion),
    );
    table.insert(
        (Group::Media, MediaEvent::TitleRead as u8),
        Disposition::Completes(title_read_completion),
    );

    table
}

fn scan_state_completion(body: &EventBody, _payload: Option<&[u8]>) -> Completion {
    let EventBody::ScanState(s) = body else { return Completion::none() };
    let action = if s.scanning { SyncAction::ScanStart } else { SyncAction::ScanStop };
    Completion {
        candidates: vec![key(Action::Sync(action), None)],
        status: s.status,
        output: None,
    }
}

fn pa_sync_state_completion(body: &EventBody, _payload: Option<&[u8]>) -> Completion {
    let EventBody::PaSyncState(s) = body else { return Completion::none() };
    match s.phase {
        PaSyncPhase::Synchronized => Completion {
            candidates: vec![key(Action::Sync(SyncAction::PaSyncEstablish), None)],
            status: s.status,
            output: Some(ActionReturn::SyncHandle(s.sync_handle)),
        },
        PaSyncPhase::Terminated => Completion {
            candidates: vec![
                key(Action::Sync(SyncAction::PaSyncTerminate), Some(u32::from(s.sync_handle))),
                key(Action::Sync(SyncAction::PaSyncTerminate), None),
            ],
            status: s.status,
            output: None,
        },
        // Synchronizing is transient, Lost is remote-initiated; neither
        // resolves a blocked caller.
        PaSyncPhase::Synchronizing | PaSyncPhase::Lost => Completion::none(),
    }
}

fn ase_state_completion(body: &EventBody, _payload: Option<&[u8]>) -> Completion {
    let EventBody::AseState(s) = body else { return Completion::none() };
    let action = match s.phase {
        AsePhase::CodecConfigured => UnicastAction::AseCodecConfigure,
        AsePhase::QosConfigured => UnicastAction::AseQosConfigure,
        AsePhase::Enabling => UnicastAction::AseEnable,
        AsePhase::Disabling => UnicastAction::AseDisable,
        AsePhase::Releasing => UnicastAction::AseRelease,
        AsePhase::Idle | AsePhase::Streaming => return Completion::none(),
    };
    Completion {
        candidates: vec![key(
            Action::Unicast(action),
            Some(ase_token(s.conn_handle, s.ase_id)),
        )],
        status: s.status,
        output: None,
    }
}

fn metadata_updated_completion(body: &EventBody, _payload: Option<&[u8]>) -> Completion {
    let EventBody::MetadataUpdated(s) = body else { return Completion::none() };
    Completion {
        candidates: vec![key(
            Action::Unicast(UnicastAction::AseUpdateMetadata),
            Some(ase_token(s.conn_handle, s.ase_id)),
        )],
        status: s.status,
        output: None,
    }
}

fn volume_state_completion(body: &EventBody, _payload: Option<&[u8]>) -> Completion {
    let EventBody::VolumeState(s) = body else { return Completion::none() };
    let token = Some(u32::from(s.conn_handle));
    Completion {
        // Three actions share this notification; the key disambiguates.
        candidates: vec![
            key(Action::Volume(VolumeAction::SetAbsoluteVolume), token),
            key(Action::Volume(VolumeAction::Mute), token),
            key(Action::Volume(VolumeAction::Unmute), token),
        ],
        status: HostStatus::Success,
        output: Some(ActionReturn::Volume(*s)),
    }
}

fn volume_offset_completion(body: &EventBody, _payload: Option<&[u8]>) -> Completion {
    let EventBody::VolumeOffsetState(s) = body else { return Completion::none() };
    Completion {
        candidates: vec![key(
            Action::Volume(VolumeAction::SetVolumeOffset),
            Some(u32::from(s.conn_handle)),
        )],
        status: HostStatus::Success,
        output: None,
    }
}

fn mic_state_completion(body: &EventBody, _payload: Option<&[u8]>) -> Completion {
    let EventBody::MicState(s) = body else { return Completion::none() };
    let token = Some(u32::from(s.conn_handle));
    Completion {
        candidates: vec![
            key(Action::Mic(MicAction::Mute), token),
            key(Action::Mic(MicAction::Unmute), token),
        ],
        status: HostStatus::Success,
        output: None,
    }
}

fn mic_gain_completion(body: &EventBody, _payload: Option<&[u8]>) -> Completion {
    let EventBody::MicGainState(s) = body else { return Completion::none() };
    Completion {
        candidates: vec![key(Action::Mic(MicAction::SetGain), Some(u32::from(s.conn_handle)))],
        status: HostStatus::Success,
        output: None,
    }
}

fn source_state_completion(body: &EventBody, _payload: Option<&[u8]>) -> Completion {
    let EventBody::SourceState(s) = body else { return Completion::none() };
    let token = Some(s.broadcast_id);
    match s.phase {
        SourcePhase::Streaming => Completion {
            candidates: vec![
                key(Action::BroadcastSource(SourceAction::Start), None),
                key(Action::BroadcastSource(SourceAction::UpdateMetadata), token),
            ],
            status: s.status,
            output: Some(ActionReturn::BroadcastId(s.broadcast_id)),
        },
        SourcePhase::Configured => Completion {
            candidates: vec![key(Action::BroadcastSource(SourceAction::Reconfigure), token)],
            status: s.status,
            output: None,
        },
        SourcePhase::Stopped => Completion {
            candidates: vec![key(Action::BroadcastSource(SourceAction::Stop), token)],
            status: s.status,
            output: None,
        },
        SourcePhase::Idle => Completion::none(),
    }
}

fn sink_state_completion(body: &EventBody, _payload: Option<&[u8]>) -> Completion {
    let EventBody::SinkState(s) = body else { return Completion::none() };
    match s.phase {
        SinkPhase::Synchronized => Completion {
            candidates: vec![key(Action::BroadcastSink(SinkAction::BigSyncEstablish), None)],
            status: s.status,
            output: Some(ActionReturn::BigHandle(s.big_handle)),
        },
        SinkPhase::Terminated => Completion {
            candidates: vec![
                key(
                    Action::BroadcastSink(SinkAction::BigSyncTerminate),
                    Some(u32::from(s.big_handle)),
                ),
                key(Action::BroadcastSink(SinkAction::BigSyncTerminate), None),
            ],
            status: s.status,
            output: None,
        },
        SinkPhase::Synchronizing | SinkPhase::Lost => Completion::none(),
    }
}

fn lock_state_completion(body: &EventBody, _payload: Option<&[u8]>) -> Completion {
    let EventBody::LockState(s) = body else { return Completion::none() };
    let action =
        if s.locked { CoordSetAction::LockRequest } else { CoordSetAction::LockRelease };
    Completion {
        candidates: vec![key(Action::CoordSet(action), None)],
        status: s.status,
        output: None,
    }
}

fn discover_done_completion(body: &EventBody, _payload: Option<&[u8]>) -> Completion {
    let EventBody::DiscoverDone(s) = body else { return Completion::none() };
    Completion {
        candidates: vec![key(
            Action::CoordSet(CoordSetAction::Discover),
            Some(u32::from(s.conn_handle)),
        )],
        status: s.status,
        output: Some(ActionReturn::SetSize(s.set_size)),
    }
}

fn control_result_completion(body: &EventBody, _payload: Option<&[u8]>) -> Completion {
    let EventBody::ControlResult(s) = body else { return Completion::none() };
    Completion {
        candidates: vec![
            key(Action::Media(MediaAction::Control), Some(u32::from(s.op as u8))),
            key(Action::Media(MediaAction::Control), None),
        ],
        status: s.result,
        output: None,
    }
}

fn title_read_completion(body: &EventBody, payload: Option<&[u8]>) -> Completion {
    let EventBody::TitleRead(s) = body else { return Completion::none() };
    let title = String::from_utf8_lossy(payload.unwrap_or_default()).into_owned();
    Completion {
        candidates: vec![key(
            Action::Media(MediaAction::ReadTrackTitle),
            Some(u32::from(s.conn_handle)),
        )],
        status: s.status,
        output: Some(ActionReturn::TrackTitle(title)),
    }
}
