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

//! The bridge context: one explicitly constructed object owning the
//! pending table, router, pool and indication worker. Multiple bridges
//! over independent stack instances can coexist.

use crate::config::BridgeConfig;
use crate::dispatch::{CommandDispatcher, CommandResult};
use crate::error::ErrorKind;
use crate::indicate::{Indications, SubscriberTable};
use crate::pending::PendingCommandTable;
use crate::pool::{Event, EventPool};
use crate::router::{CountersSnapshot, EventRouter, EventView};
use crate::StackEndpoint;
use bt_leaudio_profiles::broadcast::{BigSyncAnswer, PaSyncAnswer};
use bt_leaudio_profiles::unicast::QosPreference;
use bt_leaudio_profiles::{
    split_message_id, ActionParams, BufferToken, EventBody, Group, ReentrantAnswer,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub struct Bridge {
    dispatcher: CommandDispatcher,
    router: EventRouter,
    subscribers: Arc<SubscriberTable>,
    pending: Arc<PendingCommandTable>,
    enabled: Arc<AtomicBool>,
}

impl Bridge {
    /// Builds the bridge over one stack instance. The handler table and
    /// the indication worker come up here; the returned bridge accepts
    /// calls immediately.
    pub fn new(endpoint: Arc<dyn StackEndpoint>, config: BridgeConfig) -> Self {
        let pending = Arc::new(PendingCommandTable::new());
        let subscribers = Arc::new(SubscriberTable::new());
        let pool = EventPool::new(config.max_live_events, config.max_event_buffer);
        let indications = Indications::new(config.event_queue_depth, subscribers.clone());
        let enabled = Arc::new(AtomicBool::new(true));

        let router = EventRouter::new(pending.clone(), pool, indications, endpoint.clone());
        let dispatcher = CommandDispatcher::new(
            pending.clone(),
            endpoint,
            config.capabilities,
            enabled.clone(),
        );

        Self { dispatcher, router, subscribers, pending, enabled }
    }

    /// Gates command submission. Disabling fails new calls with
    /// `NotReady`; callbacks keep flowing so in-flight commands can
    /// still resolve.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    /// Issues an action and blocks for its completion. `token` is the
    /// caller-supplied correlation token for actions whose identifier
    /// alone is ambiguous; the typed wrappers choose it consistently
    /// with the router's completion mapping.
    pub fn submit_blocking(
        &self,
        params: ActionParams,
        token: Option<u32>,
        timeout: Duration,
    ) -> Result<CommandResult, ErrorKind> {
        self.dispatcher.submit_blocking(params, token, timeout)
    }

    /// The stack's single callback entry point, registered at stack
    /// initialization. Runs on the stack's callback thread. `payload`
    /// borrows a stack-owned buffer valid only for this call; whatever
    /// outlives it is deep-copied inside.
    pub fn stack_callback(
        &self,
        message_id: u16,
        body: EventBody,
        payload: Option<&[u8]>,
        token: Option<BufferToken>,
    ) {
        match split_message_id(message_id) {
            Some((group, subtype)) if group == body.group() && subtype == body.subtype() => {
                self.router.dispatch(body, payload, token);
            }
            _ => self.router.reject(message_id, token),
        }
    }

    /// Subscribes to asynchronous indications of one group. Callbacks
    /// run on the bridge's indication worker thread and must consume
    /// the event before returning.
    pub fn register_event_handler(
        &self,
        group: Group,
        callback: impl Fn(&Event) + Send + Sync + 'static,
    ) {
        self.subscribers.register(group, Arc::new(callback));
    }

    pub fn unregister_event_handler(&self, group: Group) -> bool {
        self.subscribers.unregister(group)
    }

    /// Registers the synchronous handler consulted when a direct-call
    /// event kind is dispatched with its policy opted in. The handler
    /// runs on the stack's callback thread and must not block.
    pub fn register_reentrant_handler(
        &self,
        group: Group,
        subtype: u8,
        handler: impl Fn(EventView<'_>) -> ReentrantAnswer + Send + Sync + 'static,
    ) {
        self.router.register_reentrant_handler(group, subtype, Arc::new(handler));
    }

    /// Opts a (group, subtype) in or out of direct calling. Without an
    /// opt-in the router answers from the cached fallback and indicates
    /// the event asynchronously.
    pub fn set_direct_reentry_policy(&self, group: Group, subtype: u8, enabled: bool) {
        self.router.set_reentry_policy(group, subtype, enabled);
    }

    /// Caches the QoS preference used as the direct-call fallback.
    pub fn cache_preferred_qos(&self, qos: QosPreference) {
        self.router.with_reentry(|r| r.cache_preferred_qos(qos));
    }

    pub fn cache_pa_sync_fallback(&self, answer: PaSyncAnswer) {
        self.router.with_reentry(|r| r.cache_pa_sync(answer));
    }

    pub fn cache_big_sync_fallback(&self, answer: BigSyncAnswer) {
        self.router.with_reentry(|r| r.cache_big_sync(answer));
    }

    pub fn cache_broadcast_code(&self, code: [u8; 16]) {
        self.router.with_reentry(|r| r.cache_broadcast_code(code));
    }

    /// Commands currently awaiting completion.
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    /// Diagnostic counters: completions, orphans, rejects, drops.
    pub fn counters(&self) -> CountersSnapshot {
        self.router.counters()
    }
}
