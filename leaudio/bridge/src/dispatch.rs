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

//! Blocking command submission.

use crate::error::ErrorKind;
use crate::pending::{self, CommandKey, PendingCommandTable, PendingEntry};
use crate::StackEndpoint;
use bt_leaudio_profiles::{ActionParams, ActionReturn, Capabilities, HostStatus};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How long a timed-out caller waits for a completion it lost the
/// removal race to. The router holds the entry and signals right after;
/// this bounds the re-check, it does not poll.
const COMPLETION_GRACE: Duration = Duration::from_millis(2);

/// What a completed command hands back: the stack's result code and the
/// typed output the completion handler populated before signalling.
#[derive(Clone, Debug, PartialEq)]
pub struct CommandResult {
    pub status: HostStatus,
    pub output: Option<ActionReturn>,
}

pub(crate) struct CommandDispatcher {
    pending: Arc<PendingCommandTable>,
    endpoint: Arc<dyn StackEndpoint>,
    capabilities: Capabilities,
    enabled: Arc<AtomicBool>,
}

impl CommandDispatcher {
    pub fn new(
        pending: Arc<PendingCommandTable>,
        endpoint: Arc<dyn StackEndpoint>,
        capabilities: Capabilities,
        enabled: Arc<AtomicBool>,
    ) -> Self {
        Self { pending, endpoint, capabilities, enabled }
    }

    /// Issues one action and blocks until the stack's callback reports
    /// completion or `timeout` elapses. A timeout cancels the waiting
    /// only: the stack may still complete later, and that completion is
    /// absorbed by the router as an orphan.
    pub fn submit_blocking(
        &self,
        params: ActionParams,
        token: Option<u32>,
        timeout: Duration,
    ) -> Result<CommandResult, ErrorKind> {
        if !self.enabled.load(Ordering::Acquire) {
            return Err(ErrorKind::NotReady);
        }
        if let Err(what) = params.validate() {
            log::warn!("rejecting {:?}: {}", params.action(), what);
            return Err(ErrorKind::ParamInvalid);
        }
        if !self.capabilities.contains(params.required_caps()) {
            return Err(ErrorKind::Unsupported);
        }

        let key = CommandKey { action: params.action(), token };
        let slot = pending::new_slot();
        if self.pending.insert(key, PendingEntry { slot: slot.clone() }).is_err() {
            return Err(ErrorKind::Busy);
        }

        // A synchronous reject guarantees no asynchronous completion
        // will follow, so the entry can be taken back immediately.
        if let Err(status) = self.endpoint.submit(&params) {
            self.pending.timeout_remove(key);
            return Err(ErrorKind::LowerStackApi(status));
        }

        let (lock, cvar) = &*slot;
        let deadline = Instant::now() + timeout;
        let mut state = lock.lock().unwrap();
        while !state.done {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            state = cvar.wait_timeout(state, deadline - now).unwrap().0;
        }
        if state.done {
            return Ok(CommandResult { status: state.status, output: state.output.take() });
        }
        drop(state);

        if self.pending.timeout_remove(key).is_some() {
            return Err(ErrorKind::Timeout);
        }

        // Lost the removal race: the router took the entry and is
        // completing right now. One bounded re-check resolves it.
        let mut state = lock.lock().unwrap();
        if !state.done {
            state = cvar.wait_timeout(state, COMPLETION_GRACE).unwrap().0;
        }
        if state.done {
            Ok(CommandResult { status: state.status, output: state.output.take() })
        } else {
            Err(ErrorKind::Timeout)
        }
    }
}
