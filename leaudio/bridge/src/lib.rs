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

//! LE Audio host bridge.
//!
//! Correlates blocking application calls with the asynchronous,
//! single-threaded callbacks of the wrapped protocol stack: a pending
//! command table matches completions to blocked callers, an event router
//! fans stack notifications out by (group, subtype), an event pool hands
//! variable-length payloads across thread boundaries under unique
//! ownership, and a direct-call policy decides which event kinds the
//! stack may resolve synchronously on its own callback thread.

use bt_leaudio_profiles::{ActionParams, BufferToken, HostStatus, ReentrantAnswer};

mod api;
mod bridge;
mod config;
mod dispatch;
mod error;
mod indicate;
mod pending;
mod pool;
mod reentry;
mod router;

#[cfg(test)]
mod tests;

pub use bridge::Bridge;
pub use config::BridgeConfig;
pub use dispatch::CommandResult;
pub use error::ErrorKind;
pub use pool::Event;
pub use reentry::ReentrantKind;
pub use router::{CountersSnapshot, EventView};

/// Entry points of the wrapped protocol stack.
///
/// `submit` is the per-action call: it returns the stack's immediate
/// synchronous accept/reject, never the final result, which arrives
/// later through the bridge's stack callback. A stack that
/// rejects an action synchronously guarantees it will not also complete
/// it asynchronously.
pub trait StackEndpoint: Send + Sync {
    /// Issues one action to the stack. The final result arrives through
    /// the callback path.
    fn submit(&self, params: &ActionParams) -> Result<(), HostStatus>;

    /// Feeds the answer of a direct-call event back into the stack,
    /// before the originating callback returns.
    fn confirm(&self, answer: ReentrantAnswer);

    /// Acknowledges a stack-owned buffer so the stack may reuse it.
    fn ack_buffer(&self, token: BufferToken);
}
