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

use bt_leaudio_profiles::Capabilities;

/// Depth of the asynchronous indication queue. A full queue drops the
/// event rather than blocking the stack's callback thread.
pub const DEFAULT_EVENT_QUEUE_DEPTH: usize = 64;

/// Events that may be alive at once, across the indication queue and
/// any subscriber still holding one.
pub const DEFAULT_MAX_LIVE_EVENTS: usize = 64;

/// Largest variable-length payload copied into a single event.
pub const DEFAULT_MAX_EVENT_BUFFER: usize = 2048;

/// Construction-time configuration of a [`crate::Bridge`].
#[derive(Clone, Copy, Debug)]
pub struct BridgeConfig {
    /// Locally supported capabilities; actions requiring an absent bit
    /// fail with `Unsupported` before reaching the stack.
    pub capabilities: Capabilities,
    pub event_queue_depth: usize,
    pub max_live_events: usize,
    pub max_event_buffer: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            capabilities: Capabilities::all(),
            event_queue_depth: DEFAULT_EVENT_QUEUE_DEPTH,
            max_live_events: DEFAULT_MAX_LIVE_EVENTS,
            max_event_buffer: DEFAULT_MAX_EVENT_BUFFER,
        }
    }
}
