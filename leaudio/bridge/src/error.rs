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

use bt_leaudio_profiles::HostStatus;
use std::fmt;

/// Failures a blocking call can surface to its caller. Errors detected
/// before the stack entry point never touch the pending-command table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The bridge or the underlying stack is not enabled.
    NotReady,
    /// Caller-supplied parameters failed precondition checks.
    ParamInvalid,
    /// A command with the same action key is already in flight.
    Busy,
    /// No completion arrived within the deadline. The underlying
    /// operation may still finish later; that completion is absorbed.
    Timeout,
    /// The wrapped stack reported failure, either as the immediate
    /// reject of its entry point or as the completion result code.
    LowerStackApi(HostStatus),
    /// Event or output buffer allocation failed.
    NoMemory,
    /// A required capability bit is absent from the configuration.
    Unsupported,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady => write!(f, "bridge not enabled"),
            Self::ParamInvalid => write!(f, "invalid parameters"),
            Self::Busy => write!(f, "action already in flight"),
            Self::Timeout => write!(f, "no completion within deadline"),
            Self::LowerStackApi(status) => write!(f, "stack reported {:?}", status),
            Self::NoMemory => write!(f, "allocation failed"),
            Self::Unsupported => write!(f, "capability not supported"),
        }
    }
}
