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

use num_derive::{FromPrimitive, ToPrimitive};

/// Status codes reported by the wrapped protocol stack, both as the
/// immediate accept/reject of an action entry point and as the final
/// result carried by a completion callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u16)]
#[allow(missing_docs)]
pub enum HostStatus {
    Success = 0x0000,
    Fail = 0x0001,
    NotReady = 0x0002,
    InvalidParameters = 0x0003,
    Disallowed = 0x0004,
    UnknownIdentifier = 0x0005,
    InsufficientResources = 0x0006,
    Busy = 0x0007,
    OperationTimeout = 0x0008,
    UnsupportedFeature = 0x0009,
    UnsupportedRemoteFeature = 0x000A,
    InsufficientAuthentication = 0x000B,
    InsufficientEncryption = 0x000C,
    ConnectionLost = 0x000D,
    SyncLost = 0x000E,
    InvalidState = 0x000F,
    LimitReached = 0x0010,
    CancelledByHost = 0x0011,
}
