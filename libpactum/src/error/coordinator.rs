// Copyright 2023 Bitwise IO, Inc.
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

//! Contains CoordinatorError

/// An error returned by a coordinator operation.
///
/// Every variant is local and recoverable; the simulation has no retry or
/// backoff semantics because "failure" here means a deliberately injected
/// fault, not a network fault.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CoordinatorError {
    /// The coordinator is marked failed; `start_transaction` refuses to run
    /// and leaves all prior state untouched.
    #[error("coordinator is failed; cannot start a transaction")]
    CoordinatorFailed,

    /// A fault-injection mutator was given a participant index outside the
    /// range owned by the coordinator.
    #[error("participant index {index} out of range (coordinator owns {count} participants)")]
    InvalidParticipantIndex { index: usize, count: usize },
}
