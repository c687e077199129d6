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

//! Contains CoordinatorSnapshot, a read-only view for transport layers.

use serde::Serialize;

use crate::coordinator::CoordinatorState;
use crate::participant::Participant;
use crate::transaction::Transaction;

/// An owned, serializable snapshot of a coordinator.
///
/// The snapshot is a strongly typed record rather than a loose map; a
/// transport layer is free to flatten it into whatever dynamic shape its
/// clients expect. Because it is taken under the coordinator's lock, it only
/// ever reflects a fully completed run, never a partial one.
#[derive(Clone, Debug, Serialize)]
pub struct CoordinatorSnapshot {
    pub state: CoordinatorState,
    pub is_failed: bool,
    pub participants: Vec<Participant>,
    pub current_transaction: Option<Transaction>,
}
