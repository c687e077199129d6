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

//! Pactum is a deterministic, in-memory simulator of distributed
//! atomic-commit protocols, built for teaching and visualization.
//!
//! A [`Coordinator`] owns a fixed set of [`Participant`]s and drives one
//! [`Transaction`] at a time through the phases of either two-phase or
//! three-phase commit, emitting an ordered [`ProtocolStep`] trace of every
//! simulated message exchange. Faults are injected explicitly (a participant
//! that votes NO, a participant or coordinator that is failed) rather than
//! arising from a network, so every run is reproducible.
//!
//! The [`Simulator`] wrapper adds the single-writer locking discipline a
//! transport layer needs to expose a coordinator to concurrent callers.

#[macro_use]
extern crate log;

mod coordinator;
pub mod error;
mod message;
mod node;
mod participant;
mod protocol;
#[cfg(feature = "simulator")]
mod simulator;
mod snapshot;
mod step;
mod transaction;
mod vote;

pub use coordinator::{Coordinator, CoordinatorState};
pub use message::MessageType;
pub use node::NodeId;
pub use participant::{Participant, ParticipantState};
pub use protocol::Protocol;
#[cfg(feature = "simulator")]
pub use simulator::Simulator;
pub use snapshot::CoordinatorSnapshot;
pub use step::{ProtocolStep, StepAction};
pub use transaction::{Transaction, TransactionState};
pub use vote::Vote;
