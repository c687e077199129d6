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

//! Contains Simulator, a lock-guarded session wrapper around a coordinator.

use parking_lot::RwLock;

use crate::coordinator::Coordinator;
use crate::error::CoordinatorError;
use crate::protocol::Protocol;
use crate::snapshot::CoordinatorSnapshot;
use crate::step::ProtocolStep;

/// An explicitly owned simulation session.
///
/// A `Simulator` holds one coordinator behind a single reader-writer lock.
/// Each mutating operation holds the write lock for its whole critical
/// section, so one `start_transaction` call runs all phases atomically as
/// observed by any other caller; `state` takes the read lock and therefore
/// only ever sees a pre-run or fully completed snapshot. A transport layer
/// constructs one `Simulator` per client session instead of sharing ambient
/// global state.
pub struct Simulator {
    coordinator: RwLock<Coordinator>,
}

impl Simulator {
    pub fn new(protocol: Protocol, participant_count: usize) -> Self {
        Simulator {
            coordinator: RwLock::new(Coordinator::new(protocol, participant_count)),
        }
    }

    /// Run one full protocol round; see [`Coordinator::start_transaction`].
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::CoordinatorFailed`] if the coordinator is
    /// marked failed.
    pub fn start_transaction(
        &self,
        transaction_id: &str,
        payload: &str,
    ) -> Result<Vec<ProtocolStep>, CoordinatorError> {
        self.coordinator
            .write()
            .start_transaction(transaction_id, payload)
    }

    /// # Errors
    ///
    /// Returns [`CoordinatorError::InvalidParticipantIndex`] if `index` is
    /// out of range.
    pub fn set_participant_can_commit(
        &self,
        index: usize,
        can_commit: bool,
    ) -> Result<(), CoordinatorError> {
        self.coordinator
            .write()
            .set_participant_can_commit(index, can_commit)
    }

    /// # Errors
    ///
    /// Returns [`CoordinatorError::InvalidParticipantIndex`] if `index` is
    /// out of range.
    pub fn set_participant_failed(
        &self,
        index: usize,
        failed: bool,
    ) -> Result<(), CoordinatorError> {
        self.coordinator
            .write()
            .set_participant_failed(index, failed)
    }

    pub fn set_coordinator_failed(&self, failed: bool) {
        self.coordinator.write().set_coordinator_failed(failed);
    }

    pub fn reset(&self) {
        self.coordinator.write().reset();
    }

    /// A serializable snapshot of the coordinator, taken under the read lock.
    pub fn state(&self) -> CoordinatorSnapshot {
        self.coordinator.read().snapshot()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    use crate::coordinator::CoordinatorState;
    use crate::participant::ParticipantState;
    use crate::transaction::TransactionState;

    #[test]
    fn test_snapshot_before_and_after_run() {
        let simulator = Simulator::new(Protocol::TwoPhase, 3);

        let snapshot = simulator.state();
        assert_eq!(snapshot.state, CoordinatorState::Idle);
        assert!(!snapshot.is_failed);
        assert_eq!(snapshot.participants.len(), 3);
        assert!(snapshot.current_transaction.is_none());

        simulator
            .start_transaction("TX-1", "payload")
            .expect("start_transaction failed");

        let snapshot = simulator.state();
        assert_eq!(snapshot.state, CoordinatorState::Idle);
        let transaction = snapshot.current_transaction.expect("no transaction");
        assert_eq!(transaction.state(), TransactionState::Committed);
        assert!(snapshot
            .participants
            .iter()
            .all(|p| p.state() == ParticipantState::Committed));
    }

    /// Test the snapshot wire shape a visualization layer consumes.
    #[test]
    fn test_snapshot_serializes_to_json() {
        let simulator = Simulator::new(Protocol::ThreePhase, 2);
        simulator
            .start_transaction("TX-9", "payload")
            .expect("start_transaction failed");

        let value = serde_json::to_value(simulator.state()).expect("serialize snapshot");
        assert_eq!(value["state"], "idle");
        assert_eq!(value["is_failed"], false);
        assert_eq!(value["participants"][0]["state"], "committed");
        assert_eq!(value["current_transaction"]["id"], "TX-9");
        assert_eq!(value["current_transaction"]["state"], "committed");
    }

    /// Concurrent runs against one simulator serialize entirely; each caller
    /// still gets a complete, gapless trace of its own.
    #[test]
    fn test_concurrent_runs_serialize() {
        let simulator = Arc::new(Simulator::new(Protocol::TwoPhase, 4));

        let handles: Vec<_> = (0..4)
            .map(|run| {
                let simulator = Arc::clone(&simulator);
                thread::spawn(move || {
                    simulator
                        .start_transaction(&format!("TX-{run}"), "payload")
                        .expect("start_transaction failed")
                })
            })
            .collect();

        for handle in handles {
            let trace = handle.join().expect("thread panicked");
            for (index, step) in trace.iter().enumerate() {
                assert_eq!(step.step_number(), index as u32 + 1);
            }
            assert_eq!(trace.len(), 4 * 4 + 3);
        }
    }
}
