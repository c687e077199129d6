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

//! Contains Coordinator, the orchestrator of simulated commit-protocol runs.

mod three_phase;
mod two_phase;

use serde::Serialize;

use crate::error::CoordinatorError;
use crate::message::MessageType;
use crate::node::NodeId;
use crate::participant::Participant;
use crate::protocol::Protocol;
use crate::snapshot::CoordinatorSnapshot;
use crate::step::{ProtocolStep, StepAction};
use crate::transaction::{Transaction, TransactionState};

/// The state of the coordinator itself.
///
/// `Preparing` covers both the two-phase prepare round and the three-phase
/// can-commit round; `PreCommitting` only occurs under three-phase.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinatorState {
    Idle,
    Preparing,
    PreCommitting,
    Committing,
    Aborting,
    Failed,
}

/// Orchestrates one commit-protocol run at a time over an owned set of
/// participants.
///
/// The coordinator drives every phase synchronously: `start_transaction`
/// creates a fresh [`Transaction`], runs the protocol's phases over the
/// participants in ascending index order, and returns the complete ordered
/// step trace. Exactly one transaction is current at any time; starting a new
/// run discards the previous transaction and trace.
///
/// Fault injection (`set_participant_can_commit`, `set_participant_failed`,
/// `set_coordinator_failed`) only affects future runs; a run in progress is
/// never interrupted.
pub struct Coordinator {
    protocol: Protocol,
    state: CoordinatorState,
    failed: bool,
    participants: Vec<Participant>,
    transaction: Option<Transaction>,
    steps: Vec<ProtocolStep>,
    next_step: u32,
}

impl Coordinator {
    /// Create a coordinator owning `participant_count` participants, indexed
    /// `0..participant_count`, all idle and willing to commit.
    pub fn new(protocol: Protocol, participant_count: usize) -> Self {
        Coordinator {
            protocol,
            state: CoordinatorState::Idle,
            failed: false,
            participants: (0..participant_count).map(Participant::new).collect(),
            transaction: None,
            steps: Vec::new(),
            next_step: 1,
        }
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn current_transaction(&self) -> Option<&Transaction> {
        self.transaction.as_ref()
    }

    /// The step trace of the most recent run.
    pub fn trace(&self) -> &[ProtocolStep] {
        &self.steps
    }

    /// Run one full protocol round for a new transaction and return the
    /// ordered step trace.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::CoordinatorFailed`] if the coordinator is
    /// marked failed; in that case no transaction is created and the prior
    /// trace is left untouched.
    pub fn start_transaction(
        &mut self,
        transaction_id: &str,
        payload: &str,
    ) -> Result<Vec<ProtocolStep>, CoordinatorError> {
        if self.failed {
            return Err(CoordinatorError::CoordinatorFailed);
        }

        debug!(
            "starting {} run for transaction {transaction_id} with {} participants",
            self.protocol,
            self.participants.len(),
        );

        self.steps.clear();
        self.next_step = 1;
        self.transaction = Some(Transaction::new(
            transaction_id,
            payload,
            self.participants.len(),
        ));

        let step = self
            .make_step(
                StepAction::TransactionInitiated,
                None,
                format!(
                    "Transaction {transaction_id} initiated with {} participants",
                    self.participants.len()
                ),
            )
            .with_from(NodeId::Coordinator);
        self.push_step(step);

        match self.protocol {
            Protocol::TwoPhase => self.run_two_phase(),
            Protocol::ThreePhase => self.run_three_phase(),
        }

        Ok(self.steps.clone())
    }

    /// Set a participant's phase-1 vote policy.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::InvalidParticipantIndex`] if `index` is
    /// outside the owned range; nothing is changed in that case.
    pub fn set_participant_can_commit(
        &mut self,
        index: usize,
        can_commit: bool,
    ) -> Result<(), CoordinatorError> {
        let count = self.participants.len();
        let participant = self
            .participants
            .get_mut(index)
            .ok_or(CoordinatorError::InvalidParticipantIndex { index, count })?;
        participant.set_can_commit(can_commit);
        Ok(())
    }

    /// Set or clear a participant's failure flag.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::InvalidParticipantIndex`] if `index` is
    /// outside the owned range; nothing is changed in that case.
    pub fn set_participant_failed(
        &mut self,
        index: usize,
        failed: bool,
    ) -> Result<(), CoordinatorError> {
        let count = self.participants.len();
        let participant = self
            .participants
            .get_mut(index)
            .ok_or(CoordinatorError::InvalidParticipantIndex { index, count })?;
        participant.set_failed(failed);
        Ok(())
    }

    /// Set or clear the coordinator's own failure flag.
    ///
    /// Failing forces the state to `Failed`; clearing the flag from `Failed`
    /// returns to `Idle`. Only future `start_transaction` calls observe the
    /// flag.
    pub fn set_coordinator_failed(&mut self, failed: bool) {
        self.failed = failed;
        if failed {
            self.state = CoordinatorState::Failed;
        } else if self.state == CoordinatorState::Failed {
            self.state = CoordinatorState::Idle;
        }
    }

    /// Discard the current transaction and trace, clear the failure flag, and
    /// reset every participant to its defaults.
    pub fn reset(&mut self) {
        for participant in &mut self.participants {
            participant.reset();
        }
        self.transaction = None;
        self.steps.clear();
        self.next_step = 1;
        self.failed = false;
        self.state = CoordinatorState::Idle;
    }

    /// A read-only snapshot of the coordinator, safe to serialize for a
    /// transport or visualization layer.
    pub fn snapshot(&self) -> CoordinatorSnapshot {
        CoordinatorSnapshot {
            state: self.state,
            is_failed: self.failed,
            participants: self.participants.clone(),
            current_transaction: self.transaction.clone(),
        }
    }

    fn next_step_number(&mut self) -> u32 {
        let number = self.next_step;
        self.next_step += 1;
        number
    }

    fn tallies(&self) -> (u32, u32) {
        self.transaction
            .as_ref()
            .map(|transaction| (transaction.yes_votes(), transaction.no_votes()))
            .unwrap_or((0, 0))
    }

    // Phase numbers only appear in three-phase traces.
    fn phase_tag(&self, phase: u8) -> Option<u8> {
        match self.protocol {
            Protocol::TwoPhase => None,
            Protocol::ThreePhase => Some(phase),
        }
    }

    fn make_step(
        &mut self,
        action: StepAction,
        phase: Option<u8>,
        description: String,
    ) -> ProtocolStep {
        let (yes_votes, no_votes) = self.tallies();
        let mut step = ProtocolStep::new(self.next_step_number(), action, description)
            .with_votes(yes_votes, no_votes);
        if let Some(phase) = phase {
            step = step.with_phase(phase);
        }
        step
    }

    fn push_step(&mut self, step: ProtocolStep) {
        self.steps.push(step);
    }

    // Phase 1 of either protocol: request a vote from every participant in
    // index order, recording a sent step and a received step per participant.
    fn run_vote_phase(&mut self) {
        let (send_action, request) = match self.protocol {
            Protocol::TwoPhase => (StepAction::PrepareSent, MessageType::Prepare),
            Protocol::ThreePhase => (StepAction::CanCommitSent, MessageType::CanCommit),
        };

        let transaction_id = match self.transaction.as_ref() {
            Some(transaction) => transaction.id().to_string(),
            None => return,
        };

        for index in 0..self.participants.len() {
            let phase = self.phase_tag(1);
            let step = self
                .make_step(
                    send_action,
                    phase,
                    format!("Coordinator sends {request} to participant {index}"),
                )
                .with_from(NodeId::Coordinator)
                .with_to(NodeId::Participant(index))
                .with_message_type(request);
            self.push_step(step);

            let vote = self.participants[index].prepare(&transaction_id);
            if let Some(transaction) = self.transaction.as_mut() {
                transaction.record_vote(vote);
            }

            let (yes_votes, no_votes) = self.tallies();
            let step = self
                .make_step(
                    StepAction::VoteReceived,
                    phase,
                    format!(
                        "Participant {index} votes {vote} ({yes_votes} yes / {no_votes} no)"
                    ),
                )
                .with_from(NodeId::Participant(index))
                .with_to(NodeId::Coordinator)
                .with_message_type(MessageType::Vote)
                .with_vote(vote);
            self.push_step(step);
        }
    }

    fn push_decision_step(&mut self, commit: bool) {
        let (yes_votes, no_votes) = self.tallies();
        let phase = self.phase_tag(1);
        let description = if commit {
            format!(
                "All {} participants voted YES, decision is COMMIT",
                self.participants.len()
            )
        } else {
            format!(
                "{no_votes} of {} votes were NO, decision is ABORT",
                yes_votes + no_votes
            )
        };
        debug!("decision for {} run: commit={commit}", self.protocol);

        let step = self
            .make_step(StepAction::Decision, phase, description)
            .with_from(NodeId::Coordinator);
        self.push_step(step);
    }

    // The abort round has the same shape under both protocols; under
    // three-phase it can only follow the phase-1 decision, so its steps carry
    // the phase-1 tag.
    fn run_abort_phase(&mut self) {
        self.state = CoordinatorState::Aborting;
        let protocol = self.protocol;

        for index in 0..self.participants.len() {
            let phase = self.phase_tag(1);
            let step = self
                .make_step(
                    StepAction::AbortSent,
                    phase,
                    format!("Coordinator sends ABORT to participant {index}"),
                )
                .with_from(NodeId::Coordinator)
                .with_to(NodeId::Participant(index))
                .with_message_type(MessageType::Abort);
            self.push_step(step);

            self.participants[index].abort(protocol);
            self.push_ack_step(index, phase, MessageType::Abort);
        }
    }

    fn push_ack_step(&mut self, index: usize, phase: Option<u8>, message: MessageType) {
        let description = if self.participants[index].is_failed() {
            format!("Participant {index} does not respond (failed)")
        } else {
            format!("Participant {index} acknowledges {message}")
        };
        let step = self
            .make_step(StepAction::AckReceived, phase, description)
            .with_from(NodeId::Participant(index))
            .with_to(NodeId::Coordinator)
            .with_message_type(MessageType::Ack);
        self.push_step(step);
    }

    // Terminal bookkeeping shared by all runs: mark the transaction, append
    // the closing step, and return to idle.
    fn finish(&mut self, committed: bool) {
        let transaction_id = self
            .transaction
            .as_ref()
            .map(|transaction| transaction.id().to_string())
            .unwrap_or_default();

        if let Some(transaction) = self.transaction.as_mut() {
            if committed {
                transaction.commit();
            } else {
                transaction.abort();
            }
        }

        let (action, outcome) = if committed {
            (StepAction::TransactionCommitted, "committed")
        } else {
            (StepAction::TransactionAborted, "aborted")
        };
        let step = self.make_step(action, None, format!("Transaction {transaction_id} {outcome}"));
        self.push_step(step);

        self.state = CoordinatorState::Idle;
        debug!("transaction {transaction_id} {outcome}");
    }

    // Decide commit or abort from the phase-1 tally. The vote invariant
    // holds here: yes + no equals the participant count.
    fn decide(&mut self) -> bool {
        let commit = self
            .transaction
            .as_ref()
            .map(Transaction::can_commit)
            .unwrap_or(false);
        self.push_decision_step(commit);
        commit
    }

    fn begin_voting(&mut self) {
        self.state = CoordinatorState::Preparing;
        if let Some(transaction) = self.transaction.as_mut() {
            transaction.set_state(TransactionState::Preparing);
        }
    }
}
