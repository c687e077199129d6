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

//! Contains Participant, the per-node state machine driven by a coordinator.

use serde::Serialize;

use crate::protocol::Protocol;
use crate::vote::Vote;

/// The state of a participant node.
///
/// `Uncertain` doubles as the two-phase "prepared" state: the participant has
/// voted YES and is waiting for the coordinator's decision. `PreCommitted`
/// only occurs under the three-phase protocol.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantState {
    Idle,
    Uncertain,
    PreCommitted,
    Aborted,
    Committed,
    Failed,
}

/// A simulated participant node.
///
/// A participant is created once at coordinator construction, persists across
/// transactions, and is mutated only by its owning coordinator. The
/// `can_commit` policy flag decides its phase-1 vote; the `failed` flag
/// freezes it entirely, simulating an unresponsive node.
#[derive(Clone, Debug, Serialize)]
pub struct Participant {
    id: usize,
    state: ParticipantState,
    last_vote: Option<Vote>,
    transaction_id: Option<String>,
    can_commit: bool,
    failed: bool,
}

impl Participant {
    pub(crate) fn new(id: usize) -> Self {
        Participant {
            id,
            state: ParticipantState::Idle,
            last_vote: None,
            transaction_id: None,
            can_commit: true,
            failed: false,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn state(&self) -> ParticipantState {
        self.state
    }

    pub fn last_vote(&self) -> Option<Vote> {
        self.last_vote
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction_id.as_deref()
    }

    pub fn can_commit(&self) -> bool {
        self.can_commit
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Handle a phase-1 request and return the vote.
    ///
    /// A failed participant answers NO without recording the transaction or
    /// changing state, simulating a node whose silence the coordinator counts
    /// as a NO vote. Otherwise the transaction id is recorded and the
    /// `can_commit` policy decides the vote: YES moves to `Uncertain`, NO
    /// moves directly to `Aborted`.
    pub fn prepare(&mut self, transaction_id: &str) -> Vote {
        if self.failed {
            return Vote::No;
        }

        self.transaction_id = Some(transaction_id.to_string());

        let vote = if self.can_commit { Vote::Yes } else { Vote::No };
        self.last_vote = Some(vote);
        self.state = match vote {
            Vote::Yes => ParticipantState::Uncertain,
            Vote::No => ParticipantState::Aborted,
        };

        vote
    }

    /// Handle a three-phase pre-commit request.
    ///
    /// Only an `Uncertain`, non-failed participant moves to `PreCommitted`;
    /// any other state is a no-op.
    pub fn pre_commit(&mut self) {
        if !self.failed && self.state == ParticipantState::Uncertain {
            self.state = ParticipantState::PreCommitted;
        }
    }

    /// Handle the final commit request.
    ///
    /// The required predecessor state depends on the protocol: `Uncertain`
    /// under two-phase, `PreCommitted` under three-phase. Anything else,
    /// including a failed participant, is a no-op.
    pub fn commit(&mut self, protocol: Protocol) {
        let predecessor = match protocol {
            Protocol::TwoPhase => ParticipantState::Uncertain,
            Protocol::ThreePhase => ParticipantState::PreCommitted,
        };
        if !self.failed && self.state == predecessor {
            self.state = ParticipantState::Committed;
        }
    }

    /// Handle an abort request.
    ///
    /// Under two-phase, any non-committed, non-failed participant aborts.
    /// Under three-phase, only an `Uncertain` participant may abort; once
    /// pre-committed, abort is structurally disallowed. That asymmetry is the
    /// defining guarantee bought by the extra phase.
    pub fn abort(&mut self, protocol: Protocol) {
        if self.failed {
            return;
        }
        match protocol {
            Protocol::TwoPhase => {
                if self.state != ParticipantState::Committed {
                    self.state = ParticipantState::Aborted;
                }
            }
            Protocol::ThreePhase => {
                if self.state == ParticipantState::Uncertain {
                    self.state = ParticipantState::Aborted;
                }
            }
        }
    }

    pub fn set_can_commit(&mut self, can_commit: bool) {
        self.can_commit = can_commit;
    }

    /// Set or clear the failure flag.
    ///
    /// Failing a participant forces its state to `Failed`; clearing the flag
    /// from `Failed` returns it to `Idle`.
    pub fn set_failed(&mut self, failed: bool) {
        self.failed = failed;
        if failed {
            self.state = ParticipantState::Failed;
        } else if self.state == ParticipantState::Failed {
            self.state = ParticipantState::Idle;
        }
    }

    /// Return to `Idle` with all policy flags and per-transaction fields at
    /// their defaults.
    pub fn reset(&mut self) {
        self.state = ParticipantState::Idle;
        self.last_vote = None;
        self.transaction_id = None;
        self.can_commit = true;
        self.failed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_votes_yes_and_moves_to_uncertain() {
        let mut participant = Participant::new(0);

        assert_eq!(participant.prepare("TX-1"), Vote::Yes);
        assert_eq!(participant.state(), ParticipantState::Uncertain);
        assert_eq!(participant.last_vote(), Some(Vote::Yes));
        assert_eq!(participant.transaction_id(), Some("TX-1"));
    }

    #[test]
    fn test_prepare_votes_no_and_aborts_when_cannot_commit() {
        let mut participant = Participant::new(0);
        participant.set_can_commit(false);

        assert_eq!(participant.prepare("TX-1"), Vote::No);
        assert_eq!(participant.state(), ParticipantState::Aborted);
        assert_eq!(participant.last_vote(), Some(Vote::No));
    }

    /// Test that a failed participant votes NO without mutating any of its
    /// fields, even when its commit policy would have said YES.
    #[test]
    fn test_failed_participant_votes_no_without_mutation() {
        let mut participant = Participant::new(0);
        participant.set_failed(true);

        assert_eq!(participant.prepare("TX-1"), Vote::No);
        assert_eq!(participant.state(), ParticipantState::Failed);
        assert_eq!(participant.last_vote(), None);
        assert_eq!(participant.transaction_id(), None);
    }

    #[test]
    fn test_pre_commit_requires_uncertain() {
        let mut participant = Participant::new(0);

        // Not yet prepared; pre-commit is a no-op.
        participant.pre_commit();
        assert_eq!(participant.state(), ParticipantState::Idle);

        participant.prepare("TX-1");
        participant.pre_commit();
        assert_eq!(participant.state(), ParticipantState::PreCommitted);
    }

    #[test]
    fn test_commit_predecessor_differs_by_protocol() {
        let mut participant = Participant::new(0);
        participant.prepare("TX-1");

        // Uncertain is not enough under three-phase.
        participant.commit(Protocol::ThreePhase);
        assert_eq!(participant.state(), ParticipantState::Uncertain);

        participant.commit(Protocol::TwoPhase);
        assert_eq!(participant.state(), ParticipantState::Committed);

        let mut participant = Participant::new(1);
        participant.prepare("TX-1");
        participant.pre_commit();
        participant.commit(Protocol::ThreePhase);
        assert_eq!(participant.state(), ParticipantState::Committed);
    }

    #[test]
    fn test_two_phase_abort_allowed_from_any_non_committed_state() {
        let mut participant = Participant::new(0);
        participant.abort(Protocol::TwoPhase);
        assert_eq!(participant.state(), ParticipantState::Aborted);

        let mut participant = Participant::new(1);
        participant.prepare("TX-1");
        participant.abort(Protocol::TwoPhase);
        assert_eq!(participant.state(), ParticipantState::Aborted);

        let mut participant = Participant::new(2);
        participant.prepare("TX-1");
        participant.commit(Protocol::TwoPhase);
        participant.abort(Protocol::TwoPhase);
        assert_eq!(participant.state(), ParticipantState::Committed);
    }

    /// Test the irreversibility guarantee of the third phase: once a
    /// participant is pre-committed, abort is a no-op.
    #[test]
    fn test_three_phase_abort_disallowed_after_pre_commit() {
        let mut participant = Participant::new(0);
        participant.prepare("TX-1");
        participant.pre_commit();

        participant.abort(Protocol::ThreePhase);
        assert_eq!(participant.state(), ParticipantState::PreCommitted);

        participant.commit(Protocol::ThreePhase);
        assert_eq!(participant.state(), ParticipantState::Committed);
    }

    #[test]
    fn test_three_phase_abort_allowed_only_from_uncertain() {
        let mut participant = Participant::new(0);
        participant.abort(Protocol::ThreePhase);
        assert_eq!(participant.state(), ParticipantState::Idle);

        participant.prepare("TX-1");
        participant.abort(Protocol::ThreePhase);
        assert_eq!(participant.state(), ParticipantState::Aborted);
    }

    #[test]
    fn test_set_failed_forces_failed_state_and_clears_back_to_idle() {
        let mut participant = Participant::new(0);
        participant.prepare("TX-1");

        participant.set_failed(true);
        assert_eq!(participant.state(), ParticipantState::Failed);
        assert!(participant.is_failed());

        participant.set_failed(false);
        assert_eq!(participant.state(), ParticipantState::Idle);
        assert!(!participant.is_failed());
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut participant = Participant::new(0);
        participant.set_can_commit(false);
        participant.prepare("TX-1");
        participant.set_failed(true);

        participant.reset();

        assert_eq!(participant.state(), ParticipantState::Idle);
        assert_eq!(participant.last_vote(), None);
        assert_eq!(participant.transaction_id(), None);
        assert!(participant.can_commit());
        assert!(!participant.is_failed());
    }
}
