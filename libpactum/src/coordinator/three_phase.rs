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

//! The three-phase commit run: can-commit, pre-commit, do-commit.
//!
//! Phase 1 has the same voting mechanics as two-phase prepare. Any NO vote
//! aborts immediately after phase 1, in exactly the two-phase abort shape.
//! On unanimous YES the run is already decided: once phase 2 begins there is
//! no abort branch, which is the structural guarantee the extra phase buys.
//! The real-world 3PC recovery property (a pre-committed participant
//! autonomously committing after a coordinator crash timeout) is outside this
//! simulation; there are no wall-clock timeouts here.

use crate::message::MessageType;
use crate::node::NodeId;
use crate::protocol::Protocol;
use crate::step::StepAction;

use super::{Coordinator, CoordinatorState};

impl Coordinator {
    pub(super) fn run_three_phase(&mut self) {
        self.begin_voting();
        self.run_vote_phase();

        if self.decide() {
            self.run_pre_commit_phase();
            self.run_do_commit_phase();
            self.finish(true);
        } else {
            self.run_abort_phase();
            self.finish(false);
        }
    }

    // Phase 2: drive every participant from uncertain to pre-committed.
    fn run_pre_commit_phase(&mut self) {
        self.state = CoordinatorState::PreCommitting;

        for index in 0..self.participants.len() {
            let step = self
                .make_step(
                    StepAction::PreCommitSent,
                    Some(2),
                    format!("Coordinator sends PRE-COMMIT to participant {index}"),
                )
                .with_from(NodeId::Coordinator)
                .with_to(NodeId::Participant(index))
                .with_message_type(MessageType::PreCommit);
            self.push_step(step);

            self.participants[index].pre_commit();
            self.push_ack_step(index, Some(2), MessageType::PreCommit);
        }
    }

    // Phase 3: drive every participant from pre-committed to committed.
    fn run_do_commit_phase(&mut self) {
        self.state = CoordinatorState::Committing;

        for index in 0..self.participants.len() {
            let step = self
                .make_step(
                    StepAction::CommitSent,
                    Some(3),
                    format!("Coordinator sends DO-COMMIT to participant {index}"),
                )
                .with_from(NodeId::Coordinator)
                .with_to(NodeId::Participant(index))
                .with_message_type(MessageType::DoCommit);
            self.push_step(step);

            self.participants[index].commit(Protocol::ThreePhase);
            self.push_ack_step(index, Some(3), MessageType::DoCommit);
        }
    }
}
