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

//! The two-phase commit run: prepare, decide, then commit or abort.

use crate::message::MessageType;
use crate::node::NodeId;
use crate::protocol::Protocol;
use crate::step::StepAction;

use super::{Coordinator, CoordinatorState};

impl Coordinator {
    pub(super) fn run_two_phase(&mut self) {
        self.begin_voting();
        self.run_vote_phase();

        if self.decide() {
            self.run_commit_phase();
            self.finish(true);
        } else {
            self.run_abort_phase();
            self.finish(false);
        }
    }

    // Phase 2 on a commit decision: every participant moves from prepared to
    // committed with a send/ack step pair.
    fn run_commit_phase(&mut self) {
        self.state = CoordinatorState::Committing;

        for index in 0..self.participants.len() {
            let step = self
                .make_step(
                    StepAction::CommitSent,
                    None,
                    format!("Coordinator sends COMMIT to participant {index}"),
                )
                .with_from(NodeId::Coordinator)
                .with_to(NodeId::Participant(index))
                .with_message_type(MessageType::Commit);
            self.push_step(step);

            self.participants[index].commit(Protocol::TwoPhase);
            self.push_ack_step(index, None, MessageType::Commit);
        }
    }
}
