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

//! Contains ProtocolStep, one ordered entry of a run's visualization trace.

use serde::Serialize;

use crate::message::MessageType;
use crate::node::NodeId;
use crate::vote::Vote;

/// The tag identifying what a trace step records.
///
/// The three-phase do-commit round reuses `CommitSent`; the message type on
/// the step distinguishes `DO-COMMIT` from a plain two-phase `COMMIT`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    TransactionInitiated,
    PrepareSent,
    CanCommitSent,
    VoteReceived,
    Decision,
    PreCommitSent,
    CommitSent,
    AbortSent,
    AckReceived,
    TransactionCommitted,
    TransactionAborted,
}

/// One message exchange in a protocol run, described for visualization.
///
/// Steps are append-only and numbered from 1 without gaps within one run.
/// The yes/no counts are the running tally at the moment the step was
/// recorded, so a consumer can replay the vote as it accumulated.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProtocolStep {
    step_number: u32,
    action: StepAction,
    description: String,
    phase: Option<u8>,
    from: Option<NodeId>,
    to: Option<NodeId>,
    message_type: Option<MessageType>,
    vote: Option<Vote>,
    yes_votes: u32,
    no_votes: u32,
}

impl ProtocolStep {
    pub fn new<D: Into<String>>(step_number: u32, action: StepAction, description: D) -> Self {
        ProtocolStep {
            step_number,
            action,
            description: description.into(),
            phase: None,
            from: None,
            to: None,
            message_type: None,
            vote: None,
            yes_votes: 0,
            no_votes: 0,
        }
    }

    pub fn with_phase(mut self, phase: u8) -> Self {
        self.phase = Some(phase);
        self
    }

    pub fn with_from(mut self, from: NodeId) -> Self {
        self.from = Some(from);
        self
    }

    pub fn with_to(mut self, to: NodeId) -> Self {
        self.to = Some(to);
        self
    }

    pub fn with_message_type(mut self, message_type: MessageType) -> Self {
        self.message_type = Some(message_type);
        self
    }

    pub fn with_vote(mut self, vote: Vote) -> Self {
        self.vote = Some(vote);
        self
    }

    pub fn with_votes(mut self, yes_votes: u32, no_votes: u32) -> Self {
        self.yes_votes = yes_votes;
        self.no_votes = no_votes;
        self
    }

    pub fn step_number(&self) -> u32 {
        self.step_number
    }

    pub fn action(&self) -> StepAction {
        self.action
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn phase(&self) -> Option<u8> {
        self.phase
    }

    pub fn from(&self) -> Option<NodeId> {
        self.from
    }

    pub fn to(&self) -> Option<NodeId> {
        self.to
    }

    pub fn message_type(&self) -> Option<MessageType> {
        self.message_type
    }

    pub fn vote(&self) -> Option<Vote> {
        self.vote
    }

    pub fn yes_votes(&self) -> u32 {
        self.yes_votes
    }

    pub fn no_votes(&self) -> u32 {
        self.no_votes
    }
}
