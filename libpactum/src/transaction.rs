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

//! Contains Transaction, the record of one commit attempt.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::vote::Vote;

/// The lifecycle state of a transaction.
///
/// `Committed` and `Aborted` are terminal.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionState {
    Initiated,
    Preparing,
    Committed,
    Aborted,
}

/// One commit attempt: its payload, vote tally, and outcome.
///
/// A transaction is created fresh on every `start_transaction` call; the
/// coordinator's previous transaction is discarded, not archived.
#[derive(Clone, Debug, Serialize)]
pub struct Transaction {
    id: String,
    state: TransactionState,
    payload: String,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    yes_votes: u32,
    no_votes: u32,
    total_participants: u32,
}

impl Transaction {
    pub fn new(id: &str, payload: &str, total_participants: usize) -> Self {
        Transaction {
            id: id.to_string(),
            state: TransactionState::Initiated,
            payload: payload.to_string(),
            started_at: Utc::now(),
            ended_at: None,
            yes_votes: 0,
            no_votes: 0,
            total_participants: total_participants as u32,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    pub fn yes_votes(&self) -> u32 {
        self.yes_votes
    }

    pub fn no_votes(&self) -> u32 {
        self.no_votes
    }

    pub fn total_participants(&self) -> u32 {
        self.total_participants
    }

    pub(crate) fn set_state(&mut self, state: TransactionState) {
        self.state = state;
    }

    /// Add one vote to the running tally.
    pub fn record_vote(&mut self, vote: Vote) {
        match vote {
            Vote::Yes => self.yes_votes += 1,
            Vote::No => self.no_votes += 1,
        }
    }

    /// True iff every expected participant voted YES and none voted NO.
    pub fn can_commit(&self) -> bool {
        self.yes_votes == self.total_participants && self.no_votes == 0
    }

    /// Mark the transaction committed and stamp its end time. Guarding
    /// against a second terminal transition is the caller's responsibility.
    pub fn commit(&mut self) {
        self.state = TransactionState::Committed;
        self.ended_at = Some(Utc::now());
    }

    /// Mark the transaction aborted and stamp its end time.
    pub fn abort(&mut self) {
        self.state = TransactionState::Aborted;
        self.ended_at = Some(Utc::now());
    }
}
