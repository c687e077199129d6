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

//! Contains MessageType, the kind of simulated message a trace step records.

use std::fmt::{Display, Formatter, Result as FormatResult};

use serde::{Deserialize, Serialize};

/// The kind of message carried by one simulated exchange.
///
/// `Prepare`, `Commit` and `Abort` belong to the two-phase protocol;
/// `CanCommit`, `PreCommit` and `DoCommit` to the three-phase protocol.
/// `Vote` and `Ack` are participant responses common to both.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Prepare,
    CanCommit,
    PreCommit,
    DoCommit,
    Commit,
    Abort,
    Vote,
    Ack,
}

impl Display for MessageType {
    fn fmt(&self, f: &mut Formatter) -> FormatResult {
        match self {
            MessageType::Prepare => write!(f, "PREPARE"),
            MessageType::CanCommit => write!(f, "CAN-COMMIT"),
            MessageType::PreCommit => write!(f, "PRE-COMMIT"),
            MessageType::DoCommit => write!(f, "DO-COMMIT"),
            MessageType::Commit => write!(f, "COMMIT"),
            MessageType::Abort => write!(f, "ABORT"),
            MessageType::Vote => write!(f, "VOTE"),
            MessageType::Ack => write!(f, "ACK"),
        }
    }
}
