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

//! Contains NodeId, the identity of a node in a simulated protocol run.

use std::fmt::{Display, Formatter, Result as FormatResult};

use serde::{Deserialize, Serialize};

/// The identity of a node appearing in a protocol trace.
///
/// The coordinator is a distinct variant rather than a reserved participant
/// index, so trace consumers never have to interpret a numeric sentinel. A
/// step field of `Option<NodeId>` therefore distinguishes "the coordinator"
/// from "no node at all".
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeId {
    Coordinator,
    Participant(usize),
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter) -> FormatResult {
        match self {
            NodeId::Coordinator => write!(f, "coordinator"),
            NodeId::Participant(index) => write!(f, "participant {index}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test that the coordinator identity serializes as a distinct tag, not
    /// as a participant index.
    #[test]
    fn test_node_id_serialization() {
        assert_eq!(
            serde_json::to_value(NodeId::Coordinator).expect("serialize coordinator"),
            serde_json::json!("coordinator"),
        );
        assert_eq!(
            serde_json::to_value(NodeId::Participant(2)).expect("serialize participant"),
            serde_json::json!({ "participant": 2 }),
        );
    }
}
