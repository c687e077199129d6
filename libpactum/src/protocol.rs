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

//! Contains Protocol, the commit-protocol variant run by a coordinator.

use std::fmt::{Display, Formatter, Result as FormatResult};

use serde::{Deserialize, Serialize};

/// The atomic-commit protocol variant a coordinator orchestrates.
///
/// The variant is fixed at coordinator construction. It selects how many
/// phases a run executes and which predecessor states permit a participant
/// commit or abort.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    TwoPhase,
    ThreePhase,
}

impl Display for Protocol {
    fn fmt(&self, f: &mut Formatter) -> FormatResult {
        match self {
            Protocol::TwoPhase => write!(f, "2PC"),
            Protocol::ThreePhase => write!(f, "3PC"),
        }
    }
}
