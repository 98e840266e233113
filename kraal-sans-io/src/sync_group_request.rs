// Copyright ⓒ 2024-2025 Peter Morgan <peter.james.morgan@gmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use bytes::Bytes;

/// Distribute (leader) or collect (member) the group assignment
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SyncGroupRequest {
    pub group_id: String,
    pub generation_id: i32,
    pub member_id: String,
    pub assignments: Option<Vec<SyncGroupRequestAssignment>>,
}

impl SyncGroupRequest {
    pub fn group_id(self, group_id: String) -> Self {
        Self { group_id, ..self }
    }

    pub fn generation_id(self, generation_id: i32) -> Self {
        Self {
            generation_id,
            ..self
        }
    }

    pub fn member_id(self, member_id: String) -> Self {
        Self { member_id, ..self }
    }

    pub fn assignments(self, assignments: Option<Vec<SyncGroupRequestAssignment>>) -> Self {
        Self {
            assignments,
            ..self
        }
    }
}

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SyncGroupRequestAssignment {
    pub member_id: String,
    pub assignment: Bytes,
}

impl SyncGroupRequestAssignment {
    pub fn member_id(self, member_id: String) -> Self {
        Self { member_id, ..self }
    }

    pub fn assignment(self, assignment: Bytes) -> Self {
        Self { assignment, ..self }
    }
}
