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

/// The membership outcome: the generation, the member id issued by the
/// coordinator, the elected leader, and (leader only) every member's
/// subscription metadata
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct JoinGroupResponse {
    pub error_code: i16,
    pub generation_id: i32,
    pub protocol_name: String,
    pub leader: String,
    pub member_id: String,
    pub members: Option<Vec<JoinGroupResponseMember>>,
}

impl JoinGroupResponse {
    pub fn error_code(self, error_code: i16) -> Self {
        Self { error_code, ..self }
    }

    pub fn generation_id(self, generation_id: i32) -> Self {
        Self {
            generation_id,
            ..self
        }
    }

    pub fn protocol_name(self, protocol_name: String) -> Self {
        Self {
            protocol_name,
            ..self
        }
    }

    pub fn leader(self, leader: String) -> Self {
        Self { leader, ..self }
    }

    pub fn member_id(self, member_id: String) -> Self {
        Self { member_id, ..self }
    }

    pub fn members(self, members: Option<Vec<JoinGroupResponseMember>>) -> Self {
        Self { members, ..self }
    }
}

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct JoinGroupResponseMember {
    pub member_id: String,
    pub metadata: Bytes,
}

impl JoinGroupResponseMember {
    pub fn member_id(self, member_id: String) -> Self {
        Self { member_id, ..self }
    }

    pub fn metadata(self, metadata: Bytes) -> Self {
        Self { metadata, ..self }
    }
}
