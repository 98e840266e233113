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

/// Become a member of a group, creating it if there are no active members
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct JoinGroupRequest {
    pub group_id: String,
    pub session_timeout_ms: i32,
    pub member_id: String,
    pub protocol_type: String,
    pub protocols: Option<Vec<JoinGroupRequestProtocol>>,
}

impl JoinGroupRequest {
    pub fn group_id(self, group_id: String) -> Self {
        Self { group_id, ..self }
    }

    pub fn session_timeout_ms(self, session_timeout_ms: i32) -> Self {
        Self {
            session_timeout_ms,
            ..self
        }
    }

    pub fn member_id(self, member_id: String) -> Self {
        Self { member_id, ..self }
    }

    pub fn protocol_type(self, protocol_type: String) -> Self {
        Self {
            protocol_type,
            ..self
        }
    }

    pub fn protocols(self, protocols: Option<Vec<JoinGroupRequestProtocol>>) -> Self {
        Self { protocols, ..self }
    }
}

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct JoinGroupRequestProtocol {
    pub name: String,
    pub metadata: Bytes,
}

impl JoinGroupRequestProtocol {
    pub fn name(self, name: String) -> Self {
        Self { name, ..self }
    }

    pub fn metadata(self, metadata: Bytes) -> Self {
        Self { metadata, ..self }
    }
}
