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

/// Record consumed offsets at the group coordinator, with a retention of -1
/// delegating to the broker default
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct OffsetCommitRequest {
    pub group_id: String,
    pub generation_id_or_member_epoch: i32,
    pub member_id: String,
    pub retention_time_ms: i64,
    pub topics: Option<Vec<OffsetCommitRequestTopic>>,
}

impl OffsetCommitRequest {
    pub fn group_id(self, group_id: String) -> Self {
        Self { group_id, ..self }
    }

    pub fn generation_id_or_member_epoch(self, generation_id_or_member_epoch: i32) -> Self {
        Self {
            generation_id_or_member_epoch,
            ..self
        }
    }

    pub fn member_id(self, member_id: String) -> Self {
        Self { member_id, ..self }
    }

    pub fn retention_time_ms(self, retention_time_ms: i64) -> Self {
        Self {
            retention_time_ms,
            ..self
        }
    }

    pub fn topics(self, topics: Option<Vec<OffsetCommitRequestTopic>>) -> Self {
        Self { topics, ..self }
    }
}

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct OffsetCommitRequestTopic {
    pub name: String,
    pub partitions: Option<Vec<OffsetCommitRequestPartition>>,
}

impl OffsetCommitRequestTopic {
    pub fn name(self, name: String) -> Self {
        Self { name, ..self }
    }

    pub fn partitions(self, partitions: Option<Vec<OffsetCommitRequestPartition>>) -> Self {
        Self { partitions, ..self }
    }
}

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct OffsetCommitRequestPartition {
    pub partition_index: i32,
    pub committed_offset: i64,
    pub committed_metadata: Option<String>,
}

impl OffsetCommitRequestPartition {
    pub fn partition_index(self, partition_index: i32) -> Self {
        Self {
            partition_index,
            ..self
        }
    }

    pub fn committed_offset(self, committed_offset: i64) -> Self {
        Self {
            committed_offset,
            ..self
        }
    }

    pub fn committed_metadata(self, committed_metadata: Option<String>) -> Self {
        Self {
            committed_metadata,
            ..self
        }
    }
}
