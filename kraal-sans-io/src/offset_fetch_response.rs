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

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct OffsetFetchResponse {
    pub topics: Option<Vec<OffsetFetchResponseTopic>>,
}

impl OffsetFetchResponse {
    pub fn topics(self, topics: Option<Vec<OffsetFetchResponseTopic>>) -> Self {
        Self { topics }
    }
}

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct OffsetFetchResponseTopic {
    pub name: String,
    pub partitions: Option<Vec<OffsetFetchResponsePartition>>,
}

impl OffsetFetchResponseTopic {
    pub fn name(self, name: String) -> Self {
        Self { name, ..self }
    }

    pub fn partitions(self, partitions: Option<Vec<OffsetFetchResponsePartition>>) -> Self {
        Self { partitions, ..self }
    }
}

/// A committed offset of -1 means the group has no offset for the partition
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct OffsetFetchResponsePartition {
    pub partition_index: i32,
    pub committed_offset: i64,
    pub metadata: Option<String>,
    pub error_code: i16,
}

impl OffsetFetchResponsePartition {
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

    pub fn metadata(self, metadata: Option<String>) -> Self {
        Self { metadata, ..self }
    }

    pub fn error_code(self, error_code: i16) -> Self {
        Self { error_code, ..self }
    }
}
