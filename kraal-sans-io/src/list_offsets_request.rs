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

/// Look up offsets by timestamp, with the [`crate::ListOffset`] sentinels
/// selecting the log start or high watermark offset
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ListOffsetsRequest {
    pub replica_id: i32,
    pub topics: Option<Vec<ListOffsetsTopic>>,
}

impl ListOffsetsRequest {
    pub fn replica_id(self, replica_id: i32) -> Self {
        Self { replica_id, ..self }
    }

    pub fn topics(self, topics: Option<Vec<ListOffsetsTopic>>) -> Self {
        Self { topics, ..self }
    }
}

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ListOffsetsTopic {
    pub name: String,
    pub partitions: Option<Vec<ListOffsetsPartition>>,
}

impl ListOffsetsTopic {
    pub fn name(self, name: String) -> Self {
        Self { name, ..self }
    }

    pub fn partitions(self, partitions: Option<Vec<ListOffsetsPartition>>) -> Self {
        Self { partitions, ..self }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ListOffsetsPartition {
    pub partition_index: i32,
    pub timestamp: i64,
    pub max_num_offsets: Option<i32>,
}

impl ListOffsetsPartition {
    pub fn partition_index(self, partition_index: i32) -> Self {
        Self {
            partition_index,
            ..self
        }
    }

    pub fn timestamp(self, timestamp: i64) -> Self {
        Self { timestamp, ..self }
    }

    pub fn max_num_offsets(self, max_num_offsets: Option<i32>) -> Self {
        Self {
            max_num_offsets,
            ..self
        }
    }
}
