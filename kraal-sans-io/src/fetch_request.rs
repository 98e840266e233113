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

/// Long poll for message sets, a replica id of -1 identifying an ordinary
/// consumer
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct FetchRequest {
    pub replica_id: i32,
    pub max_wait_ms: i32,
    pub min_bytes: i32,
    pub topics: Option<Vec<FetchTopic>>,
}

impl FetchRequest {
    pub fn replica_id(self, replica_id: i32) -> Self {
        Self { replica_id, ..self }
    }

    pub fn max_wait_ms(self, max_wait_ms: i32) -> Self {
        Self { max_wait_ms, ..self }
    }

    pub fn min_bytes(self, min_bytes: i32) -> Self {
        Self { min_bytes, ..self }
    }

    pub fn topics(self, topics: Option<Vec<FetchTopic>>) -> Self {
        Self { topics, ..self }
    }
}

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct FetchTopic {
    pub topic: String,
    pub partitions: Option<Vec<FetchPartition>>,
}

impl FetchTopic {
    pub fn topic(self, topic: String) -> Self {
        Self { topic, ..self }
    }

    pub fn partitions(self, partitions: Option<Vec<FetchPartition>>) -> Self {
        Self { partitions, ..self }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct FetchPartition {
    pub partition: i32,
    pub fetch_offset: i64,
    pub partition_max_bytes: i32,
}

impl FetchPartition {
    pub fn partition(self, partition: i32) -> Self {
        Self { partition, ..self }
    }

    pub fn fetch_offset(self, fetch_offset: i64) -> Self {
        Self {
            fetch_offset,
            ..self
        }
    }

    pub fn partition_max_bytes(self, partition_max_bytes: i32) -> Self {
        Self {
            partition_max_bytes,
            ..self
        }
    }
}
