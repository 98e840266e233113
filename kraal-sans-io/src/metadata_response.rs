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

/// The topic to partition map, in the broker's natural order
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct MetadataResponse {
    pub topics: Option<Vec<MetadataResponseTopic>>,
}

impl MetadataResponse {
    pub fn topics(self, topics: Option<Vec<MetadataResponseTopic>>) -> Self {
        Self { topics }
    }
}

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct MetadataResponseTopic {
    pub error_code: i16,
    pub name: String,
    pub partitions: Option<Vec<MetadataResponsePartition>>,
}

impl MetadataResponseTopic {
    pub fn error_code(self, error_code: i16) -> Self {
        Self { error_code, ..self }
    }

    pub fn name(self, name: String) -> Self {
        Self { name, ..self }
    }

    pub fn partitions(self, partitions: Option<Vec<MetadataResponsePartition>>) -> Self {
        Self { partitions, ..self }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct MetadataResponsePartition {
    pub error_code: i16,
    pub partition_index: i32,
    pub leader_id: i32,
}

impl MetadataResponsePartition {
    pub fn error_code(self, error_code: i16) -> Self {
        Self { error_code, ..self }
    }

    pub fn partition_index(self, partition_index: i32) -> Self {
        Self {
            partition_index,
            ..self
        }
    }

    pub fn leader_id(self, leader_id: i32) -> Self {
        Self { leader_id, ..self }
    }
}
