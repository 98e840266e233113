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
pub struct ListOffsetsResponse {
    pub topics: Option<Vec<ListOffsetsTopicResponse>>,
}

impl ListOffsetsResponse {
    pub fn topics(self, topics: Option<Vec<ListOffsetsTopicResponse>>) -> Self {
        Self { topics }
    }
}

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ListOffsetsTopicResponse {
    pub name: String,
    pub partitions: Option<Vec<ListOffsetsPartitionResponse>>,
}

impl ListOffsetsTopicResponse {
    pub fn name(self, name: String) -> Self {
        Self { name, ..self }
    }

    pub fn partitions(self, partitions: Option<Vec<ListOffsetsPartitionResponse>>) -> Self {
        Self { partitions, ..self }
    }
}

/// Version 0 replies with an offset array, named old style in later protocol
/// versions
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ListOffsetsPartitionResponse {
    pub partition_index: i32,
    pub error_code: i16,
    pub old_style_offsets: Option<Vec<i64>>,
}

impl ListOffsetsPartitionResponse {
    pub fn partition_index(self, partition_index: i32) -> Self {
        Self {
            partition_index,
            ..self
        }
    }

    pub fn error_code(self, error_code: i16) -> Self {
        Self { error_code, ..self }
    }

    pub fn old_style_offsets(self, old_style_offsets: Option<Vec<i64>>) -> Self {
        Self {
            old_style_offsets,
            ..self
        }
    }
}
