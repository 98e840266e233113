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

/// Read the last committed offsets for a group
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct OffsetFetchRequest {
    pub group_id: String,
    pub topics: Option<Vec<OffsetFetchRequestTopic>>,
}

impl OffsetFetchRequest {
    pub fn group_id(self, group_id: String) -> Self {
        Self { group_id, ..self }
    }

    pub fn topics(self, topics: Option<Vec<OffsetFetchRequestTopic>>) -> Self {
        Self { topics, ..self }
    }
}

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct OffsetFetchRequestTopic {
    pub name: String,
    pub partition_indexes: Option<Vec<i32>>,
}

impl OffsetFetchRequestTopic {
    pub fn name(self, name: String) -> Self {
        Self { name, ..self }
    }

    pub fn partition_indexes(self, partition_indexes: Option<Vec<i32>>) -> Self {
        Self {
            partition_indexes,
            ..self
        }
    }
}
