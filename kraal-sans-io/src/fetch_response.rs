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

use crate::record::MessageSet;

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct FetchResponse {
    pub topics: Option<Vec<FetchableTopicResponse>>,
}

impl FetchResponse {
    pub fn topics(self, topics: Option<Vec<FetchableTopicResponse>>) -> Self {
        Self { topics }
    }
}

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct FetchableTopicResponse {
    pub topic: String,
    pub partitions: Option<Vec<PartitionData>>,
}

impl FetchableTopicResponse {
    pub fn topic(self, topic: String) -> Self {
        Self { topic, ..self }
    }

    pub fn partitions(self, partitions: Option<Vec<PartitionData>>) -> Self {
        Self { partitions, ..self }
    }
}

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PartitionData {
    pub partition_index: i32,
    pub error_code: i16,
    pub high_watermark: i64,
    pub records: Option<MessageSet>,
}

impl PartitionData {
    pub fn partition_index(self, partition_index: i32) -> Self {
        Self {
            partition_index,
            ..self
        }
    }

    pub fn error_code(self, error_code: i16) -> Self {
        Self { error_code, ..self }
    }

    pub fn high_watermark(self, high_watermark: i64) -> Self {
        Self {
            high_watermark,
            ..self
        }
    }

    pub fn records(self, records: Option<MessageSet>) -> Self {
        Self { records, ..self }
    }
}
