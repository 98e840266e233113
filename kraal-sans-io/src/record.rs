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

/// A single message within a message set
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Record {
    pub offset: i64,
    pub key: Option<Bytes>,
    pub value: Option<Bytes>,
}

impl Record {
    pub fn offset(self, offset: i64) -> Self {
        Self { offset, ..self }
    }

    pub fn key(self, key: Option<Bytes>) -> Self {
        Self { key, ..self }
    }

    pub fn value(self, value: Option<Bytes>) -> Self {
        Self { value, ..self }
    }
}

/// A batch of records returned by a fetch, in offset order
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct MessageSet {
    pub records: Vec<Record>,
}

impl MessageSet {
    pub fn records(self, records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn record(mut self, record: Record) -> Self {
        self.records.push(record);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn first_offset(&self) -> Option<i64> {
        self.records.first().map(|record| record.offset)
    }

    pub fn last_offset(&self) -> Option<i64> {
        self.records.last().map(|record| record.offset)
    }

    /// The offset to continue fetching from, `None` for an empty set. The
    /// high watermark can be ahead of the last message when trailing records
    /// were compacted away.
    pub fn next_offset(&self, high_watermark: i64) -> Option<i64> {
        self.last_offset()
            .map(|last_offset| high_watermark.max(last_offset + 1))
    }
}
