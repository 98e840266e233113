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

//! The consumer protocol, embedded as opaque blobs within JoinGroup and
//! SyncGroup: a member's subscription travels as JoinGroup protocol metadata,
//! and the leader's decision comes back as the SyncGroup assignment. Both are
//! version prefixed, length delimited structures.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{Error, Result};

/// Version of the consumer protocol written by this client
pub const VERSION: i16 = 0;

/// The topics a member wants, sent as JoinGroup protocol metadata
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ConsumerProtocolSubscription {
    pub topics: Vec<String>,
    pub user_data: Option<Bytes>,
}

impl ConsumerProtocolSubscription {
    pub fn topics(self, topics: Vec<String>) -> Self {
        Self { topics, ..self }
    }

    pub fn user_data(self, user_data: Option<Bytes>) -> Self {
        Self { user_data, ..self }
    }

    pub fn into_bytes(self) -> Bytes {
        let mut b = BytesMut::new();
        b.put_i16(VERSION);
        b.put_i32(self.topics.len() as i32);

        for topic in &self.topics {
            put_string(&mut b, topic);
        }

        put_bytes(&mut b, self.user_data.as_ref());
        b.freeze()
    }

    pub fn from_bytes(mut b: Bytes) -> Result<Self> {
        let version = b.try_get_i16()?;

        if version < VERSION {
            return Err(Error::UnsupportedProtocolVersion(version));
        }

        let length = b.try_get_i32()?.max(0) as usize;
        let mut topics = Vec::with_capacity(length);

        for _ in 0..length {
            topics.push(get_string(&mut b)?);
        }

        let user_data = get_bytes(&mut b)?;

        Ok(Self { topics, user_data })
    }
}

/// The partitions granted to one member, grouped by topic, carried as the
/// SyncGroup assignment
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ConsumerProtocolAssignment {
    pub assigned_partitions: Vec<TopicPartitions>,
    pub user_data: Option<Bytes>,
}

impl ConsumerProtocolAssignment {
    pub fn assigned_partitions(self, assigned_partitions: Vec<TopicPartitions>) -> Self {
        Self {
            assigned_partitions,
            ..self
        }
    }

    pub fn user_data(self, user_data: Option<Bytes>) -> Self {
        Self { user_data, ..self }
    }

    pub fn into_bytes(self) -> Bytes {
        let mut b = BytesMut::new();
        b.put_i16(VERSION);
        b.put_i32(self.assigned_partitions.len() as i32);

        for assigned in &self.assigned_partitions {
            put_string(&mut b, &assigned.topic);
            b.put_i32(assigned.partitions.len() as i32);

            for partition in &assigned.partitions {
                b.put_i32(*partition);
            }
        }

        put_bytes(&mut b, self.user_data.as_ref());
        b.freeze()
    }

    pub fn from_bytes(mut b: Bytes) -> Result<Self> {
        let version = b.try_get_i16()?;

        if version < VERSION {
            return Err(Error::UnsupportedProtocolVersion(version));
        }

        let length = b.try_get_i32()?.max(0) as usize;
        let mut assigned_partitions = Vec::with_capacity(length);

        for _ in 0..length {
            let topic = get_string(&mut b)?;
            let partitions = b.try_get_i32()?.max(0) as usize;

            let mut topic_partitions = TopicPartitions::default().topic(topic);

            for _ in 0..partitions {
                topic_partitions.partitions.push(b.try_get_i32()?);
            }

            assigned_partitions.push(topic_partitions);
        }

        let user_data = get_bytes(&mut b)?;

        Ok(Self {
            assigned_partitions,
            user_data,
        })
    }
}

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TopicPartitions {
    pub topic: String,
    pub partitions: Vec<i32>,
}

impl TopicPartitions {
    pub fn topic(self, topic: String) -> Self {
        Self { topic, ..self }
    }

    pub fn partitions(self, partitions: Vec<i32>) -> Self {
        Self { partitions, ..self }
    }
}

fn put_string(b: &mut BytesMut, s: &str) {
    b.put_i16(s.len() as i16);
    b.put_slice(s.as_bytes());
}

fn put_bytes(b: &mut BytesMut, payload: Option<&Bytes>) {
    match payload {
        Some(payload) => {
            b.put_i32(payload.len() as i32);
            b.put_slice(payload);
        }

        None => b.put_i32(-1),
    }
}

fn get_string(b: &mut Bytes) -> Result<String> {
    let length = b.try_get_i16()?.max(0) as usize;

    if b.remaining() < length {
        return Err(Error::Message(format!(
            "string of {length} exceeds remaining {}",
            b.remaining()
        )));
    }

    String::from_utf8(b.split_to(length).to_vec()).map_err(Error::FromUtf8)
}

fn get_bytes(b: &mut Bytes) -> Result<Option<Bytes>> {
    let length = b.try_get_i32()?;

    if length < 0 {
        return Ok(None);
    }

    if b.remaining() < length as usize {
        return Err(Error::Message(format!(
            "bytes of {length} exceeds remaining {}",
            b.remaining()
        )));
    }

    Ok(Some(b.split_to(length as usize)))
}
