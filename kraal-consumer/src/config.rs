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

use std::time::Duration;

use kraal_sans_io::ListOffset;

/// Consumer group configuration. The heartbeat interval is the session
/// timeout divided by the heartbeat frequency.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ConsumerConfig {
    pub group_id: String,
    pub topics: Vec<String>,
    pub session_timeout_ms: i32,
    pub heartbeat_frequency: i32,
    pub fetch_min_bytes: i32,
    pub fetch_max_wait_ms: i32,
    pub fetch_buffer_bytes: i32,
    pub offset_retention_ms: i64,
    pub initial_fetch_time: ListOffset,
    pub empty_fetch_backoff_ms: u64,
    pub offset_reset_backoff_ms: u64,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            group_id: String::new(),
            topics: Vec::new(),
            session_timeout_ms: 20_000,
            heartbeat_frequency: 10,
            fetch_min_bytes: 0,
            fetch_max_wait_ms: 0,
            fetch_buffer_bytes: 1_000_000,
            offset_retention_ms: -1,
            initial_fetch_time: ListOffset::Earliest,
            empty_fetch_backoff_ms: 10_000,
            offset_reset_backoff_ms: 5_000,
        }
    }
}

impl ConsumerConfig {
    pub fn new(group_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            ..Default::default()
        }
    }

    pub fn topics(self, topics: Vec<String>) -> Self {
        Self { topics, ..self }
    }

    pub fn session_timeout_ms(self, session_timeout_ms: i32) -> Self {
        Self {
            session_timeout_ms,
            ..self
        }
    }

    /// Heartbeats per session timeout, must be positive
    pub fn heartbeat_frequency(self, heartbeat_frequency: i32) -> Self {
        Self {
            heartbeat_frequency,
            ..self
        }
    }

    pub fn fetch_min_bytes(self, fetch_min_bytes: i32) -> Self {
        Self {
            fetch_min_bytes,
            ..self
        }
    }

    pub fn fetch_max_wait_ms(self, fetch_max_wait_ms: i32) -> Self {
        Self {
            fetch_max_wait_ms,
            ..self
        }
    }

    /// Fetch buffer per assigned partition
    pub fn fetch_buffer_bytes(self, fetch_buffer_bytes: i32) -> Self {
        Self {
            fetch_buffer_bytes,
            ..self
        }
    }

    /// Committed offset retention, -1 delegating to the broker default
    pub fn offset_retention_ms(self, offset_retention_ms: i64) -> Self {
        Self {
            offset_retention_ms,
            ..self
        }
    }

    /// Where to start when the group has no committed offset for a partition
    pub fn initial_fetch_time(self, initial_fetch_time: ListOffset) -> Self {
        Self {
            initial_fetch_time,
            ..self
        }
    }

    pub fn empty_fetch_backoff_ms(self, empty_fetch_backoff_ms: u64) -> Self {
        Self {
            empty_fetch_backoff_ms,
            ..self
        }
    }

    pub fn offset_reset_backoff_ms(self, offset_reset_backoff_ms: u64) -> Self {
        Self {
            offset_reset_backoff_ms,
            ..self
        }
    }

    pub fn session_timeout(&self) -> Duration {
        Duration::from_millis(self.session_timeout_ms.max(0) as u64)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis((self.session_timeout_ms / self.heartbeat_frequency).max(0) as u64)
    }
}
