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

//! Kraal Consumer
//!
//! A Kafka consumer group client: join the group, take part in partition
//! assignment (leading it when elected), resolve initial offsets, heartbeat,
//! and expose a lazy per partition stream of message sets paired with a
//! commit action. On any rebalance signal the current generation closes and
//! the client rejoins, yielding the next generation.
//!
//! The connection to the cluster is behind the [`Cluster`] trait: this crate
//! never opens sockets or encodes frames, it drives the consumer group
//! protocol over whatever connection pool implements that trait.
//!
//! ```no_run
//! # use kraal_consumer::{Cluster, Consumer, ConsumerConfig, Error};
//! # async fn example(cluster: impl Cluster) -> Result<(), Error> {
//! let config = ConsumerConfig::new("ledger-audit").topics(vec!["ledger".into()]);
//!
//! Consumer::new(cluster, config)
//!     .consume_commit_after(|topition, records| async move {
//!         println!("{topition}: {} records", records.len());
//!         Ok(())
//!     })
//!     .await
//! # }
//! ```

use std::{
    fmt, io, result,
    sync::{Arc, LazyLock},
    time::Duration,
};

use kraal_sans_io::ErrorCode;
use opentelemetry::{InstrumentationScope, global, metrics::Meter};
use opentelemetry_semantic_conventions::SCHEMA_URL;
use thiserror::Error;
use tokio::{task::JoinError, time::sleep};
use tokio_util::sync::CancellationToken;

pub mod classify;
pub mod cluster;
pub mod config;
pub mod consumer;
pub mod fetch;
pub mod group;
pub mod heartbeat;
pub mod offset;

pub use classify::Disposition;
pub use cluster::Cluster;
pub use config::ConsumerConfig;
pub use consumer::{Consumer, Generation, Generations};
pub use fetch::PartitionStream;
pub use group::{Assignor, GenerationState, RangeAssignor};
pub use offset::Commit;

pub(crate) static METER: LazyLock<Meter> = LazyLock::new(|| {
    global::meter_with_scope(
        InstrumentationScope::builder(env!("CARGO_PKG_NAME"))
            .with_version(env!("CARGO_PKG_VERSION"))
            .with_schema_url(SCHEMA_URL)
            .build(),
    )
});

#[derive(Clone, Debug, Error)]
pub enum Error {
    Api(ErrorCode),
    EmptyAssignment {
        generation_id: i32,
        member_id: String,
    },
    Io(Arc<io::Error>),
    Join(Arc<JoinError>),
    Message(String),
    MissingTopics(&'static str),
    Protocol(#[from] kraal_sans_io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(msg) => f.write_str(msg),
            error => write!(f, "{error:?}"),
        }
    }
}

impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        Self::Io(Arc::new(value))
    }
}

impl From<JoinError> for Error {
    fn from(value: JoinError) -> Self {
        Self::Join(Arc::new(value))
    }
}

pub type Result<T, E = Error> = result::Result<T, E>;

/// A topic and partition
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Topition {
    topic: String,
    partition: i32,
}

impl Topition {
    pub fn new(topic: impl Into<String>, partition: i32) -> Self {
        let topic = topic.into();
        Self { topic, partition }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn partition(&self) -> i32 {
        self.partition
    }
}

impl fmt::Display for Topition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.topic, self.partition)
    }
}

/// A topic and partition with an offset
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TopitionOffset {
    topition: Topition,
    offset: i64,
}

impl TopitionOffset {
    pub fn new(topition: Topition, offset: i64) -> Self {
        Self { topition, offset }
    }

    pub fn topition(&self) -> &Topition {
        &self.topition
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }
}

/// Sleep that is cut short by the latch, returning whether the full duration
/// elapsed. The latch is not raced against an in flight request, only against
/// the timer.
pub(crate) async fn sleep_unless_cancelled(
    duration: Duration,
    cancellation: &CancellationToken,
) -> bool {
    tokio::select! {
        _ = sleep(duration) => true,
        _ = cancellation.cancelled() => false,
    }
}
