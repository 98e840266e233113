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

use std::{
    future::Future,
    sync::{Arc, LazyLock},
};

use kraal_sans_io::MessageSet;
use opentelemetry::metrics::Counter;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    Error, METER, Result, Topition,
    cluster::Cluster,
    config::ConsumerConfig,
    fetch::{self, PartitionStream},
    group::{self, Assignor, GenerationState, RangeAssignor},
    offset::Commit,
};

static GENERATIONS: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("kraal_consumer_generations")
        .with_description("generations formed")
        .build()
});

/// A consumer group member. Nothing happens until the generation sequence is
/// driven, either by hand through [`Consumer::generations`] or by one of the
/// consume operations.
#[derive(Clone, Debug)]
pub struct Consumer<C> {
    cluster: C,
    config: ConsumerConfig,
    assignor: Arc<dyn Assignor>,
}

impl<C> Consumer<C>
where
    C: Cluster,
{
    pub fn new(cluster: C, config: ConsumerConfig) -> Self {
        Self {
            cluster,
            config,
            assignor: Arc::new(RangeAssignor),
        }
    }

    /// Replace the range assignment strategy used when elected leader
    pub fn assignor(self, assignor: Arc<dyn Assignor>) -> Self {
        Self { assignor, ..self }
    }

    /// The lazy sequence of generations, infinite until the connection's
    /// cancellation token trips
    pub fn generations(self) -> Generations<C> {
        Generations {
            cluster: self.cluster,
            config: self.config,
            assignor: self.assignor,
            state: None,
            member_id: None,
        }
    }

    /// Run the handler over every message set of every partition of every
    /// generation: partitions in parallel, message sets of one partition in
    /// order. The handler decides when (and whether) to invoke the supplied
    /// commit action. Returns on connection cancellation, or with the first
    /// fatal error.
    pub async fn consume<F, Fut>(self, handler: F) -> Result<()>
    where
        F: Fn(Topition, MessageSet, Commit<C>) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let mut generations = self.generations();

        while let Some(generation) = generations.next().await {
            let generation = generation?;

            debug!(
                generation_id = generation.generation_id(),
                member_id = generation.member_id(),
                "consuming"
            );

            let closed = generation.closed();
            let mut tasks = JoinSet::new();

            for mut stream in generation.into_streams() {
                let handler = handler.clone();

                _ = tasks.spawn(async move {
                    while let Some(element) = stream.next().await {
                        let (records, commit) = element?;
                        handler(stream.topition().clone(), records, commit).await?;
                    }

                    Ok::<_, Error>(())
                });
            }

            let mut outcome = Ok(());

            while let Some(joined) = tasks.join_next().await {
                if let Err(error) = joined.map_err(Error::from).and_then(|result| result) {
                    // fatal: tear the generation down, surface once drained
                    closed.cancel();

                    if outcome.is_ok() {
                        outcome = Err(error);
                    }
                }
            }

            outcome?;
        }

        Ok(())
    }

    /// [`Consumer::consume`], committing after each message set the handler
    /// returns successfully from
    pub async fn consume_commit_after<F, Fut>(self, handler: F) -> Result<()>
    where
        F: Fn(Topition, MessageSet) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.consume(move |topition, records, commit| {
            let handler = handler.clone();

            async move {
                handler(topition, records).await?;
                commit.commit().await
            }
        })
        .await
    }
}

/// The lazy sequence of generations. The next generation's join only begins
/// once the previous generation's closed latch has tripped, and the member id
/// of the previous generation seeds the join.
#[derive(Debug)]
pub struct Generations<C> {
    cluster: C,
    config: ConsumerConfig,
    assignor: Arc<dyn Assignor>,
    state: Option<GenerationState>,
    member_id: Option<String>,
}

impl<C> Generations<C>
where
    C: Cluster,
{
    pub async fn next(&mut self) -> Option<Result<Generation<C>>> {
        if let Some(state) = self.state.take() {
            state.closed().cancelled().await;
        }

        if self.cluster.cancellation().is_cancelled() {
            debug!(group = self.config.group_id, "connection cancelled");
            return None;
        }

        match group::join(
            &self.cluster,
            &self.config,
            self.assignor.as_ref(),
            self.member_id.clone(),
        )
        .await
        {
            Ok(None) => None,

            Ok(Some(state)) => {
                GENERATIONS.add(1, &[]);
                self.member_id = Some(state.member_id().to_owned());

                let streams = state
                    .assignments()
                    .iter()
                    .map(|assignment| {
                        fetch::stream(self.cluster.clone(), &self.config, &state, assignment)
                    })
                    .collect();

                let generation = Generation {
                    generation_id: state.generation_id(),
                    member_id: state.member_id().to_owned(),
                    leader: state.leader().to_owned(),
                    closed: state.closed(),
                    streams,
                };

                self.state = Some(state);

                Some(Ok(generation))
            }

            Err(error) => Some(Err(error)),
        }
    }
}

/// One element of the generation sequence: the generation's identity and a
/// stream per assigned partition
#[derive(Debug)]
pub struct Generation<C> {
    generation_id: i32,
    member_id: String,
    leader: String,
    closed: CancellationToken,
    streams: Vec<PartitionStream<C>>,
}

impl<C> Generation<C>
where
    C: Cluster,
{
    pub fn generation_id(&self) -> i32 {
        self.generation_id
    }

    pub fn member_id(&self) -> &str {
        &self.member_id
    }

    pub fn leader(&self) -> &str {
        &self.leader
    }

    /// A token observing this generation's closed latch
    pub fn closed(&self) -> CancellationToken {
        self.closed.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    pub fn into_streams(self) -> Vec<PartitionStream<C>> {
        self.streams
    }
}
