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

use std::{sync::LazyLock, time::Duration};

use kraal_sans_io::{
    ErrorCode, FetchRequest, MessageSet,
    fetch_request::{FetchPartition, FetchTopic},
    fetch_response::PartitionData,
};
use opentelemetry::metrics::Counter;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    Error, METER, Result, Topition, TopitionOffset, classify::Disposition, cluster::Cluster,
    config::ConsumerConfig, group::GenerationState, offset, offset::Commit,
    sleep_unless_cancelled,
};

static FETCHES: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("kraal_consumer_fetches")
        .with_description("fetch requests answered by the broker")
        .build()
});

/// A lazy sequence of message sets for one assigned partition, each paired
/// with the action committing its first offset. Ends once the generation has
/// closed and the already produced elements are drained.
#[derive(Debug)]
pub struct PartitionStream<C> {
    topition: Topition,
    rx: mpsc::Receiver<Result<(MessageSet, Commit<C>)>>,
}

impl<C> PartitionStream<C>
where
    C: Cluster,
{
    pub fn topition(&self) -> &Topition {
        &self.topition
    }

    /// The next message set, produced on demand. An `Err` element is fatal
    /// (the broker broke protocol); every recoverable condition is absorbed
    /// into generation close, which simply ends the sequence.
    pub async fn next(&mut self) -> Option<Result<(MessageSet, Commit<C>)>> {
        self.rx.recv().await
    }
}

/// Starts the fetch loop for one assigned partition
pub(crate) fn stream<C>(
    cluster: C,
    config: &ConsumerConfig,
    state: &GenerationState,
    assignment: &TopitionOffset,
) -> PartitionStream<C>
where
    C: Cluster,
{
    let (tx, rx) = mpsc::channel(1);

    let worker = Worker {
        cluster,
        config: config.clone(),
        topition: assignment.topition().clone(),
        generation_id: state.generation_id(),
        member_id: state.member_id().to_owned(),
        closed: state.closed(),
    };

    _ = tokio::spawn(worker.run(assignment.offset(), tx));

    PartitionStream {
        topition: assignment.topition().clone(),
        rx,
    }
}

#[derive(Clone, Debug)]
struct Worker<C> {
    cluster: C,
    config: ConsumerConfig,
    topition: Topition,
    generation_id: i32,
    member_id: String,
    closed: CancellationToken,
}

impl<C> Worker<C>
where
    C: Cluster,
{
    async fn run(self, mut offset: i64, tx: mpsc::Sender<Result<(MessageSet, Commit<C>)>>) {
        loop {
            if self.closed.is_cancelled() {
                break;
            }

            let response = match self.cluster.fetch(self.request(offset)).await {
                Ok(response) => response,

                Err(error) => {
                    warn!(%self.topition, offset, %error, "fetch transport failure");
                    self.closed.cancel();
                    break;
                }
            };

            FETCHES.add(1, &[]);

            let Some(partition) = partition_data(response, &self.topition) else {
                // the broker answered without our partition
                _ = tx.send(Err(Error::MissingTopics("fetch"))).await;
                self.closed.cancel();
                break;
            };

            let error_code = match ErrorCode::try_from(partition.error_code) {
                Ok(error_code) => error_code,

                Err(error) => {
                    warn!(%self.topition, offset, %error, "fetch closing generation");
                    self.closed.cancel();
                    break;
                }
            };

            match Disposition::from(error_code) {
                Disposition::Proceed => {}

                Disposition::RetryFetch => {
                    match offset::list_offset(
                        &self.cluster,
                        self.config.initial_fetch_time,
                        &self.topition,
                    )
                    .await
                    {
                        Ok(recovered) => {
                            info!(%self.topition, offset, recovered, "offset out of range");

                            if !sleep_unless_cancelled(
                                Duration::from_millis(self.config.offset_reset_backoff_ms),
                                &self.closed,
                            )
                            .await
                            {
                                break;
                            }

                            offset = recovered;
                            continue;
                        }

                        Err(error) => {
                            warn!(%self.topition, offset, %error, "offset recovery failed");
                            self.closed.cancel();
                            break;
                        }
                    }
                }

                disposition => {
                    info!(%self.topition, offset, %error_code, ?disposition, "fetch closing generation");
                    self.closed.cancel();
                    break;
                }
            }

            let records = partition.records.unwrap_or_default();

            let Some(next_offset) = records.next_offset(partition.high_watermark) else {
                debug!(%self.topition, offset, "reached end of stream");

                if !sleep_unless_cancelled(
                    Duration::from_millis(self.config.empty_fetch_backoff_ms),
                    &self.closed,
                )
                .await
                {
                    break;
                }

                continue;
            };

            let commit = Commit::new(
                self.cluster.clone(),
                &self.config,
                self.generation_id,
                self.member_id.clone(),
                self.closed.clone(),
                self.topition.clone(),
                offset,
            );

            if tx.send(Ok((records, commit))).await.is_err() {
                // nobody is listening to this partition any more
                break;
            }

            offset = next_offset;
        }

        debug!(%self.topition, self.generation_id, "fetch loop done");
    }

    fn request(&self, offset: i64) -> FetchRequest {
        FetchRequest::default()
            .replica_id(-1)
            .max_wait_ms(self.config.fetch_max_wait_ms)
            .min_bytes(self.config.fetch_min_bytes)
            .topics(Some(vec![
                FetchTopic::default().topic(self.topition.topic().into()).partitions(Some(vec![
                    FetchPartition::default()
                        .partition(self.topition.partition())
                        .fetch_offset(offset)
                        .partition_max_bytes(self.config.fetch_buffer_bytes),
                ])),
            ]))
    }
}

fn partition_data(
    response: kraal_sans_io::FetchResponse,
    topition: &Topition,
) -> Option<PartitionData> {
    response
        .topics?
        .into_iter()
        .find(|topic| topic.topic == topition.topic())
        .and_then(|topic| {
            topic
                .partitions?
                .into_iter()
                .find(|partition| partition.partition_index == topition.partition())
        })
}
