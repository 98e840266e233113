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

use std::sync::LazyLock;

use kraal_sans_io::{
    ErrorCode, ListOffset, ListOffsetsRequest, OffsetCommitRequest, OffsetFetchRequest,
    list_offsets_request::{ListOffsetsPartition, ListOffsetsTopic},
    offset_commit_request::{OffsetCommitRequestPartition, OffsetCommitRequestTopic},
    offset_fetch_request::OffsetFetchRequestTopic,
};
use opentelemetry::metrics::Counter;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    Error, METER, Result, Topition, TopitionOffset, classify::Disposition, cluster::Cluster,
    config::ConsumerConfig,
};

static OFFSET_COMMITS: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("kraal_consumer_offset_commits")
        .with_description("offsets committed to the group coordinator")
        .build()
});

/// The initial fetch offset for a partition: the group's committed offset if
/// there is one, otherwise a time based lookup with the configured initial
/// fetch time. At most two round trips.
pub(crate) async fn resolve<C>(
    cluster: &C,
    config: &ConsumerConfig,
    topition: Topition,
) -> Result<TopitionOffset>
where
    C: Cluster,
{
    let response = cluster
        .offset_fetch(
            OffsetFetchRequest::default()
                .group_id(config.group_id.clone())
                .topics(Some(vec![
                    OffsetFetchRequestTopic::default()
                        .name(topition.topic().into())
                        .partition_indexes(Some(vec![topition.partition()])),
                ])),
        )
        .await?;

    let partition = response
        .topics
        .as_deref()
        .unwrap_or_default()
        .iter()
        .find(|topic| topic.name == topition.topic())
        .and_then(|topic| {
            topic
                .partitions
                .as_deref()
                .unwrap_or_default()
                .iter()
                .find(|partition| partition.partition_index == topition.partition())
                .cloned()
        })
        .ok_or(Error::MissingTopics("offset_fetch"))?;

    let error_code = ErrorCode::try_from(partition.error_code)?;

    if error_code != ErrorCode::None {
        return Err(Error::Api(error_code));
    }

    if partition.committed_offset >= 0 {
        debug!(%topition, committed_offset = partition.committed_offset);
        return Ok(TopitionOffset::new(topition, partition.committed_offset));
    }

    let offset = list_offset(cluster, config.initial_fetch_time, &topition).await?;
    debug!(%topition, offset, time = ?config.initial_fetch_time);

    Ok(TopitionOffset::new(topition, offset))
}

/// A single offset looked up by time, `max_num_offsets` of one
pub(crate) async fn list_offset<C>(
    cluster: &C,
    time: ListOffset,
    topition: &Topition,
) -> Result<i64>
where
    C: Cluster,
{
    let response = cluster
        .list_offsets(
            ListOffsetsRequest::default().replica_id(-1).topics(Some(vec![
                ListOffsetsTopic::default()
                    .name(topition.topic().into())
                    .partitions(Some(vec![
                        ListOffsetsPartition::default()
                            .partition_index(topition.partition())
                            .timestamp(time.into())
                            .max_num_offsets(Some(1)),
                    ])),
            ])),
        )
        .await?;

    let partition = response
        .topics
        .as_deref()
        .unwrap_or_default()
        .iter()
        .find(|topic| topic.name == topition.topic())
        .and_then(|topic| {
            topic
                .partitions
                .as_deref()
                .unwrap_or_default()
                .iter()
                .find(|partition| partition.partition_index == topition.partition())
                .cloned()
        })
        .ok_or(Error::MissingTopics("list_offsets"))?;

    let error_code = ErrorCode::try_from(partition.error_code)?;

    if error_code != ErrorCode::None {
        return Err(Error::Api(error_code));
    }

    partition
        .old_style_offsets
        .as_deref()
        .unwrap_or_default()
        .first()
        .copied()
        .ok_or(Error::MissingTopics("list_offsets"))
}

/// Records a consumer's progress for one partition at the group coordinator.
/// Bound to the generation and member that fetched the message set, and to
/// the first offset of that set: the checkpoint the consumer has begun, not
/// necessarily finished.
#[derive(Clone, Debug)]
pub struct Commit<C> {
    cluster: C,
    group_id: String,
    topition: Topition,
    offset: i64,
    generation_id: i32,
    member_id: String,
    retention_time_ms: i64,
    closed: CancellationToken,
}

impl<C> Commit<C>
where
    C: Cluster,
{
    pub(crate) fn new(
        cluster: C,
        config: &ConsumerConfig,
        generation_id: i32,
        member_id: String,
        closed: CancellationToken,
        topition: Topition,
        offset: i64,
    ) -> Self {
        Self {
            cluster,
            group_id: config.group_id.clone(),
            topition,
            offset,
            generation_id,
            member_id,
            retention_time_ms: config.offset_retention_ms,
            closed,
        }
    }

    pub fn topition(&self) -> &Topition {
        &self.topition
    }

    /// The offset this action will commit: the first offset of the message
    /// set it was emitted with
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Commit the offset. A no-op once the generation has closed; rebalance
    /// signals close the generation and resolve to unit, so repeated commits
    /// are always safe.
    pub async fn commit(&self) -> Result<()> {
        if self.closed.is_cancelled() {
            debug!(%self.topition, self.offset, "commit after close suppressed");
            return Ok(());
        }

        let response = match self
            .cluster
            .offset_commit(
                OffsetCommitRequest::default()
                    .group_id(self.group_id.clone())
                    .generation_id_or_member_epoch(self.generation_id)
                    .member_id(self.member_id.clone())
                    .retention_time_ms(self.retention_time_ms)
                    .topics(Some(vec![
                        OffsetCommitRequestTopic::default()
                            .name(self.topition.topic().into())
                            .partitions(Some(vec![
                                OffsetCommitRequestPartition::default()
                                    .partition_index(self.topition.partition())
                                    .committed_offset(self.offset)
                                    .committed_metadata(Some("".into())),
                            ])),
                    ])),
            )
            .await
        {
            Ok(response) => response,

            Err(error) => {
                warn!(%self.topition, self.offset, %error, "offset commit transport failure");
                self.closed.cancel();
                return Ok(());
            }
        };

        let partition = response
            .topics
            .filter(|topics| !topics.is_empty())
            .ok_or(Error::MissingTopics("offset_commit"))?
            .iter()
            .find(|topic| topic.name == self.topition.topic())
            .and_then(|topic| {
                topic
                    .partitions
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .find(|partition| partition.partition_index == self.topition.partition())
                    .copied()
            })
            .ok_or(Error::MissingTopics("offset_commit"))?;

        let error_code = ErrorCode::try_from(partition.error_code)?;

        match Disposition::from(error_code) {
            Disposition::Proceed => {
                OFFSET_COMMITS.add(1, &[]);
                debug!(%self.topition, self.offset, "committed");
                Ok(())
            }

            Disposition::Rejoin | Disposition::ResetMember => {
                info!(%self.topition, %error_code, "offset commit closing generation");
                self.closed.cancel();
                Ok(())
            }

            _ => Err(Error::Api(error_code)),
        }
    }
}
