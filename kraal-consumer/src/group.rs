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

use std::{collections::BTreeMap, fmt::Debug, sync::LazyLock};

use kraal_sans_io::{
    ErrorCode, JoinGroupRequest, SyncGroupRequest,
    join_group_request::JoinGroupRequestProtocol,
    protocol::{ConsumerProtocolAssignment, ConsumerProtocolSubscription, TopicPartitions},
    sync_group_request::SyncGroupRequestAssignment,
};
use opentelemetry::metrics::Counter;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    Error, METER, Result, Topition, TopitionOffset, classify::Disposition, cluster::Cluster,
    config::ConsumerConfig, heartbeat, offset, sleep_unless_cancelled,
};

pub const PROTOCOL_TYPE: &str = "consumer";
pub const RANGE: &str = "range";

static JOINS: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("kraal_consumer_joins")
        .with_description("group join attempts")
        .build()
});

/// Maps members to the topic partitions they will consume. Members arrive in
/// join response order, topic partitions in metadata order.
pub trait Assignor: Debug + Send + Sync {
    /// The group protocol name carried by JoinGroup
    fn name(&self) -> &'static str;

    fn assign(&self, members: &[String], topitions: &[Topition]) -> Vec<(String, Vec<Topition>)>;
}

/// Splits the partition list into contiguous chunks of ⌈partitions/members⌉,
/// leaving any excess member with an empty assignment.
#[derive(Clone, Copy, Debug, Default)]
pub struct RangeAssignor;

impl Assignor for RangeAssignor {
    fn name(&self) -> &'static str {
        RANGE
    }

    fn assign(&self, members: &[String], topitions: &[Topition]) -> Vec<(String, Vec<Topition>)> {
        let size = topitions.len().div_ceil(members.len().max(1)).max(1);
        let mut chunks = topitions.chunks(size);

        members
            .iter()
            .map(|member_id| {
                (
                    member_id.clone(),
                    chunks.next().map(<[Topition]>::to_vec).unwrap_or_default(),
                )
            })
            .collect()
    }
}

/// One membership epoch in the group, owned by the generation engine. The
/// heartbeat loop, partition streams and commit actions observe `closed`
/// through child clones of the token, never the state itself.
#[derive(Debug)]
pub struct GenerationState {
    generation_id: i32,
    member_id: String,
    leader: String,
    assignments: Vec<TopitionOffset>,
    closed: CancellationToken,
}

impl GenerationState {
    pub fn generation_id(&self) -> i32 {
        self.generation_id
    }

    pub fn member_id(&self) -> &str {
        &self.member_id
    }

    pub fn leader(&self) -> &str {
        &self.leader
    }

    pub fn is_leader(&self) -> bool {
        self.member_id == self.leader
    }

    pub fn assignments(&self) -> &[TopitionOffset] {
        &self.assignments
    }

    /// A token observing (and able to trip) the closed latch
    pub fn closed(&self) -> CancellationToken {
        self.closed.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }
}

impl Drop for GenerationState {
    fn drop(&mut self) {
        self.closed.cancel();
    }
}

/// Joins the group until a generation forms: discover the coordinator, join
/// (performing the range assignment when elected leader), sync, resolve each
/// assigned partition's initial offset and start the heartbeat. Returns
/// `None` when the connection is cancelled before a generation forms.
pub(crate) async fn join<C>(
    cluster: &C,
    config: &ConsumerConfig,
    assignor: &dyn Assignor,
    prev_member_id: Option<String>,
) -> Result<Option<GenerationState>>
where
    C: Cluster,
{
    let cancellation = cluster.cancellation();

    if prev_member_id.is_some() {
        // the previous generation may have died with the coordinator
        cluster.reconnect().await?;
    }

    let coordinator = cluster.find_coordinator(&config.group_id).await?;
    debug!(group = config.group_id, ?coordinator);

    let mut member_id = prev_member_id;

    loop {
        if cancellation.is_cancelled() {
            return Ok(None);
        }

        JOINS.add(1, &[]);

        let join = cluster
            .join_group(
                JoinGroupRequest::default()
                    .group_id(config.group_id.clone())
                    .session_timeout_ms(config.session_timeout_ms)
                    .member_id(member_id.clone().unwrap_or_default())
                    .protocol_type(PROTOCOL_TYPE.into())
                    .protocols(Some(vec![
                        JoinGroupRequestProtocol::default()
                            .name(assignor.name().into())
                            .metadata(
                                ConsumerProtocolSubscription::default()
                                    .topics(config.topics.clone())
                                    .into_bytes(),
                            ),
                    ])),
            )
            .await?;

        let error_code = ErrorCode::try_from(join.error_code)?;

        match Disposition::from(error_code) {
            Disposition::Proceed => {}

            Disposition::ResetMember => {
                info!(group = config.group_id, %error_code, "rejoining as a new member");

                if !sleep_unless_cancelled(config.session_timeout(), &cancellation).await {
                    return Ok(None);
                }

                member_id = None;
                continue;
            }

            disposition => {
                warn!(group = config.group_id, %error_code, ?disposition, "join rejected");
                continue;
            }
        }

        // the coordinator issued (or confirmed) our member id
        member_id = Some(join.member_id.clone());

        let members = join
            .members
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|member| member.member_id.clone())
            .collect::<Vec<_>>();

        let assignments = if members.is_empty() {
            // a follower syncs with an empty assignment
            Vec::new()
        } else {
            let topitions = topic_partitions(cluster, &config.topics).await?;

            info!(
                group = config.group_id,
                members = members.len(),
                partitions = topitions.len(),
                "elected leader"
            );

            leader_assignments(assignor, &members, &topitions)
        };

        let sync = cluster
            .sync_group(
                SyncGroupRequest::default()
                    .group_id(config.group_id.clone())
                    .generation_id(join.generation_id)
                    .member_id(join.member_id.clone())
                    .assignments(Some(assignments)),
            )
            .await?;

        let error_code = ErrorCode::try_from(sync.error_code)?;

        match Disposition::from(error_code) {
            Disposition::Proceed => {}

            Disposition::ResetMember => {
                info!(group = config.group_id, %error_code, "rejoining as a new member");

                if !sleep_unless_cancelled(config.session_timeout(), &cancellation).await {
                    return Ok(None);
                }

                member_id = None;
                continue;
            }

            disposition => {
                warn!(group = config.group_id, %error_code, ?disposition, "sync rejected");
                continue;
            }
        }

        let assignment = ConsumerProtocolAssignment::from_bytes(sync.assignment)?;

        let topitions = assignment
            .assigned_partitions
            .iter()
            .flat_map(|assigned| {
                assigned
                    .partitions
                    .iter()
                    .map(|partition| Topition::new(&assigned.topic[..], *partition))
            })
            .collect::<Vec<_>>();

        if topitions.is_empty() {
            return Err(Error::EmptyAssignment {
                generation_id: join.generation_id,
                member_id: join.member_id,
            });
        }

        let resolved = futures::future::try_join_all(
            topitions
                .iter()
                .map(|topition| offset::resolve(cluster, config, topition.clone())),
        )
        .await;

        let assignments = match resolved {
            Ok(assignments) => assignments,

            Err(Error::Api(error_code)) => match error_code {
                // the reply invalidated our membership, start over as a
                // new member
                ErrorCode::UnknownMemberId | ErrorCode::IllegalGeneration => {
                    info!(group = config.group_id, %error_code, "rejoining as a new member");

                    if !sleep_unless_cancelled(config.session_timeout(), &cancellation).await {
                        return Ok(None);
                    }

                    member_id = None;
                    continue;
                }

                error_code => match Disposition::from(error_code) {
                    Disposition::Rejoin => {
                        warn!(group = config.group_id, %error_code, "offsets rejected");
                        continue;
                    }

                    _ => return Err(Error::Api(error_code)),
                },
            },

            Err(error) => return Err(error),
        };

        let state = GenerationState {
            generation_id: join.generation_id,
            member_id: join.member_id,
            leader: join.leader,
            assignments,
            closed: cancellation.child_token(),
        };

        info!(
            group = config.group_id,
            generation_id = state.generation_id,
            member_id = state.member_id,
            leader = state.is_leader(),
            partitions = state.assignments.len(),
            "joined"
        );

        heartbeat::start(cluster.clone(), config, &state);

        return Ok(Some(state));
    }
}

async fn topic_partitions<C>(cluster: &C, topics: &[String]) -> Result<Vec<Topition>>
where
    C: Cluster,
{
    let metadata = cluster.metadata(topics).await?;
    let mut topitions = Vec::new();

    for topic in metadata.topics.as_deref().unwrap_or_default() {
        let error_code = ErrorCode::try_from(topic.error_code)?;

        if error_code != ErrorCode::None {
            return Err(Error::Api(error_code));
        }

        for partition in topic.partitions.as_deref().unwrap_or_default() {
            topitions.push(Topition::new(&topic.name[..], partition.partition_index));
        }
    }

    Ok(topitions)
}

fn leader_assignments(
    assignor: &dyn Assignor,
    members: &[String],
    topitions: &[Topition],
) -> Vec<SyncGroupRequestAssignment> {
    assignor
        .assign(members, topitions)
        .into_iter()
        .map(|(member_id, topitions)| {
            let mut by_topic = BTreeMap::<String, Vec<i32>>::new();

            for topition in &topitions {
                by_topic
                    .entry(topition.topic().to_owned())
                    .or_default()
                    .push(topition.partition());
            }

            SyncGroupRequestAssignment::default().member_id(member_id).assignment(
                ConsumerProtocolAssignment::default()
                    .assigned_partitions(
                        by_topic
                            .into_iter()
                            .map(|(topic, partitions)| TopicPartitions { topic, partitions })
                            .collect(),
                    )
                    .into_bytes(),
            )
        })
        .collect()
}
