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
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use bytes::Bytes;
use kraal_consumer::{Cluster, ConsumerConfig, Result};
use kraal_sans_io::{
    ErrorCode, FetchRequest, FetchResponse, FindCoordinatorResponse, HeartbeatRequest,
    HeartbeatResponse, JoinGroupRequest, JoinGroupResponse, ListOffsetsRequest,
    ListOffsetsResponse, MessageSet, MetadataResponse, OffsetCommitRequest, OffsetCommitResponse,
    OffsetFetchRequest, OffsetFetchResponse, Record, SyncGroupRequest, SyncGroupResponse,
    fetch_response::{FetchableTopicResponse, PartitionData},
    join_group_response::JoinGroupResponseMember,
    list_offsets_response::{ListOffsetsPartitionResponse, ListOffsetsTopicResponse},
    metadata_response::{MetadataResponsePartition, MetadataResponseTopic},
    offset_commit_response::{OffsetCommitResponsePartition, OffsetCommitResponseTopic},
    offset_fetch_response::{OffsetFetchResponsePartition, OffsetFetchResponseTopic},
    protocol::{ConsumerProtocolAssignment, TopicPartitions},
};
use tokio_util::sync::CancellationToken;
use tracing::subscriber::DefaultGuard;

pub fn init_tracing() -> DefaultGuard {
    use tracing::Level;

    tracing::subscriber::set_default(
        tracing_subscriber::fmt()
            .with_level(true)
            .with_line_number(true)
            .with_max_level(Level::DEBUG)
            .with_test_writer()
            .finish(),
    )
}

/// A consumer configuration with timings scaled down for tests
pub fn config(group_id: &str, topics: &[&str]) -> ConsumerConfig {
    ConsumerConfig::new(group_id)
        .topics(topics.iter().map(|topic| (*topic).to_owned()).collect())
        .session_timeout_ms(200)
        .heartbeat_frequency(2)
        .empty_fetch_backoff_ms(20)
        .offset_reset_backoff_ms(10)
}

/// Responses handed out by [`MockCluster`]. Group requests are served from
/// queues in order; partition addressed requests are served from per
/// partition queues so concurrent loops cannot steal each other's replies.
/// An exhausted queue falls back to a benign default built from the request.
#[derive(Clone, Debug, Default)]
pub struct Script {
    pub join: VecDeque<JoinGroupResponse>,
    pub sync: VecDeque<SyncGroupResponse>,
    pub heartbeat: VecDeque<HeartbeatResponse>,
    pub metadata: VecDeque<MetadataResponse>,
    pub offset_commit: VecDeque<OffsetCommitResponse>,
    pub offset_fetch: HashMap<(String, i32), VecDeque<OffsetFetchResponse>>,
    pub list_offsets: HashMap<(String, i32), VecDeque<ListOffsetsResponse>>,
    pub fetch: HashMap<(String, i32), VecDeque<FetchResponse>>,
}

#[derive(Clone, Debug, Default)]
pub struct Recorded {
    pub joins: Vec<JoinGroupRequest>,
    pub syncs: Vec<SyncGroupRequest>,
    pub heartbeats: Vec<HeartbeatRequest>,
    pub offset_fetches: Vec<OffsetFetchRequest>,
    pub list_offsets: Vec<ListOffsetsRequest>,
    pub offset_commits: Vec<OffsetCommitRequest>,
    pub fetches: Vec<FetchRequest>,
    pub reconnects: usize,
}

#[derive(Clone, Debug)]
pub struct MockCluster {
    script: Arc<Mutex<Script>>,
    recorded: Arc<Mutex<Recorded>>,
    cancellation: CancellationToken,
}

impl MockCluster {
    pub fn with_script(script: Script) -> Self {
        Self {
            script: Arc::new(Mutex::new(script)),
            recorded: Arc::new(Mutex::new(Recorded::default())),
            cancellation: CancellationToken::new(),
        }
    }

    pub fn recorded(&self) -> Recorded {
        self.recorded.lock().unwrap().clone()
    }

    pub fn cancel(&self) {
        self.cancellation.cancel();
    }
}

fn fetch_partition_of(request: &FetchRequest) -> (String, i32) {
    let topic = &request.topics.as_deref().unwrap_or_default()[0];
    let partition = &topic.partitions.as_deref().unwrap_or_default()[0];
    (topic.topic.clone(), partition.partition)
}

#[async_trait]
impl Cluster for MockCluster {
    async fn find_coordinator(&self, _group_id: &str) -> Result<FindCoordinatorResponse> {
        Ok(FindCoordinatorResponse::default()
            .node_id(1001)
            .host("localhost".into())
            .port(9092))
    }

    async fn reconnect(&self) -> Result<()> {
        self.recorded.lock().unwrap().reconnects += 1;
        Ok(())
    }

    async fn join_group(&self, request: JoinGroupRequest) -> Result<JoinGroupResponse> {
        self.recorded.lock().unwrap().joins.push(request);

        Ok(self
            .script
            .lock()
            .unwrap()
            .join
            .pop_front()
            .expect("scripted join response"))
    }

    async fn sync_group(&self, request: SyncGroupRequest) -> Result<SyncGroupResponse> {
        self.recorded.lock().unwrap().syncs.push(request);

        Ok(self
            .script
            .lock()
            .unwrap()
            .sync
            .pop_front()
            .expect("scripted sync response"))
    }

    async fn heartbeat(&self, request: HeartbeatRequest) -> Result<HeartbeatResponse> {
        self.recorded.lock().unwrap().heartbeats.push(request);

        Ok(self
            .script
            .lock()
            .unwrap()
            .heartbeat
            .pop_front()
            .unwrap_or_default())
    }

    async fn offset_fetch(&self, request: OffsetFetchRequest) -> Result<OffsetFetchResponse> {
        self.recorded.lock().unwrap().offset_fetches.push(request.clone());

        let topic = &request.topics.as_deref().unwrap_or_default()[0];
        let partition = topic.partition_indexes.as_deref().unwrap_or_default()[0];

        Ok(self
            .script
            .lock()
            .unwrap()
            .offset_fetch
            .get_mut(&(topic.name.clone(), partition))
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| offset_fetch_committed(&topic.name, partition, 0)))
    }

    async fn list_offsets(&self, request: ListOffsetsRequest) -> Result<ListOffsetsResponse> {
        self.recorded.lock().unwrap().list_offsets.push(request.clone());

        let topic = &request.topics.as_deref().unwrap_or_default()[0];
        let partition = topic.partitions.as_deref().unwrap_or_default()[0].partition_index;

        Ok(self
            .script
            .lock()
            .unwrap()
            .list_offsets
            .get_mut(&(topic.name.clone(), partition))
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| list_offsets_single(&topic.name, partition, 0)))
    }

    async fn offset_commit(&self, request: OffsetCommitRequest) -> Result<OffsetCommitResponse> {
        self.recorded.lock().unwrap().offset_commits.push(request.clone());

        Ok(self
            .script
            .lock()
            .unwrap()
            .offset_commit
            .pop_front()
            .unwrap_or_else(|| {
                let topic = &request.topics.as_deref().unwrap_or_default()[0];
                let partition =
                    topic.partitions.as_deref().unwrap_or_default()[0].partition_index;
                offset_commit_ok(&topic.name, partition)
            }))
    }

    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse> {
        self.recorded.lock().unwrap().fetches.push(request.clone());

        let (topic, partition) = fetch_partition_of(&request);

        Ok(self
            .script
            .lock()
            .unwrap()
            .fetch
            .get_mut(&(topic.clone(), partition))
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| fetch_records(&topic, partition, ErrorCode::None, 0, &[])))
    }

    async fn metadata(&self, _topics: &[String]) -> Result<MetadataResponse> {
        Ok(self
            .script
            .lock()
            .unwrap()
            .metadata
            .pop_front()
            .expect("scripted metadata response"))
    }

    fn cancellation(&self) -> CancellationToken {
        self.cancellation.clone()
    }
}

pub fn join_response(
    error_code: ErrorCode,
    generation_id: i32,
    member_id: &str,
    leader: &str,
    members: &[&str],
) -> JoinGroupResponse {
    JoinGroupResponse::default()
        .error_code(error_code.into())
        .generation_id(generation_id)
        .protocol_name("range".into())
        .leader(leader.into())
        .member_id(member_id.into())
        .members(Some(
            members
                .iter()
                .map(|member_id| {
                    JoinGroupResponseMember::default().member_id((*member_id).into())
                })
                .collect(),
        ))
}

pub fn sync_response(error_code: ErrorCode, assigned: &[(&str, &[i32])]) -> SyncGroupResponse {
    SyncGroupResponse::default()
        .error_code(error_code.into())
        .assignment(
            ConsumerProtocolAssignment::default()
                .assigned_partitions(
                    assigned
                        .iter()
                        .map(|(topic, partitions)| {
                            TopicPartitions::default()
                                .topic((*topic).into())
                                .partitions(partitions.to_vec())
                        })
                        .collect(),
                )
                .into_bytes(),
        )
}

pub fn metadata_response(topic: &str, partitions: i32) -> MetadataResponse {
    MetadataResponse::default().topics(Some(vec![
        MetadataResponseTopic::default().name(topic.into()).partitions(Some(
            (0..partitions)
                .map(|partition_index| {
                    MetadataResponsePartition::default()
                        .partition_index(partition_index)
                        .leader_id(1001)
                })
                .collect(),
        )),
    ]))
}

pub fn offset_fetch_committed(topic: &str, partition: i32, offset: i64) -> OffsetFetchResponse {
    OffsetFetchResponse::default().topics(Some(vec![
        OffsetFetchResponseTopic::default().name(topic.into()).partitions(Some(vec![
            OffsetFetchResponsePartition::default()
                .partition_index(partition)
                .committed_offset(offset)
                .metadata(Some("".into())),
        ])),
    ]))
}

pub fn offset_fetch_error(
    topic: &str,
    partition: i32,
    error_code: ErrorCode,
) -> OffsetFetchResponse {
    OffsetFetchResponse::default().topics(Some(vec![
        OffsetFetchResponseTopic::default().name(topic.into()).partitions(Some(vec![
            OffsetFetchResponsePartition::default()
                .partition_index(partition)
                .committed_offset(-1)
                .error_code(error_code.into()),
        ])),
    ]))
}

pub fn list_offsets_single(topic: &str, partition: i32, offset: i64) -> ListOffsetsResponse {
    ListOffsetsResponse::default().topics(Some(vec![
        ListOffsetsTopicResponse::default().name(topic.into()).partitions(Some(vec![
            ListOffsetsPartitionResponse::default()
                .partition_index(partition)
                .old_style_offsets(Some(vec![offset])),
        ])),
    ]))
}

pub fn offset_commit_ok(topic: &str, partition: i32) -> OffsetCommitResponse {
    offset_commit_error(topic, partition, ErrorCode::None)
}

pub fn offset_commit_error(
    topic: &str,
    partition: i32,
    error_code: ErrorCode,
) -> OffsetCommitResponse {
    OffsetCommitResponse::default().topics(Some(vec![
        OffsetCommitResponseTopic::default().name(topic.into()).partitions(Some(vec![
            OffsetCommitResponsePartition::default()
                .partition_index(partition)
                .error_code(error_code.into()),
        ])),
    ]))
}

pub fn fetch_records(
    topic: &str,
    partition: i32,
    error_code: ErrorCode,
    high_watermark: i64,
    offsets: &[i64],
) -> FetchResponse {
    let records = offsets
        .iter()
        .fold(MessageSet::default(), |message_set, offset| {
            message_set.record(
                Record::default()
                    .offset(*offset)
                    .value(Some(Bytes::from_static(b"lorem"))),
            )
        });

    FetchResponse::default().topics(Some(vec![
        FetchableTopicResponse::default().topic(topic.into()).partitions(Some(vec![
            PartitionData::default()
                .partition_index(partition)
                .error_code(error_code.into())
                .high_watermark(high_watermark)
                .records(Some(records)),
        ])),
    ]))
}
