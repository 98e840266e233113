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

use std::fmt::Debug;

use async_trait::async_trait;
use kraal_sans_io::{
    FetchRequest, FetchResponse, FindCoordinatorResponse, HeartbeatRequest, HeartbeatResponse,
    JoinGroupRequest, JoinGroupResponse, ListOffsetsRequest, ListOffsetsResponse, MetadataResponse,
    OffsetCommitRequest, OffsetCommitResponse, OffsetFetchRequest, OffsetFetchResponse,
    SyncGroupRequest, SyncGroupResponse,
};
use tokio_util::sync::CancellationToken;

use crate::Result;

/// An established connection to a Kafka cluster. Requests addressed to the
/// group coordinator are routed by the implementor; errors returned from
/// these operations are transport failures, api errors travel inside the
/// response structures.
#[async_trait]
pub trait Cluster: Clone + Debug + Send + Sync + 'static {
    /// The broker coordinating this group
    async fn find_coordinator(&self, group_id: &str) -> Result<FindCoordinatorResponse>;

    /// Drop and re-establish every broker channel, recovering from a dead
    /// coordinator
    async fn reconnect(&self) -> Result<()>;

    async fn join_group(&self, request: JoinGroupRequest) -> Result<JoinGroupResponse>;

    async fn sync_group(&self, request: SyncGroupRequest) -> Result<SyncGroupResponse>;

    async fn heartbeat(&self, request: HeartbeatRequest) -> Result<HeartbeatResponse>;

    async fn offset_fetch(&self, request: OffsetFetchRequest) -> Result<OffsetFetchResponse>;

    async fn list_offsets(&self, request: ListOffsetsRequest) -> Result<ListOffsetsResponse>;

    async fn offset_commit(&self, request: OffsetCommitRequest) -> Result<OffsetCommitResponse>;

    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse>;

    /// Topic to partition map for the given topics, in the broker's order
    async fn metadata(&self, topics: &[String]) -> Result<MetadataResponse>;

    /// One shot signal tripped when the connection is being torn down; each
    /// generation registers its closed latch as a child of this token
    fn cancellation(&self) -> CancellationToken;
}
