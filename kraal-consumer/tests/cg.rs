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

mod common;

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::{Duration, Instant},
};

use common::{MockCluster, Script};
use kraal_consumer::{Consumer, Error, Result};
use kraal_sans_io::{
    ErrorCode, HeartbeatResponse,
    protocol::{ConsumerProtocolAssignment, ConsumerProtocolSubscription, TopicPartitions},
};
use pretty_assertions::assert_eq;
use tokio::time::sleep;

#[tokio::test]
async fn leader_range_assignment() -> Result<()> {
    let _guard = common::init_tracing();

    let cluster = MockCluster::with_script(Script {
        join: [common::join_response(
            ErrorCode::None,
            1,
            "m1",
            "m1",
            &["m1", "m2", "m3"],
        )]
        .into(),
        metadata: [common::metadata_response("t", 7)].into(),
        sync: [common::sync_response(ErrorCode::None, &[("t", &[0, 1, 2])])].into(),
        ..Default::default()
    });

    let mut generations =
        Consumer::new(cluster.clone(), common::config("g-leader", &["t"])).generations();

    let generation = generations.next().await.expect("generation")?;

    assert_eq!(1, generation.generation_id());
    assert_eq!("m1", generation.member_id());
    assert_eq!("m1", generation.leader());
    assert_eq!(3, generation.into_streams().len());

    let recorded = cluster.recorded();

    assert_eq!("", recorded.joins[0].member_id);
    assert_eq!("consumer", recorded.joins[0].protocol_type);
    assert_eq!(200, recorded.joins[0].session_timeout_ms);

    let protocols = recorded.joins[0].protocols.clone().expect("protocols");
    assert_eq!("range", protocols[0].name);
    assert_eq!(
        vec!["t".to_owned()],
        ConsumerProtocolSubscription::from_bytes(protocols[0].metadata.clone())?.topics
    );

    let assignments = recorded.syncs[0].assignments.clone().expect("assignments");
    let mut decoded = Vec::new();

    for assignment in &assignments {
        decoded.push((
            assignment.member_id.clone(),
            ConsumerProtocolAssignment::from_bytes(assignment.assignment.clone())?
                .assigned_partitions,
        ));
    }

    assert_eq!(
        vec![
            (
                "m1".to_owned(),
                vec![TopicPartitions::default().topic("t".into()).partitions(vec![0, 1, 2])]
            ),
            (
                "m2".to_owned(),
                vec![TopicPartitions::default().topic("t".into()).partitions(vec![3, 4, 5])]
            ),
            (
                "m3".to_owned(),
                vec![TopicPartitions::default().topic("t".into()).partitions(vec![6])]
            ),
        ],
        decoded
    );

    cluster.cancel();
    assert!(generations.next().await.is_none());

    Ok(())
}

#[tokio::test]
async fn follower_syncs_with_empty_assignment() -> Result<()> {
    let _guard = common::init_tracing();

    let cluster = MockCluster::with_script(Script {
        join: [common::join_response(ErrorCode::None, 5, "m2", "m1", &[])].into(),
        sync: [common::sync_response(ErrorCode::None, &[("t", &[4])])].into(),
        fetch: [(
            ("t".to_owned(), 4),
            [common::fetch_records("t", 4, ErrorCode::None, 2, &[0, 1])].into(),
        )]
        .into(),
        ..Default::default()
    });

    let mut generations =
        Consumer::new(cluster.clone(), common::config("g-follower", &["t"])).generations();

    let generation = generations.next().await.expect("generation")?;

    assert_eq!(5, generation.generation_id());
    assert_eq!("m2", generation.member_id());
    assert_eq!("m1", generation.leader());

    let recorded = cluster.recorded();
    assert_eq!(Some(vec![]), recorded.syncs[0].assignments);
    assert_eq!(5, recorded.syncs[0].generation_id);
    assert_eq!("m2", recorded.syncs[0].member_id);

    let mut streams = generation.into_streams();
    assert_eq!(1, streams.len());

    let (records, commit) = streams[0].next().await.expect("element")?;
    assert_eq!(Some(0), records.first_offset());
    assert_eq!(Some(1), records.last_offset());
    assert_eq!(0, commit.offset());

    cluster.cancel();

    Ok(())
}

#[tokio::test]
async fn rebalance_mid_fetch_rejoins_with_member_id() -> Result<()> {
    let _guard = common::init_tracing();

    let cluster = MockCluster::with_script(Script {
        join: [
            common::join_response(ErrorCode::None, 1, "m-a", "m-l", &[]),
            common::join_response(ErrorCode::None, 2, "m-a", "m-l", &[]),
        ]
        .into(),
        sync: [
            common::sync_response(ErrorCode::None, &[("t", &[0])]),
            common::sync_response(ErrorCode::None, &[("t", &[0])]),
        ]
        .into(),
        fetch: [(
            ("t".to_owned(), 0),
            [common::fetch_records(
                "t",
                0,
                ErrorCode::IllegalGeneration,
                0,
                &[],
            )]
            .into(),
        )]
        .into(),
        ..Default::default()
    });

    let mut generations =
        Consumer::new(cluster.clone(), common::config("g-rebalance", &["t"])).generations();

    let generation = generations.next().await.expect("generation")?;
    assert_eq!(1, generation.generation_id());

    let closed = generation.closed();
    let mut streams = generation.into_streams();

    // the rebalance signal ends the stream without an element
    assert!(streams[0].next().await.is_none());
    assert!(closed.is_cancelled());

    let generation = generations.next().await.expect("generation")?;
    assert_eq!(2, generation.generation_id());

    let recorded = cluster.recorded();
    assert_eq!(2, recorded.joins.len());
    assert_eq!("m-a", recorded.joins[1].member_id);
    assert_eq!(1, recorded.reconnects);

    cluster.cancel();

    Ok(())
}

#[tokio::test]
async fn unknown_member_id_on_heartbeat_rejoins_as_new_member() -> Result<()> {
    let _guard = common::init_tracing();

    let cluster = MockCluster::with_script(Script {
        join: [
            common::join_response(ErrorCode::None, 1, "m-b", "m-x", &[]),
            common::join_response(ErrorCode::UnknownMemberId, -1, "", "", &[]),
            common::join_response(ErrorCode::None, 2, "m-c", "m-x", &[]),
        ]
        .into(),
        sync: [
            common::sync_response(ErrorCode::None, &[("t", &[0])]),
            common::sync_response(ErrorCode::None, &[("t", &[0])]),
        ]
        .into(),
        heartbeat: [HeartbeatResponse::default().error_code(ErrorCode::UnknownMemberId.into())]
            .into(),
        ..Default::default()
    });

    let mut generations =
        Consumer::new(cluster.clone(), common::config("g-unknown", &["t"])).generations();

    let generation = generations.next().await.expect("generation")?;
    assert_eq!("m-b", generation.member_id());

    let started = Instant::now();

    // the heartbeat invalidates the member, the next join sleeps out one
    // session timeout and starts over without a member id
    let generation = generations.next().await.expect("generation")?;
    assert!(started.elapsed() >= Duration::from_millis(200));
    assert_eq!(2, generation.generation_id());
    assert_eq!("m-c", generation.member_id());

    let recorded = cluster.recorded();
    assert_eq!("m-b", recorded.joins[1].member_id);
    assert_eq!("", recorded.joins[2].member_id);

    cluster.cancel();

    Ok(())
}

#[tokio::test]
async fn rejected_join_retries_without_terminating() -> Result<()> {
    let _guard = common::init_tracing();

    let cluster = MockCluster::with_script(Script {
        join: [
            common::join_response(ErrorCode::GroupAuthorizationFailed, -1, "", "", &[]),
            common::join_response(ErrorCode::None, 1, "m-z", "m-l", &[]),
        ]
        .into(),
        sync: [common::sync_response(ErrorCode::None, &[("t", &[0])])].into(),
        ..Default::default()
    });

    let mut generations =
        Consumer::new(cluster.clone(), common::config("g-retry", &["t"])).generations();

    let generation = generations.next().await.expect("generation")?;
    assert_eq!(1, generation.generation_id());
    assert_eq!("m-z", generation.member_id());

    let recorded = cluster.recorded();
    assert_eq!(2, recorded.joins.len());
    assert_eq!("", recorded.joins[1].member_id);

    cluster.cancel();

    Ok(())
}

#[tokio::test]
async fn illegal_generation_on_offset_fetch_rejoins_as_new_member() -> Result<()> {
    let _guard = common::init_tracing();

    let cluster = MockCluster::with_script(Script {
        join: [
            common::join_response(ErrorCode::None, 1, "m-g", "m-l", &[]),
            common::join_response(ErrorCode::None, 2, "m-h", "m-l", &[]),
        ]
        .into(),
        sync: [
            common::sync_response(ErrorCode::None, &[("t", &[0])]),
            common::sync_response(ErrorCode::None, &[("t", &[0])]),
        ]
        .into(),
        offset_fetch: [(
            ("t".to_owned(), 0),
            [common::offset_fetch_error(
                "t",
                0,
                ErrorCode::IllegalGeneration,
            )]
            .into(),
        )]
        .into(),
        ..Default::default()
    });

    let mut generations =
        Consumer::new(cluster.clone(), common::config("g-stale", &["t"])).generations();

    let started = Instant::now();
    let generation = generations.next().await.expect("generation")?;

    // the stale offset fetch reply discards the freshly issued member id
    assert!(started.elapsed() >= Duration::from_millis(200));
    assert_eq!(2, generation.generation_id());
    assert_eq!("m-h", generation.member_id());

    let recorded = cluster.recorded();
    assert_eq!(2, recorded.joins.len());
    assert_eq!("", recorded.joins[0].member_id);
    assert_eq!("", recorded.joins[1].member_id);

    cluster.cancel();

    Ok(())
}

#[tokio::test]
async fn empty_assignment_is_fatal() -> Result<()> {
    let _guard = common::init_tracing();

    let cluster = MockCluster::with_script(Script {
        join: [common::join_response(ErrorCode::None, 1, "m-e", "m-l", &[])].into(),
        sync: [common::sync_response(ErrorCode::None, &[])].into(),
        ..Default::default()
    });

    let mut generations =
        Consumer::new(cluster.clone(), common::config("g-empty", &["t"])).generations();

    match generations.next().await {
        Some(Err(Error::EmptyAssignment {
            generation_id: 1,
            member_id,
        })) => assert_eq!("m-e", member_id),

        otherwise => panic!("{otherwise:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn consume_commit_after_drains_all_partitions() -> Result<()> {
    let _guard = common::init_tracing();

    let cluster = MockCluster::with_script(Script {
        join: [common::join_response(
            ErrorCode::None,
            7,
            "m-solo",
            "m-solo",
            &["m-solo"],
        )]
        .into(),
        metadata: [common::metadata_response("t", 2)].into(),
        sync: [common::sync_response(ErrorCode::None, &[("t", &[0, 1])])].into(),
        fetch: [
            (
                ("t".to_owned(), 0),
                [common::fetch_records("t", 0, ErrorCode::None, 1, &[0])].into(),
            ),
            (
                ("t".to_owned(), 1),
                [common::fetch_records("t", 1, ErrorCode::None, 1, &[0])].into(),
            ),
        ]
        .into(),
        ..Default::default()
    });

    let handled = Arc::new(AtomicUsize::new(0));
    let counter = handled.clone();

    let task = tokio::spawn(
        Consumer::new(cluster.clone(), common::config("g-e2e", &["t"])).consume_commit_after(
            move |topition, records| {
                let counter = counter.clone();

                async move {
                    assert_eq!("t", topition.topic());
                    assert_eq!(1, records.len());
                    _ = counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            },
        ),
    );

    let mut polls = 0;

    while cluster.recorded().offset_commits.len() < 2 {
        polls += 1;
        assert!(polls < 500, "offset commits never arrived");
        sleep(Duration::from_millis(10)).await;
    }

    cluster.cancel();
    task.await.expect("task")?;

    assert_eq!(2, handled.load(Ordering::SeqCst));

    let recorded = cluster.recorded();
    assert_eq!(7, recorded.offset_commits[0].generation_id_or_member_epoch);
    assert_eq!("m-solo", recorded.offset_commits[0].member_id);
    assert_eq!(-1, recorded.offset_commits[0].retention_time_ms);

    Ok(())
}
