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

use kraal_sans_io::{ErrorCode, HeartbeatRequest};
use opentelemetry::metrics::Counter;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    METER, classify::Disposition, cluster::Cluster, config::ConsumerConfig,
    group::GenerationState, sleep_unless_cancelled,
};

static HEARTBEATS: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("kraal_consumer_heartbeats")
        .with_description("heartbeats answered by the group coordinator")
        .build()
});

static HEARTBEAT_ERRORS: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("kraal_consumer_heartbeat_errors")
        .with_description("heartbeat transport failures")
        .build()
});

/// Keeps the member alive for the lifetime of the generation. One heartbeat
/// in flight at a time; any rebalance signal or transport failure trips the
/// generation's closed latch and ends the loop.
pub(crate) fn start<C>(cluster: C, config: &ConsumerConfig, state: &GenerationState)
where
    C: Cluster,
{
    let request = HeartbeatRequest::default()
        .group_id(config.group_id.clone())
        .generation_id(state.generation_id())
        .member_id(state.member_id().to_owned());

    _ = tokio::spawn(run(
        cluster,
        request,
        config.heartbeat_interval(),
        state.closed(),
    ));
}

async fn run<C>(cluster: C, request: HeartbeatRequest, interval: Duration, closed: CancellationToken)
where
    C: Cluster,
{
    loop {
        if closed.is_cancelled() {
            break;
        }

        match cluster.heartbeat(request.clone()).await {
            Ok(response) => {
                HEARTBEATS.add(1, &[]);

                match ErrorCode::try_from(response.error_code).map(Disposition::from) {
                    Ok(Disposition::Proceed) => {
                        if !sleep_unless_cancelled(interval, &closed).await {
                            break;
                        }
                    }

                    Ok(disposition) => {
                        info!(
                            group = request.group_id,
                            generation_id = request.generation_id,
                            error_code = response.error_code,
                            ?disposition,
                            "heartbeat closing generation"
                        );
                        closed.cancel();
                        break;
                    }

                    Err(error) => {
                        warn!(group = request.group_id, %error, "heartbeat closing generation");
                        closed.cancel();
                        break;
                    }
                }
            }

            Err(error) => {
                HEARTBEAT_ERRORS.add(1, &[]);
                warn!(group = request.group_id, %error, "heartbeat transport failure");
                closed.cancel();
                break;
            }
        }
    }

    debug!(
        group = request.group_id,
        generation_id = request.generation_id,
        "heartbeat loop done"
    );
}
