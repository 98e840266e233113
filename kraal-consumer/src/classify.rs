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

use kraal_sans_io::ErrorCode;

/// How the consumer reacts to an api error code
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Disposition {
    /// No error, carry on
    Proceed,

    /// Close the generation and rejoin with the current member id
    Rejoin,

    /// Close the generation, wait out one session timeout and rejoin with an
    /// empty member id
    ResetMember,

    /// Recover the offset with a time based lookup and fetch again, the
    /// generation stays open
    RetryFetch,

    /// Close the generation so the rejoin picks up fresh metadata
    ClosePartition,

    /// Unrecoverable, surface to the caller
    Fatal,
}

impl From<ErrorCode> for Disposition {
    fn from(error_code: ErrorCode) -> Self {
        match error_code {
            ErrorCode::None => Self::Proceed,
            ErrorCode::UnknownMemberId => Self::ResetMember,
            ErrorCode::OffsetOutOfRange => Self::RetryFetch,

            ErrorCode::UnknownTopicOrPartition | ErrorCode::NotLeaderOrFollower => {
                Self::ClosePartition
            }

            ErrorCode::TopicAuthorizationFailed
            | ErrorCode::GroupAuthorizationFailed
            | ErrorCode::ClusterAuthorizationFailed
            | ErrorCode::UnsupportedVersion => Self::Fatal,

            // IllegalGeneration, RebalanceInProgress and any other group
            // protocol error
            _ => Self::Rejoin,
        }
    }
}

impl From<&ErrorCode> for Disposition {
    fn from(error_code: &ErrorCode) -> Self {
        Self::from(*error_code)
    }
}
