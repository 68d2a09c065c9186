//! Network Layer
//!
//! HTTP API for the shared leaderboard. Holds no state between requests;
//! every request goes through `leaderboard/`.

pub mod protocol;
pub mod server;

pub use protocol::{
    ErrorBody, RecordEntry, RecordsQuery, RecordsResponse, SubmitParams, SubmitRequest, SubmitResponse,
};
pub use server::{LeaderboardServer, ServerConfig, ServerError};
