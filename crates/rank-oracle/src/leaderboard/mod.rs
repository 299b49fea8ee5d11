//! Leaderboard and market definition stores
//!
//! Read-only HTTP collaborators of the resolution engine:
//! - `GET /leaderboard/today` - ordered ranked entries for the current day
//! - `GET /markets` - current market definitions
//! - `GET /deployments` - contract address refresh document
//!
//! The returned entry order is rank order and is trusted as-is; snapshot
//! randomization happens upstream in the generation tool, never here.

mod client;

pub use client::LeaderboardClient;
