//! Chain adapter: contract address book and JSON-RPC gateway
//!
//! # Components
//! - `AddressBook`: contract addresses per role, built once at startup from a
//!   fallback file with an optional all-or-nothing remote refresh
//! - `ChainGateway`: the engine-facing interface (chain time, market id
//!   derivation, commitment submission)
//! - `RpcGateway`: concrete gateway over an alloy provider

mod addresses;
mod gateway;

pub use addresses::{AddressBook, DeploymentDoc};
pub use gateway::{ChainGateway, RpcGateway};
