//! Resolution of the peer set a proposal is sent to
//!
//! - `TopologyProvider`: source of the current node list
//! - `DiscoveryService`: endorsement layouts for a chaincode
//! - `DiscoveryCache`: shared, swap-on-refresh layout cache
//! - `PeerSetResolver`: discovery first, static endorsers otherwise

pub mod cache;
pub mod error;
pub mod resolver;
pub mod selector;
pub mod service;
pub mod topology;

pub use cache::{CachedLayouts, DiscoveryCache, DEFAULT_REFRESH_INTERVAL};
pub use error::TopologyError;
pub use resolver::{DiscoveryOptions, PeerSetResolver, ResolvedPeers};
pub use selector::select_peers;
pub use service::{DiscoveryService, EndorsementGroup, EndorsementLayout, MockDiscovery};
pub use topology::{MockTopology, StaticTopology, TopologyProvider};
