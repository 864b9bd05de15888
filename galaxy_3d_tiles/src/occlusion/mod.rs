//! Occlusion proxies
//!
//! Pool of invisible per-tile proxies whose occlusion query results feed
//! back into tile selection.

mod occlusion_proxy;
mod occlusion_proxy_pool;

pub use occlusion_proxy::{
    OcclusionProxy, OcclusionProxyKey, OcclusionQuerySource, TileOcclusionState,
};
pub use occlusion_proxy_pool::OcclusionProxyPool;
