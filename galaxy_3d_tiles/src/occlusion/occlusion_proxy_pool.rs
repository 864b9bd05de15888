/// OcclusionProxyPool - bounded, recycling pool of occlusion proxies.
///
/// The selection engine fetches a proxy per tile it wants occlusion
/// information for, and prunes mappings for tiles it no longer visits.
/// Unmapped proxies are recycled before new ones are created, and the
/// pool never holds more than `max_pool_size` proxies. Main thread only.

use glam::DMat4;
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;
use crate::selection::{Tile, TileId};
use super::occlusion_proxy::{
    OcclusionProxy, OcclusionProxyKey, OcclusionQuerySource, TileOcclusionState,
};

pub struct OcclusionProxyPool {
    proxies: SlotMap<OcclusionProxyKey, OcclusionProxy>,
    /// Mapped proxies by tile
    tile_to_proxy: FxHashMap<TileId, OcclusionProxyKey>,
    /// Unmapped proxies ready for reuse
    free_proxies: Vec<OcclusionProxyKey>,
    max_pool_size: usize,
    dataset_to_world: DMat4,
}

impl OcclusionProxyPool {
    pub fn new(max_pool_size: usize) -> Self {
        Self {
            proxies: SlotMap::with_key(),
            tile_to_proxy: FxHashMap::default(),
            free_proxies: Vec::new(),
            max_pool_size,
            dataset_to_world: DMat4::IDENTITY,
        }
    }

    // ===== PROXY CREATION =====

    /// Create an unmapped, invisible proxy. None when the pool is full.
    pub fn create_proxy(&mut self) -> Option<OcclusionProxyKey> {
        if self.proxies.len() >= self.max_pool_size {
            return None;
        }
        let key = self.proxies.insert(OcclusionProxy::new(self.dataset_to_world));
        self.free_proxies.push(key);
        Some(key)
    }

    /// Destroy a proxy, mapped or not. Returns false if the key is invalid.
    pub fn destroy_proxy(&mut self, key: OcclusionProxyKey) -> bool {
        let Some(proxy) = self.proxies.remove(key) else {
            return false;
        };
        if let Some(tile) = proxy.mapped_tile() {
            self.tile_to_proxy.remove(&tile);
        }
        self.free_proxies.retain(|k| *k != key);
        true
    }

    /// Destroy every proxy
    pub fn destroy_pool(&mut self) {
        self.proxies.clear();
        self.tile_to_proxy.clear();
        self.free_proxies.clear();
    }

    // ===== MAPPING =====

    /// Proxy mapped to `tile`, mapping one if needed.
    ///
    /// Reuses the tile's current proxy, else recycles an unmapped one,
    /// else creates one. None when the pool is exhausted.
    pub fn fetch_proxy_for_tile(&mut self, tile: &Tile, current_time: f64) -> Option<OcclusionProxyKey> {
        if let Some(&key) = self.tile_to_proxy.get(&tile.id) {
            return Some(key);
        }

        let key = match self.free_proxies.pop() {
            Some(key) => key,
            None => {
                self.create_proxy()?;
                self.free_proxies.pop()?
            }
        };

        let proxy = self.proxies.get_mut(key)?;
        proxy.map(tile, current_time);
        self.tile_to_proxy.insert(tile.id, key);
        Some(key)
    }

    /// Unmap a proxy and return it to the free list
    pub fn unmap_proxy(&mut self, key: OcclusionProxyKey) -> bool {
        let Some(proxy) = self.proxies.get_mut(key) else {
            return false;
        };
        if let Some(tile) = proxy.mapped_tile() {
            self.tile_to_proxy.remove(&tile);
            proxy.unmap();
            self.free_proxies.push(key);
        }
        true
    }

    /// Unmap every proxy whose tile is not in `keep`
    pub fn prune(&mut self, keep: &FxHashSet<TileId>) {
        let stale: Vec<OcclusionProxyKey> = self.tile_to_proxy
            .iter()
            .filter(|(tile, _)| !keep.contains(tile))
            .map(|(_, key)| *key)
            .collect();
        for key in stale {
            self.unmap_proxy(key);
        }
    }

    // ===== OCCLUSION =====

    /// Pull query results for every mapped proxy
    pub fn update_occlusion(&mut self, source: &dyn OcclusionQuerySource) {
        for (key, proxy) in self.proxies.iter_mut() {
            if !proxy.is_mapped() {
                continue;
            }
            let state = source.occlusion_state(
                key,
                proxy.occlusion_state() == TileOcclusionState::Occluded,
                proxy.mapped_time(),
            );
            proxy.update_occlusion(state);
        }
    }

    /// Last known occlusion state of a tile (Unavailable when unmapped)
    pub fn occlusion_state_for_tile(&self, tile: TileId) -> TileOcclusionState {
        self.tile_to_proxy
            .get(&tile)
            .and_then(|key| self.proxies.get(*key))
            .map(|proxy| proxy.occlusion_state())
            .unwrap_or_default()
    }

    // ===== TRANSFORM =====

    /// Propagate a new dataset-to-world transform to every proxy
    pub fn update_transform_from_dataset(&mut self, dataset_to_world: DMat4) {
        self.dataset_to_world = dataset_to_world;
        for proxy in self.proxies.values_mut() {
            proxy.set_dataset_to_world(dataset_to_world);
        }
    }

    // ===== QUERIES =====

    pub fn proxy(&self, key: OcclusionProxyKey) -> Option<&OcclusionProxy> {
        self.proxies.get(key)
    }

    pub fn proxy_count(&self) -> usize {
        self.proxies.len()
    }

    pub fn mapped_count(&self) -> usize {
        self.tile_to_proxy.len()
    }

    pub fn max_pool_size(&self) -> usize {
        self.max_pool_size
    }
}

#[cfg(test)]
#[path = "occlusion_proxy_pool_tests.rs"]
mod tests;
