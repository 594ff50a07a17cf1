mod error;

use dmrg_tensor::GTensor3;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

pub use error::BlockCacheError;

/// The environment at one boundary: one rank-3 tensor
/// `(mps-bond, mpo-bond, mps-bond-dag)` per MPO virtual bond.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockGroup {
    pub tensors: Vec<GTensor3>,
}

impl BlockGroup {
    /// The trivial identity environment at a chain boundary (`L[0]`/`R[0]`):
    /// a single bond of dimension 1 whose tensor is the scalar 1.
    pub fn trivial() -> Self {
        let mut t = GTensor3::zeros(1, 1, 1);
        t.set(0, 0, 0, dmrg_tensor::C64::new(1.0, 0.0));
        Self { tensors: vec![t] }
    }

    pub fn bond_dim(&self) -> usize {
        self.tensors.len()
    }
}

const WINDOW: usize = 2;

/// Per-site left and right environment tensors, persisted to `temp_path/`
/// between sweep steps; only a small moving window (the two groups
/// adjacent to the active bond) is kept resident at once.
pub struct BlockCache {
    temp_path: PathBuf,
    left: HashMap<usize, BlockGroup>,
    right: HashMap<usize, BlockGroup>,
    left_order: VecDeque<usize>,
    right_order: VecDeque<usize>,
}

impl BlockCache {
    pub fn new(temp_path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let temp_path = temp_path.into();
        fs::create_dir_all(&temp_path)?;
        Ok(Self {
            temp_path,
            left: HashMap::new(),
            right: HashMap::new(),
            left_order: VecDeque::new(),
            right_order: VecDeque::new(),
        })
    }

    fn left_path(&self, p: usize) -> PathBuf {
        self.temp_path.join(format!("l{p}.bin"))
    }

    fn right_path(&self, p: usize) -> PathBuf {
        self.temp_path.join(format!("r{p}.bin"))
    }

    fn load(path: &Path) -> Result<BlockGroup, BlockCacheError> {
        if !path.exists() {
            return Err(BlockCacheError::Missing(0));
        }
        let bytes = fs::read(path)?;
        Ok(bincode::deserialize(&bytes)?)
    }

    fn store(path: &Path, grp: &BlockGroup) -> Result<(), BlockCacheError> {
        let bytes = bincode::serialize(grp)?;
        fs::write(path, bytes)?;
        Ok(())
    }

    pub fn read_left(&mut self, p: usize) -> Result<&BlockGroup, BlockCacheError> {
        if !self.left.contains_key(&p) {
            let grp = Self::load(&self.left_path(p)).map_err(|e| match e {
                BlockCacheError::Missing(_) => BlockCacheError::Missing(p),
                other => other,
            })?;
            self.insert_left(p, grp)?;
        }
        self.touch_left(p);
        Ok(self.left.get(&p).expect("just inserted"))
    }

    pub fn read_right(&mut self, p: usize) -> Result<&BlockGroup, BlockCacheError> {
        if !self.right.contains_key(&p) {
            let grp = Self::load(&self.right_path(p)).map_err(|e| match e {
                BlockCacheError::Missing(_) => BlockCacheError::Missing(p),
                other => other,
            })?;
            self.insert_right(p, grp)?;
        }
        self.touch_right(p);
        Ok(self.right.get(&p).expect("just inserted"))
    }

    pub fn read_and_remove_left(&mut self, p: usize) -> Result<BlockGroup, BlockCacheError> {
        let grp = match self.left.remove(&p) {
            Some(g) => g,
            None => Self::load(&self.left_path(p)).map_err(|e| match e {
                BlockCacheError::Missing(_) => BlockCacheError::Missing(p),
                other => other,
            })?,
        };
        self.left_order.retain(|&x| x != p);
        let path = self.left_path(p);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(grp)
    }

    pub fn read_and_remove_right(&mut self, p: usize) -> Result<BlockGroup, BlockCacheError> {
        let grp = match self.right.remove(&p) {
            Some(g) => g,
            None => Self::load(&self.right_path(p)).map_err(|e| match e {
                BlockCacheError::Missing(_) => BlockCacheError::Missing(p),
                other => other,
            })?,
        };
        self.right_order.retain(|&x| x != p);
        let path = self.right_path(p);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(grp)
    }

    pub fn write_left(&mut self, p: usize, grp: BlockGroup) -> Result<(), BlockCacheError> {
        Self::store(&self.left_path(p), &grp)?;
        self.insert_left(p, grp)
    }

    pub fn write_right(&mut self, p: usize, grp: BlockGroup) -> Result<(), BlockCacheError> {
        Self::store(&self.right_path(p), &grp)?;
        self.insert_right(p, grp)
    }

    /// Write-through the resident group (if any) and drop it from memory,
    /// the "older groups must be evicted to disk" bound.
    pub fn evict_left(&mut self, p: usize) -> Result<(), BlockCacheError> {
        if let Some(grp) = self.left.remove(&p) {
            Self::store(&self.left_path(p), &grp)?;
        }
        self.left_order.retain(|&x| x != p);
        Ok(())
    }

    pub fn evict_right(&mut self, p: usize) -> Result<(), BlockCacheError> {
        if let Some(grp) = self.right.remove(&p) {
            Self::store(&self.right_path(p), &grp)?;
        }
        self.right_order.retain(|&x| x != p);
        Ok(())
    }

    /// Writes every resident group to disk without evicting it from
    /// memory, used before a deliberate restart so a freshly constructed
    /// cache pointed at the same `temp_path` sees a consistent state.
    pub fn flush_all(&mut self) -> Result<(), BlockCacheError> {
        for (&p, grp) in self.left.iter() {
            Self::store(&self.left_path(p), grp)?;
        }
        for (&p, grp) in self.right.iter() {
            Self::store(&self.right_path(p), grp)?;
        }
        Ok(())
    }

    fn insert_left(&mut self, p: usize, grp: BlockGroup) -> Result<(), BlockCacheError> {
        self.left.insert(p, grp);
        self.touch_left(p);
        self.enforce_window_left()
    }

    fn insert_right(&mut self, p: usize, grp: BlockGroup) -> Result<(), BlockCacheError> {
        self.right.insert(p, grp);
        self.touch_right(p);
        self.enforce_window_right()
    }

    fn touch_left(&mut self, p: usize) {
        self.left_order.retain(|&x| x != p);
        self.left_order.push_back(p);
    }

    fn touch_right(&mut self, p: usize) {
        self.right_order.retain(|&x| x != p);
        self.right_order.push_back(p);
    }

    fn enforce_window_left(&mut self) -> Result<(), BlockCacheError> {
        while self.left_order.len() > WINDOW {
            if let Some(oldest) = self.left_order.pop_front() {
                if let Some(grp) = self.left.remove(&oldest) {
                    Self::store(&self.left_path(oldest), &grp)?;
                }
            }
        }
        Ok(())
    }

    fn enforce_window_right(&mut self) -> Result<(), BlockCacheError> {
        while self.right_order.len() > WINDOW {
            if let Some(oldest) = self.right_order.pop_front() {
                if let Some(grp) = self.right.remove(&oldest) {
                    Self::store(&self.right_path(oldest), &grp)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_block_group_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = BlockCache::new(dir.path()).unwrap();

        let mut grp = BlockGroup::trivial();
        grp.tensors.push(GTensor3::zeros(2, 3, 2));
        cache.write_left(4, grp.clone()).unwrap();
        cache.evict_left(4).unwrap();

        let reloaded = cache.read_left(4).unwrap();
        assert_eq!(reloaded.bond_dim(), grp.bond_dim());
        assert_eq!(reloaded.tensors[1].dl, 2);
    }

    #[test]
    fn read_missing_group_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = BlockCache::new(dir.path()).unwrap();
        let err = cache.read_left(9).unwrap_err();
        assert!(matches!(err, BlockCacheError::Missing(9)));
    }

    #[test]
    fn window_evicts_oldest_group_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = BlockCache::new(dir.path()).unwrap();
        for p in 0..4 {
            cache.write_left(p, BlockGroup::trivial()).unwrap();
        }
        assert!(cache.left.len() <= WINDOW);
        // The evicted groups must still be loadable from disk.
        let reloaded = cache.read_left(0).unwrap();
        assert_eq!(reloaded.bond_dim(), 1);
    }
}
