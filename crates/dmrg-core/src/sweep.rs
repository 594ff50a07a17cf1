use crate::config::SweepParams;
use crate::error::SweepError;
use crate::grow;
use crate::mps::Mps;
use crate::two_site::{self, Direction};
use dmrg_block::{BlockCache, BlockGroup};
use dmrg_mpo::Mpo;

/// Runs outer rightward/leftward sweeps over an MPS/MPO pair, reporting
/// per-bond diagnostics and returning the final ground energy.
pub struct Sweeper {
    pub mps: Mps,
    pub mpo: Mpo,
    pub cache: BlockCache,
    pub params: SweepParams,
}

impl Sweeper {
    pub fn new(mps: Mps, mpo: Mpo, params: SweepParams) -> Result<Self, SweepError> {
        mpo.check_consistent().map_err(SweepError::Precondition)?;
        if mps.len() != mpo.len() {
            return Err(SweepError::Precondition(format!(
                "mps has {} sites, mpo has {}",
                mps.len(),
                mpo.len()
            )));
        }
        let cache = BlockCache::new(params.temp_path.clone())?;
        Ok(Self {
            mps,
            mpo,
            cache,
            params,
        })
    }

    /// Expects the MPS already right-canonicalized with the center at the
    /// left boundary; builds `L[0]`, `R[n]`, and every `R[p]` by walking the
    /// MPO from right to left, applying `grow_right` `n - 1` times.
    pub fn initialize(&mut self) -> Result<(), SweepError> {
        let n = self.mps.len();
        self.mps.centralize(0)?;
        self.cache.write_left(0, BlockGroup::trivial())?;
        self.cache.write_right(n, BlockGroup::trivial())?;

        let mut current = BlockGroup::trivial();
        for s in (1..n).rev() {
            let a = self.mps.get(s)?.clone();
            current = grow::grow_right(&current, &a, &self.mpo.sites[s]);
            self.cache.write_right(s, current.clone())?;
        }
        Ok(())
    }

    fn log_bond(report: &two_site::BondReport) {
        tracing::info!(
            l = report.l,
            r = report.r,
            energy = report.energy,
            trunc_err = report.trunc_error,
            bond_dim = report.kept_dim,
            lanczos_iters = report.lanczos_iters,
            entanglement_entropy = report.entanglement_entropy,
            "bond update"
        );
    }

    /// Runs `params.sweeps` full right+left passes from a freshly
    /// initialized environment; returns the final reported ground energy.
    pub fn run(&mut self) -> Result<f64, SweepError> {
        self.initialize()?;
        self.run_more(self.params.sweeps)
    }

    /// Runs `sweeps` further right+left passes without rebuilding the
    /// initial environments, for resuming a sweep whose MPS and block
    /// cache already reflect prior progress.
    pub fn run_more(&mut self, sweeps: usize) -> Result<f64, SweepError> {
        let n = self.mps.len();
        let mut energy = f64::INFINITY;

        for sweep_idx in 0..sweeps {
            for l in 0..n - 2 {
                let report = two_site::update_bond(
                    &mut self.mps,
                    &self.mpo,
                    &mut self.cache,
                    l,
                    Direction::Right,
                    &self.params,
                )?;
                energy = report.energy;
                Self::log_bond(&report);
            }
            for l in (1..n - 1).rev() {
                let report = two_site::update_bond(
                    &mut self.mps,
                    &self.mpo,
                    &mut self.cache,
                    l,
                    Direction::Left,
                    &self.params,
                )?;
                energy = report.energy;
                Self::log_bond(&report);
            }
            tracing::info!(sweep = sweep_idx, energy, "sweep complete");
        }

        Ok(energy)
    }
}
