use dmrg_tensor::GTensor2;

/// A sparse `D_s x D_{s+1}` grid of on-site operators, one per MPO site.
/// Absent entries are structural zeros (`IsNull` returns true) and are
/// never materialized.
#[derive(Clone)]
pub struct MpoSite {
    entries: Vec<Option<GTensor2>>,
    d_row: usize,
    d_col: usize,
    pub phys_dim: usize,
}

impl MpoSite {
    pub fn zeros(d_row: usize, d_col: usize, phys_dim: usize) -> Self {
        Self {
            entries: vec![None; d_row * d_col],
            d_row,
            d_col,
            phys_dim,
        }
    }

    pub fn rows(&self) -> usize {
        self.d_row
    }

    pub fn cols(&self) -> usize {
        self.d_col
    }

    pub fn is_null(&self, i: usize, j: usize) -> bool {
        self.entries[i * self.d_col + j].is_none()
    }

    pub fn at(&self, i: usize, j: usize) -> Option<&GTensor2> {
        self.entries[i * self.d_col + j].as_ref()
    }

    pub fn set(&mut self, i: usize, j: usize, op: GTensor2) {
        self.entries[i * self.d_col + j] = Some(op);
    }
}

/// An array of length `N` of [`MpoSite`]s with `D_0 = D_N = 1` forming a
/// finite matrix-represented MPO.
pub struct Mpo {
    pub sites: Vec<MpoSite>,
    pub phys_dim: usize,
}

impl Mpo {
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Verifies the `D_0 = D_N = 1` boundary condition and that adjacent
    /// sites share a consistent bond dimension. Fatal precondition check
    /// for a freshly constructed MPO.
    pub fn check_consistent(&self) -> Result<(), String> {
        if self.sites.is_empty() {
            return Err("MPO has zero sites".to_string());
        }
        if self.sites[0].rows() != 1 {
            return Err(format!("D_0 must be 1, got {}", self.sites[0].rows()));
        }
        if self.sites[self.sites.len() - 1].cols() != 1 {
            return Err(format!(
                "D_N must be 1, got {}",
                self.sites[self.sites.len() - 1].cols()
            ));
        }
        for s in 0..self.sites.len() - 1 {
            if self.sites[s].cols() != self.sites[s + 1].rows() {
                return Err(format!(
                    "bond dimension mismatch between site {} (cols={}) and site {} (rows={})",
                    s,
                    self.sites[s].cols(),
                    s + 1,
                    self.sites[s + 1].rows()
                ));
            }
        }
        Ok(())
    }
}
