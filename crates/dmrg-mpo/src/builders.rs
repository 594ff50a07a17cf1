use crate::pauli::{pauli_x, pauli_y, pauli_z};
use crate::site::{Mpo, MpoSite};
use dmrg_tensor::{C64, GTensor2};

fn scaled(op: &GTensor2, c: f64) -> GTensor2 {
    let mut out = op.clone();
    for v in out.data.iter_mut() {
        *v *= C64::new(c, 0.0);
    }
    out
}

fn add_into(dst: &mut GTensor2, op: &GTensor2, c: f64) {
    for (d, s) in dst.data.iter_mut().zip(op.data.iter()) {
        *d += C64::new(c, 0.0) * s;
    }
}

/// One term of a finite nearest-neighbor chain Hamiltonian: a per-site
/// local operator (`coeffs.len() == n`) or a per-bond coupling operator
/// (`coeffs.len() == n - 1`).
pub struct ChainTerm {
    pub op: GTensor2,
    pub coeffs: Vec<f64>,
}

/// Builds the standard finite MPO for `H = sum_s locals[s] + sum_b
/// couplings[b] Z_b Z_{b+1}`-shaped nearest-neighbor chains, generalized
/// over an arbitrary number of coupling channels (one ancilla "waiting"
/// state per channel plus a shared "finished"/"not started" pair), the
/// classic bond-dimension-`(2 + #channels)` construction.
pub fn build_chain(n: usize, phys_dim: usize, locals: &[ChainTerm], couplings: &[ChainTerm]) -> Mpo {
    assert!(n >= 2, "a chain MPO needs at least two sites");
    for t in locals {
        assert_eq!(t.coeffs.len(), n, "local term coefficient count must equal n");
    }
    for t in couplings {
        assert_eq!(
            t.coeffs.len(),
            n - 1,
            "coupling term coefficient count must equal n-1"
        );
    }

    let k = couplings.len();
    let dim = k + 2;
    let finished = 0usize;
    let not_started = dim - 1;

    let mut sites = Vec::with_capacity(n);
    for s in 0..n {
        let d_row = if s == 0 { 1 } else { dim };
        let d_col = if s == n - 1 { 1 } else { dim };
        let mut site = MpoSite::zeros(d_row, d_col, phys_dim);

        let row_of = |logical: usize| -> Option<usize> {
            if s == 0 {
                (logical == not_started).then_some(0)
            } else {
                Some(logical)
            }
        };
        let col_of = |logical: usize| -> Option<usize> {
            if s == n - 1 {
                (logical == finished).then_some(0)
            } else {
                Some(logical)
            }
        };

        if let (Some(r), Some(c)) = (row_of(finished), col_of(finished)) {
            site.set(r, c, GTensor2::identity(phys_dim));
        }
        if let (Some(r), Some(c)) = (row_of(not_started), col_of(not_started)) {
            site.set(r, c, GTensor2::identity(phys_dim));
        }

        if !locals.is_empty() {
            if let (Some(r), Some(c)) = (row_of(not_started), col_of(finished)) {
                let mut acc = GTensor2::zeros(phys_dim, phys_dim);
                for t in locals {
                    add_into(&mut acc, &t.op, t.coeffs[s]);
                }
                site.set(r, c, acc);
            }
        }

        for (ch, t) in couplings.iter().enumerate() {
            let waiting = 1 + ch;
            if let (Some(r), Some(c)) = (row_of(not_started), col_of(waiting)) {
                site.set(r, c, t.op.clone());
            }
            if s >= 1 {
                if let (Some(r), Some(c)) = (row_of(waiting), col_of(finished)) {
                    site.set(r, c, scaled(&t.op, t.coeffs[s - 1]));
                }
            }
        }

        sites.push(site);
    }

    Mpo { sites, phys_dim }
}

/// The trivial identity MPO (bond dimension 1 everywhere).
pub fn identity(n: usize, phys_dim: usize) -> Mpo {
    let mut sites = Vec::with_capacity(n);
    for _ in 0..n {
        let mut site = MpoSite::zeros(1, 1, phys_dim);
        site.set(0, 0, GTensor2::identity(phys_dim));
        sites.push(site);
    }
    Mpo { sites, phys_dim }
}

/// Open-chain transverse-field Ising model: `H = sum_i h X_i + sum_i J
/// Z_i Z_{i+1}`. The field term uses `X` (not `Z`) so it does not commute
/// with the `Z_i Z_{i+1}` coupling; a field along the coupling axis would
/// collapse to a classical, diagonal-in-Z Hamiltonian instead.
pub fn ising(n: usize, h: f64, j: f64) -> Mpo {
    let locals = vec![ChainTerm {
        op: pauli_x(),
        coeffs: vec![h; n],
    }];
    let couplings = vec![ChainTerm {
        op: pauli_z(),
        coeffs: vec![j; n.saturating_sub(1)],
    }];
    build_chain(n, 2, &locals, &couplings)
}

/// Open-chain spin-1/2 Heisenberg model in the spin-operator convention,
/// `H = J sum_i S_i . S_{i+1}` with `S = sigma/2`: since `X_i X_{i+1} + Y_i
/// Y_{i+1} + Z_i Z_{i+1} = 4 S_i . S_{i+1}`, the raw Pauli couplings below
/// carry a `j/4` coefficient so the per-site ground energy matches the
/// Bethe-ansatz reference `1/4 - ln(2)`.
pub fn heisenberg(n: usize, j: f64) -> Mpo {
    let c = j / 4.0;
    let couplings = vec![
        ChainTerm {
            op: pauli_x(),
            coeffs: vec![c; n.saturating_sub(1)],
        },
        ChainTerm {
            op: pauli_y(),
            coeffs: vec![c; n.saturating_sub(1)],
        },
        ChainTerm {
            op: pauli_z(),
            coeffs: vec![c; n.saturating_sub(1)],
        },
    ];
    build_chain(n, 2, &[], &couplings)
}
