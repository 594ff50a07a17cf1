use crate::config::SweepParams;
use crate::error::SweepError;
use crate::mps::Mps;
use crate::{effective_hamiltonian, grow};
use dmrg_block::BlockCache;
use dmrg_lanczos::LanczosParams;
use dmrg_mpo::Mpo;
use dmrg_tensor::{contract_bond, svd_two_site, GTensor3, GTensor4, TruncParams, C64};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Right,
    Left,
}

#[derive(Clone, Debug)]
pub struct BondReport {
    pub l: usize,
    pub r: usize,
    pub energy: f64,
    pub trunc_error: f64,
    pub kept_dim: usize,
    pub lanczos_iters: usize,
    pub entanglement_entropy: f64,
}

fn absorb_s_left(s: &[f64], vt: &GTensor3) -> GTensor3 {
    let mut out = GTensor3::zeros(vt.dl, vt.dp, vt.dr);
    out.div = vt.div;
    for m in 0..vt.dl {
        for p in 0..vt.dp {
            for r in 0..vt.dr {
                out.set(m, p, r, C64::new(s[m], 0.0) * vt.get(m, p, r));
            }
        }
    }
    out
}

fn absorb_s_right(u: &GTensor3, s: &[f64]) -> GTensor3 {
    let mut out = GTensor3::zeros(u.dl, u.dp, u.dr);
    out.div = u.div;
    for l in 0..u.dl {
        for p in 0..u.dp {
            for m in 0..u.dr {
                out.set(l, p, m, u.get(l, p, m) * C64::new(s[m], 0.0));
            }
        }
    }
    out
}

fn entanglement_entropy(s: &[f64]) -> f64 {
    s.iter()
        .map(|&si| {
            let p = si * si;
            if p > 1e-300 {
                -p * p.ln()
            } else {
                0.0
            }
        })
        .sum()
}

/// Optimizes the bond `(l, l + 1)`: loads the two site tensors and adjacent
/// environments, runs matrix-free Lanczos on the two-site state, splits the
/// result by truncated SVD, reassigns the MPS tensors, and grows the
/// environment that now needs to cover one more site.
///
/// `l_block`/`r_block` are indexed by absolute chain position: `left[p]`
/// covers sites `[0, p)`, `right[p]` covers sites `[p, n)`.
pub fn update_bond(
    mps: &mut Mps,
    mpo: &Mpo,
    cache: &mut BlockCache,
    l: usize,
    direction: Direction,
    params: &SweepParams,
) -> Result<BondReport, SweepError> {
    let r = l + 1;
    let a = mps.get(l)?.clone();
    let b = mps.get(r)?.clone();
    let state0 = contract_bond(&a, &b);

    let l_block = cache.read_left(l)?.clone();
    let r_block = cache.read_right(r + 1)?.clone();

    let apply = |s: &GTensor4| {
        effective_hamiltonian::apply(&l_block, &mpo.sites[l], &mpo.sites[r], &r_block, s)
    };

    let lanczos_params = LanczosParams {
        error: params.lancz_params.error,
        max_iterations: params.lancz_params.max_iterations,
    };
    let result = dmrg_lanczos::run(state0, apply, &lanczos_params);

    let trunc = TruncParams {
        trunc_err: params.trunc_err,
        d_min: params.d_min,
        d_max: params.d_max,
    };
    let (u, s, vt, trunc_error, kept_dim) = svd_two_site(&result.gs_vec, &trunc)?;
    let entropy = entanglement_entropy(&s);

    match direction {
        Direction::Right => {
            mps.set_canonical(l, u);
            let sv = absorb_s_left(&s, &vt);
            mps.set_canonical(r, sv);
            mps.set_center(r);
            let new_left = grow::grow_left(&l_block, mps.get(l)?, &mpo.sites[l]);
            cache.write_left(l + 1, new_left)?;
        }
        Direction::Left => {
            let us = absorb_s_right(&u, &s);
            mps.set_canonical(l, us);
            mps.set_canonical(r, vt);
            mps.set_center(l);
            let new_right = grow::grow_right(&r_block, mps.get(r)?, &mpo.sites[r]);
            cache.write_right(r, new_right)?;
        }
    }

    Ok(BondReport {
        l,
        r,
        energy: result.gs_eng,
        trunc_error,
        kept_dim,
        lanczos_iters: result.iters,
        entanglement_entropy: entropy,
    })
}
