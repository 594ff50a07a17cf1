use dmrg_block::BlockGroup;
use dmrg_core::config::SweepParams;
use dmrg_core::sweep::Sweeper;
use dmrg_core::two_site::{self, Direction};
use dmrg_core::Mps;
use dmrg_mpo::{builders, MpoSite};
use dmrg_tensor::{normalize3, GTensor3, C64};

fn product_state(n: usize, phys_dim: usize) -> Mps {
    let mut sites = Vec::with_capacity(n);
    for _ in 0..n {
        let mut t = GTensor3::zeros(1, phys_dim, 1);
        t.set(0, 0, 0, C64::new(1.0, 0.0));
        sites.push(t);
    }
    Mps::new(sites)
}

/// Norm preservation: a mixed-canonical MPS has unit norm equal to the norm
/// of its center tensor alone, so a sweep that keeps the chain canonical
/// should leave that tensor's norm close to 1.
#[test]
fn norm_stays_close_to_one_across_a_sweep() {
    let n = 6;
    let mps = product_state(n, 2);
    let mpo = builders::ising(n, 1.0, 1.0);
    let params = SweepParams {
        sweeps: 1,
        d_min: 1,
        d_max: 8,
        trunc_err: 1e-9,
        ..SweepParams::default()
    };
    let mut sweeper = Sweeper::new(mps, mpo, params).unwrap();
    sweeper.run().unwrap();

    let c = sweeper.mps.center().expect("sweep leaves a canonical center");
    let mut center = sweeper.mps.get(c).unwrap().clone();
    let norm = normalize3(&mut center);
    assert!((norm - 1.0).abs() < 1e-6, "center norm {norm} drifted from 1");
}

/// Environment consistency: `L[2]` built by two `grow_left` steps must
/// match a from-scratch contraction of the same two-site block that never
/// calls `grow_left`.
#[test]
fn left_environment_matches_a_from_scratch_contraction() {
    let n = 3;
    let mps = product_state(n, 2);
    let mpo = builders::ising(n, 1.0, 1.0);

    let a0 = mps.get(0).unwrap();
    let a1 = mps.get(1).unwrap();
    let w0 = &mpo.sites[0];
    let w1 = &mpo.sites[1];

    let via_grow = {
        let l0 = BlockGroup::trivial();
        let l1 = dmrg_core::grow::grow_left(&l0, a0, w0);
        dmrg_core::grow::grow_left(&l1, a1, w1)
    };
    let from_scratch = reference_left_environment(a0, a1, w0, w1);

    assert_eq!(via_grow.bond_dim(), from_scratch.bond_dim());
    for k in 0..via_grow.bond_dim() {
        let got = &via_grow.tensors[k];
        let want = &from_scratch.tensors[k];
        for lp in 0..got.dl {
            for l in 0..got.dr {
                let g = got.get(lp, 0, l);
                let w = want.get(lp, 0, l);
                assert!((g - w).norm() < 1e-10, "mismatch at k={k} lp={lp} l={l}: {g} vs {w}");
            }
        }
    }
}

/// Independent implementation of a two-site `L[2]`: sums directly over the
/// shared MPO bond and both MPS site tensors rather than chaining the
/// production `grow_left` step.
fn reference_left_environment(
    site0: &GTensor3,
    site1: &GTensor3,
    w0: &MpoSite,
    w1: &MpoSite,
) -> BlockGroup {
    let new_bond = site1.dr;
    let mut tensors = Vec::with_capacity(w1.cols());
    for k in 0..w1.cols() {
        let mut t = GTensor3::zeros(new_bond, 1, new_bond);
        for lp in 0..new_bond {
            for l in 0..new_bond {
                let mut acc = C64::new(0.0, 0.0);
                for j in 0..w0.cols() {
                    let (Some(op0), Some(op1)) = (w0.at(0, j), w1.at(j, k)) else {
                        continue;
                    };
                    for p0p in 0..site0.dp {
                        for p0 in 0..site0.dp {
                            let wv0 = op0.get(p0p, p0);
                            if wv0 == C64::new(0.0, 0.0) {
                                continue;
                            }
                            for m0p in 0..site0.dr {
                                for m0 in 0..site0.dr {
                                    for p1p in 0..site1.dp {
                                        for p1 in 0..site1.dp {
                                            let wv1 = op1.get(p1p, p1);
                                            if wv1 == C64::new(0.0, 0.0) {
                                                continue;
                                            }
                                            let a0 = site0.get(0, p0p, m0p).conj()
                                                * site0.get(0, p0, m0);
                                            let a1 = site1.get(m0p, p1p, lp).conj()
                                                * site1.get(m0, p1, l);
                                            acc += wv0 * wv1 * a0 * a1;
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
                t.set(lp, 0, l, acc);
            }
        }
        tensors.push(t);
    }
    BlockGroup { tensors }
}

/// Energy monotonicity: across a single full sweep the reported
/// ground-state energy must not increase by more than `lancz_params.error`.
#[test]
fn energy_does_not_increase_across_a_sweep_beyond_tolerance() {
    let n = 8;
    let mps = product_state(n, 2);
    let mpo = builders::heisenberg(n, 1.0);
    let params = SweepParams {
        sweeps: 1,
        d_min: 1,
        d_max: 16,
        trunc_err: 1e-9,
        ..SweepParams::default()
    };
    let mut sweeper = Sweeper::new(mps, mpo, params).unwrap();
    sweeper.initialize().unwrap();

    let n_sites = sweeper.mps.len();
    let mut energies = Vec::new();
    for l in 0..n_sites - 2 {
        let report = two_site::update_bond(
            &mut sweeper.mps,
            &sweeper.mpo,
            &mut sweeper.cache,
            l,
            Direction::Right,
            &sweeper.params,
        )
        .unwrap();
        energies.push(report.energy);
    }
    for l in (1..n_sites - 1).rev() {
        let report = two_site::update_bond(
            &mut sweeper.mps,
            &sweeper.mpo,
            &mut sweeper.cache,
            l,
            Direction::Left,
            &sweeper.params,
        )
        .unwrap();
        energies.push(report.energy);
    }

    let tol = sweeper.params.lancz_params.error.max(1e-8);
    let first = *energies.first().unwrap();
    let last = *energies.last().unwrap();
    assert!(
        last <= first + tol,
        "energy rose from {first} to {last} across the sweep, beyond tolerance {tol}"
    );
}
