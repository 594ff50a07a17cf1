use dmrg_block::BlockGroup;
use dmrg_mpo::MpoSite;
use dmrg_tensor::{GTensor3, C64};
use rayon::prelude::*;

/// `GrowLeft(L_old, A, W_s)`: for each outgoing MPO bond `j`, sums over
/// incoming `i` the triple contraction of `L_old[i]`, `W_s(i, j)`, and `A`,
/// closed with `Dag(A)` on the upper legs. Output bonds are independent, so
/// they're computed in parallel.
pub fn grow_left(l_old: &BlockGroup, a: &GTensor3, w_s: &MpoSite) -> BlockGroup {
    let new_bond = a.dr;
    let tensors = (0..w_s.cols())
        .into_par_iter()
        .map(|j| {
        let mut t = GTensor3::zeros(new_bond, 1, new_bond);
        for i in 0..w_s.rows() {
            let Some(op) = w_s.at(i, j) else { continue };
            let l_old_i = &l_old.tensors[i];
            for lp in 0..new_bond {
                for l in 0..new_bond {
                    let mut acc = C64::new(0.0, 0.0);
                    for mp in 0..a.dl {
                        for m in 0..a.dl {
                            let lenv = l_old_i.get(mp, 0, m);
                            if lenv == C64::new(0.0, 0.0) {
                                continue;
                            }
                            for pp in 0..a.dp {
                                for p in 0..a.dp {
                                    let wv = op.get(pp, p);
                                    if wv == C64::new(0.0, 0.0) {
                                        continue;
                                    }
                                    acc += a.get(mp, pp, lp).conj() * wv * lenv * a.get(m, p, l);
                                }
                            }
                        }
                    }
                    let cur = t.get(lp, 0, l);
                    t.set(lp, 0, l, cur + acc);
                }
            }
        }
        t
        })
        .collect();
    BlockGroup { tensors }
}

/// Mirror of [`grow_left`] for `GrowRight`.
pub fn grow_right(r_old: &BlockGroup, a: &GTensor3, w_s: &MpoSite) -> BlockGroup {
    let new_bond = a.dl;
    let tensors = (0..w_s.rows())
        .into_par_iter()
        .map(|i| {
        let mut t = GTensor3::zeros(new_bond, 1, new_bond);
        for j in 0..w_s.cols() {
            let Some(op) = w_s.at(i, j) else { continue };
            let r_old_j = &r_old.tensors[j];
            for lp in 0..new_bond {
                for l in 0..new_bond {
                    let mut acc = C64::new(0.0, 0.0);
                    for mp in 0..a.dr {
                        for m in 0..a.dr {
                            let renv = r_old_j.get(mp, 0, m);
                            if renv == C64::new(0.0, 0.0) {
                                continue;
                            }
                            for pp in 0..a.dp {
                                for p in 0..a.dp {
                                    let wv = op.get(pp, p);
                                    if wv == C64::new(0.0, 0.0) {
                                        continue;
                                    }
                                    acc += a.get(lp, pp, mp).conj() * wv * renv * a.get(l, p, m);
                                }
                            }
                        }
                    }
                    let cur = t.get(lp, 0, l);
                    t.set(lp, 0, l, cur + acc);
                }
            }
        }
        t
        })
        .collect();
    BlockGroup { tensors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmrg_mpo::builders;

    #[test]
    fn grow_left_of_identity_mpo_preserves_the_trivial_environment() {
        let mpo = builders::identity(3, 2);
        let mut a = GTensor3::zeros(1, 2, 1);
        a.set(0, 0, 0, C64::new(1.0, 0.0));
        let l0 = BlockGroup::trivial();
        let l1 = grow_left(&l0, &a, &mpo.sites[0]);
        assert_eq!(l1.bond_dim(), 1);
        assert!((l1.tensors[0].get(0, 0, 0).re - 1.0).abs() < 1e-12);
    }
}
