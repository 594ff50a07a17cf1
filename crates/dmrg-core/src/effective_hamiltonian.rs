use dmrg_block::BlockGroup;
use dmrg_mpo::MpoSite;
use dmrg_tensor::{scale_add4, GTensor4, C64};

/// One non-null `(L_env, W_left, W_right, R_env)` quadruple for the current
/// bond. Borrowed, not owned: forbidden from outliving the bond update that
/// produced it.
pub struct EffTerm<'a> {
    pub l_env: &'a dmrg_tensor::GTensor3,
    pub w_left: &'a dmrg_tensor::GTensor2,
    pub w_right: &'a dmrg_tensor::GTensor2,
    pub r_env: &'a dmrg_tensor::GTensor3,
}

/// Enumerates the term group for bond `(l_site, l_site + 1)` in a fixed,
/// deterministic `(i, j, k)` order.
pub fn terms<'a>(
    l_block: &'a BlockGroup,
    w_left: &'a MpoSite,
    w_right: &'a MpoSite,
    r_block: &'a BlockGroup,
) -> Vec<EffTerm<'a>> {
    let mut out = Vec::new();
    for i in 0..w_left.rows() {
        for j in 0..w_left.cols() {
            if w_left.is_null(i, j) {
                continue;
            }
            for k in 0..w_right.cols() {
                if w_right.is_null(j, k) {
                    continue;
                }
                out.push(EffTerm {
                    l_env: &l_block.tensors[i],
                    w_left: w_left.at(i, j).expect("checked non-null"),
                    w_right: w_right.at(j, k).expect("checked non-null"),
                    r_env: &r_block.tensors[k],
                });
            }
        }
    }
    out
}

/// `t0 = state . L_env`, contracting the state's left-bond index against
/// `L_env`'s bra index.
fn contract_left_env(term: &EffTerm, state: &GTensor4) -> GTensor4 {
    let (dl, dpl, dpr, dr) = state.shape();
    let mut out = GTensor4::zeros(dl, dpl, dpr, dr);
    for lp in 0..dl {
        for l in 0..dl {
            let lv = term.l_env.get(lp, 0, l);
            if lv == C64::new(0.0, 0.0) {
                continue;
            }
            for pl in 0..dpl {
                for pr in 0..dpr {
                    for r in 0..dr {
                        let cur = out.get(lp, pl, pr, r);
                        out.set(lp, pl, pr, r, cur + lv * state.get(l, pl, pr, r));
                    }
                }
            }
        }
    }
    out
}

/// `t1 = t0 . W_left`, contracting the left physical index.
fn contract_w_left(term: &EffTerm, t0: &GTensor4) -> GTensor4 {
    let (dl, dpl, dpr, dr) = t0.shape();
    let mut out = GTensor4::zeros(dl, dpl, dpr, dr);
    for plp in 0..dpl {
        for pl in 0..dpl {
            let wv = term.w_left.get(plp, pl);
            if wv == C64::new(0.0, 0.0) {
                continue;
            }
            for l in 0..dl {
                for pr in 0..dpr {
                    for r in 0..dr {
                        let cur = out.get(l, plp, pr, r);
                        out.set(l, plp, pr, r, cur + wv * t0.get(l, pl, pr, r));
                    }
                }
            }
        }
    }
    out
}

/// `t2 = t1 . W_right`, contracting the right physical index.
fn contract_w_right(term: &EffTerm, t1: &GTensor4) -> GTensor4 {
    let (dl, dpl, dpr, dr) = t1.shape();
    let mut out = GTensor4::zeros(dl, dpl, dpr, dr);
    for prp in 0..dpr {
        for pr in 0..dpr {
            let wv = term.w_right.get(prp, pr);
            if wv == C64::new(0.0, 0.0) {
                continue;
            }
            for l in 0..dl {
                for pl in 0..dpl {
                    for r in 0..dr {
                        let cur = out.get(l, pl, prp, r);
                        out.set(l, pl, prp, r, cur + wv * t1.get(l, pl, pr, r));
                    }
                }
            }
        }
    }
    out
}

/// `result = t2 . R_env`, contracting the state's right-bond index against
/// `R_env`'s bra index.
fn contract_right_env(term: &EffTerm, t2: &GTensor4) -> GTensor4 {
    let (dl, dpl, dpr, dr) = t2.shape();
    let mut out = GTensor4::zeros(dl, dpl, dpr, dr);
    for rp in 0..dr {
        for r in 0..dr {
            let rv = term.r_env.get(rp, 0, r);
            if rv == C64::new(0.0, 0.0) {
                continue;
            }
            for l in 0..dl {
                for pl in 0..dpl {
                    for pr in 0..dpr {
                        let cur = out.get(l, pl, pr, rp);
                        out.set(l, pl, pr, rp, cur + rv * t2.get(l, pl, pr, r));
                    }
                }
            }
        }
    }
    out
}

fn apply_term(term: &EffTerm, state: &GTensor4) -> GTensor4 {
    let t0 = contract_left_env(term, state);
    let t1 = contract_w_left(term, &t0);
    let t2 = contract_w_right(term, &t1);
    contract_right_env(term, &t2)
}

/// Applies the effective Hamiltonian at the current bond to `state`: the
/// matrix-free multiply callback Lanczos consumes.
pub fn apply(
    l_block: &BlockGroup,
    w_left: &MpoSite,
    w_right: &MpoSite,
    r_block: &BlockGroup,
    state: &GTensor4,
) -> GTensor4 {
    let (dl, dpl, dpr, dr) = state.shape();
    let mut out = GTensor4::zeros(dl, dpl, dpr, dr);
    out.div = state.div;
    for term in terms(l_block, w_left, w_right, r_block) {
        let contrib = apply_term(&term, state);
        scale_add4(&mut out, C64::new(1.0, 0.0), &contrib);
    }
    out
}
