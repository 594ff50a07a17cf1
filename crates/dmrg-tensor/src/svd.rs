use crate::error::TensorError;
use crate::tensor::{C64, GTensor3, GTensor4};
use faer::Mat;

/// Truncation policy for an SVD split: keep the smallest `D` within
/// `[d_min, d_max]` whose discarded weight (sum of squared dropped
/// singular values) is at most `trunc_err`; if no such `D` exists within
/// `d_max`, keep `d_max` and report the actual (larger) discarded weight.
#[derive(Clone, Copy, Debug)]
pub struct TruncParams {
    pub trunc_err: f64,
    pub d_min: usize,
    pub d_max: usize,
}

impl TruncParams {
    /// No truncation: used by plain canonicalization sweeps that must not
    /// lose any weight.
    pub fn exact() -> Self {
        Self {
            trunc_err: 0.0,
            d_min: 1,
            d_max: usize::MAX,
        }
    }
}

struct DenseSvd {
    u: Vec<C64>,
    s: Vec<f64>,
    vt: Vec<C64>,
    kept: usize,
    trunc_error: f64,
}

fn svd_dense(data: &[C64], rows: usize, cols: usize, params: &TruncParams) -> Result<DenseSvd, TensorError> {
    if rows == 0 || cols == 0 {
        return Err(TensorError::EmptySvd { rows, cols });
    }

    let mut mat = Mat::<C64>::zeros(rows, cols);
    for r in 0..rows {
        for c in 0..cols {
            mat.write(r, c, data[r * cols + c]);
        }
    }

    let svd = mat.thin_svd();
    let s = svd.s_diagonal();
    let k = rows.min(cols);

    let mut s_vals = Vec::with_capacity(k);
    for i in 0..k {
        s_vals.push(s.read(i).re);
    }

    let upper = params.d_max.min(k).max(1);
    let lower = params.d_min.min(upper).max(1);
    let mut kept = upper;
    for d in lower..=upper {
        let discarded: f64 = s_vals[d..k].iter().map(|x| x * x).sum();
        if discarded <= params.trunc_err {
            kept = d;
            break;
        }
    }
    let trunc_error: f64 = s_vals[kept..k].iter().map(|x| x * x).sum();

    let u_full = svd.u();
    let v_full = svd.v();
    let u_mat = u_full.submatrix(0, 0, u_full.nrows(), kept);
    let v_mat = v_full.submatrix(0, 0, v_full.nrows(), kept);

    let mut u = Vec::with_capacity(rows * kept);
    for r in 0..rows {
        for c in 0..kept {
            u.push(u_mat.read(r, c));
        }
    }

    let mut vt = Vec::with_capacity(kept * cols);
    for c in 0..kept {
        for r in 0..cols {
            vt.push(v_mat.read(r, c).conj());
        }
    }

    Ok(DenseSvd {
        u,
        s: s_vals[..kept].to_vec(),
        vt,
        kept,
        trunc_error,
    })
}

/// Splits the optimized two-site state (left-bond count = 2) into
/// `(U, s, Vt, trunc_error, kept_dim)`.
pub fn svd_two_site(
    state: &GTensor4,
    params: &TruncParams,
) -> Result<(GTensor3, Vec<f64>, GTensor3, f64, usize), TensorError> {
    let (dl, dpl, dpr, dr) = state.shape();
    let rows = dl * dpl;
    let cols = dpr * dr;

    let mut mat = vec![C64::new(0.0, 0.0); rows * cols];
    for l in 0..dl {
        for pl in 0..dpl {
            for pr in 0..dpr {
                for r in 0..dr {
                    mat[(l * dpl + pl) * cols + pr * dr + r] = state.get(l, pl, pr, r);
                }
            }
        }
    }

    let out = svd_dense(&mat, rows, cols, params)?;
    let kept = out.kept;

    let mut u = GTensor3::zeros(dl, dpl, kept);
    for l in 0..dl {
        for pl in 0..dpl {
            for m in 0..kept {
                u.set(l, pl, m, out.u[(l * dpl + pl) * kept + m]);
            }
        }
    }

    let mut vt = GTensor3::zeros(kept, dpr, dr);
    for m in 0..kept {
        for pr in 0..dpr {
            for r in 0..dr {
                vt.set(m, pr, r, out.vt[m * cols + pr * dr + r]);
            }
        }
    }

    Ok((u, out.s, vt, out.trunc_error, kept))
}

/// Splits a site tensor with left-dimension grouping `(dl, dp)` against
/// `dr`, for `LeftCanonicalizeAt`. Returns the left-isometric factor and
/// the raw `S·Vᵀ` matrix (row-major, `kept x dr`) to be absorbed into the
/// next site.
pub fn svd_left(t: &GTensor3, params: &TruncParams) -> Result<(GTensor3, Vec<C64>, usize), TensorError> {
    let rows = t.dl * t.dp;
    let cols = t.dr;

    let mut mat = vec![C64::new(0.0, 0.0); rows * cols];
    for l in 0..t.dl {
        for p in 0..t.dp {
            for r in 0..cols {
                mat[(l * t.dp + p) * cols + r] = t.get(l, p, r);
            }
        }
    }

    let out = svd_dense(&mat, rows, cols, params)?;
    let kept = out.kept;

    let mut u = GTensor3::zeros(t.dl, t.dp, kept);
    u.div = t.div;
    for l in 0..t.dl {
        for p in 0..t.dp {
            for m in 0..kept {
                u.set(l, p, m, out.u[(l * t.dp + p) * kept + m]);
            }
        }
    }

    let mut sv = vec![C64::new(0.0, 0.0); kept * cols];
    for m in 0..kept {
        for r in 0..cols {
            sv[m * cols + r] = C64::new(out.s[m], 0.0) * out.vt[m * cols + r];
        }
    }

    Ok((u, sv, kept))
}

/// Mirror of [`svd_left`] for `RightCanonicalizeAt`: groups `(dp, dr)` on
/// the right, returns the raw `U·S` matrix (row-major, `dl x kept`) to be
/// absorbed into the previous site and the right-isometric factor.
pub fn svd_right(t: &GTensor3, params: &TruncParams) -> Result<(Vec<C64>, GTensor3, usize), TensorError> {
    let rows = t.dl;
    let cols = t.dp * t.dr;

    let mut mat = vec![C64::new(0.0, 0.0); rows * cols];
    for l in 0..rows {
        for p in 0..t.dp {
            for r in 0..t.dr {
                mat[l * cols + p * t.dr + r] = t.get(l, p, r);
            }
        }
    }

    let out = svd_dense(&mat, rows, cols, params)?;
    let kept = out.kept;

    let mut us = vec![C64::new(0.0, 0.0); rows * kept];
    for l in 0..rows {
        for m in 0..kept {
            us[l * kept + m] = out.u[l * kept + m] * C64::new(out.s[m], 0.0);
        }
    }

    let mut vt = GTensor3::zeros(kept, t.dp, t.dr);
    vt.div = t.div;
    for m in 0..kept {
        for p in 0..t.dp {
            for r in 0..t.dr {
                vt.set(m, p, r, out.vt[m * cols + p * t.dr + r]);
            }
        }
    }

    Ok((us, vt, kept))
}
