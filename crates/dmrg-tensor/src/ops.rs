use crate::tensor::{C64, GTensor3, GTensor4};

/// Conjugate every element; the returned tensor is `A†` with its divergence
/// flipped, matching the `Dag` external primitive.
pub fn dag3(a: &GTensor3) -> GTensor3 {
    GTensor3 {
        data: a.data.iter().map(|v| v.conj()).collect(),
        dl: a.dl,
        dp: a.dp,
        dr: a.dr,
        div: -a.div,
    }
}

pub fn dag4(a: &GTensor4) -> GTensor4 {
    GTensor4 {
        data: a.data.iter().map(|v| v.conj()).collect(),
        dl: a.dl,
        dpl: a.dpl,
        dpr: a.dpr,
        dr: a.dr,
        div: -a.div,
    }
}

/// Full-axis contraction `<a|b>` against `dag(a)`.
pub fn inner3(a: &GTensor3, b: &GTensor3) -> C64 {
    a.data
        .iter()
        .zip(b.data.iter())
        .map(|(x, y)| x.conj() * y)
        .sum()
}

pub fn inner4(a: &GTensor4, b: &GTensor4) -> C64 {
    a.data
        .iter()
        .zip(b.data.iter())
        .map(|(x, y)| x.conj() * y)
        .sum()
}

fn norm_of(data: &[C64]) -> f64 {
    data.iter().map(|v| v.norm_sqr()).sum::<f64>().sqrt()
}

/// Normalizes `a` in place, returning the pre-normalization norm. A
/// zero-norm tensor is left untouched (the caller treats `norm == 0.0` as
/// Lanczos breakdown).
pub fn normalize3(a: &mut GTensor3) -> f64 {
    let n = norm_of(&a.data);
    if n > 0.0 {
        for v in a.data.iter_mut() {
            *v /= n;
        }
    }
    n
}

pub fn normalize4(a: &mut GTensor4) -> f64 {
    let n = norm_of(&a.data);
    if n > 0.0 {
        for v in a.data.iter_mut() {
            *v /= n;
        }
    }
    n
}

/// `a += coef * b`, element-wise. `a` and `b` must share shape.
pub fn scale_add3(a: &mut GTensor3, coef: C64, b: &GTensor3) {
    debug_assert_eq!((a.dl, a.dp, a.dr), (b.dl, b.dp, b.dr));
    for (x, y) in a.data.iter_mut().zip(b.data.iter()) {
        *x += coef * y;
    }
}

pub fn scale_add4(a: &mut GTensor4, coef: C64, b: &GTensor4) {
    debug_assert_eq!((a.dl, a.dpl, a.dpr, a.dr), (b.dl, b.dpl, b.dpr, b.dr));
    for (x, y) in a.data.iter_mut().zip(b.data.iter()) {
        *x += coef * y;
    }
}

/// `out = beta*out + sum_i coefs[i]*vecs[i]`, the `LinearCombine` external
/// primitive, specialized to rank-4 Krylov-basis recombination.
pub fn linear_combine4(coefs: &[C64], vecs: &[&GTensor4], beta: C64, out: &mut GTensor4) {
    debug_assert_eq!(coefs.len(), vecs.len());
    for v in out.data.iter_mut() {
        *v *= beta;
    }
    for (&c, v) in coefs.iter().zip(vecs.iter()) {
        for (x, y) in out.data.iter_mut().zip(v.data.iter()) {
            *x += c * y;
        }
    }
}

/// Joins two neighboring site tensors along their shared bond into the
/// rank-4 two-site state `(left-bond, phys-L, phys-R, right-bond)`.
pub fn contract_bond(a: &GTensor3, b: &GTensor3) -> GTensor4 {
    assert_eq!(a.dr, b.dl, "shared bond dimension mismatch");
    let mut out = GTensor4::zeros(a.dl, a.dp, b.dp, b.dr);
    out.div = a.div + b.div;
    for l in 0..a.dl {
        for p1 in 0..a.dp {
            for m in 0..a.dr {
                let av = a.get(l, p1, m);
                if av == C64::new(0.0, 0.0) {
                    continue;
                }
                for p2 in 0..b.dp {
                    for r in 0..b.dr {
                        let v = av * b.get(m, p2, r);
                        let cur = out.get(l, p1, p2, r);
                        out.set(l, p1, p2, r, cur + v);
                    }
                }
            }
        }
    }
    out
}

/// Retrieves the charge divergence of a tensor (the `Div` external
/// primitive).
pub fn div3(a: &GTensor3) -> i64 {
    a.div
}

pub fn div4(a: &GTensor4) -> i64 {
    a.div
}
