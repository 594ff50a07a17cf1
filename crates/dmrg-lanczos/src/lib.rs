pub mod tridiag;

use dmrg_tensor::{C64, GTensor4, linear_combine4, normalize4, scale_add4};
use tridiag::Mode;

/// The state type the matrix-free Lanczos recursion operates on. Only the
/// handful of vector-space operations the algorithm needs are required;
/// the solver never inspects tensor shape or physical meaning.
pub trait LanczosState: Clone {
    /// Total element count, used for the `m == dim(v0)` stopping criterion.
    fn dim(&self) -> usize;
    /// Normalizes in place, returning the pre-normalization norm.
    fn normalize(&mut self) -> f64;
    /// `<self|other>`.
    fn inner(&self, other: &Self) -> C64;
    /// `self += coef * other`.
    fn scale_add(&mut self, coef: C64, other: &Self);
    /// `sum_i coefs[i] * vecs[i]`.
    fn linear_combine(coefs: &[C64], vecs: &[&Self]) -> Self;
}

impl LanczosState for GTensor4 {
    fn dim(&self) -> usize {
        self.data.len()
    }

    fn normalize(&mut self) -> f64 {
        normalize4(self)
    }

    fn inner(&self, other: &Self) -> C64 {
        dmrg_tensor::inner4(self, other)
    }

    fn scale_add(&mut self, coef: C64, other: &Self) {
        scale_add4(self, coef, other)
    }

    fn linear_combine(coefs: &[C64], vecs: &[&Self]) -> Self {
        let mut out = vecs[0].clone();
        for v in out.data.iter_mut() {
            *v = C64::new(0.0, 0.0);
        }
        linear_combine4(coefs, vecs, C64::new(0.0, 0.0), &mut out);
        out
    }
}

#[derive(Clone, Copy, Debug)]
pub struct LanczosParams {
    pub error: f64,
    pub max_iterations: usize,
}

pub struct LanczosResult<S> {
    pub iters: usize,
    pub gs_eng: f64,
    pub gs_vec: S,
}

/// Matrix-free Lanczos diagonalizer: `apply` is the only way the solver
/// touches the operator, so callers (the two-site effective-Hamiltonian
/// matvec, or a test fixture's dense matrix) never need to materialize `H`
/// for this solver's sake.
///
/// Uses a one-sided convergence comparison (`E - E_new < error`, not
/// `|E - E_new|`) and handles breakdown (a zero-norm residual) at `m == 1`
/// by returning the exact eigenvector immediately.
pub fn run<S, F>(v0: S, mut apply: F, params: &LanczosParams) -> LanczosResult<S>
where
    S: LanczosState,
    F: FnMut(&S) -> S,
{
    let dim = v0.dim();
    let mut b0 = v0;
    b0.normalize();
    let mut w_prev = apply(&b0);
    let alpha0 = b0.inner(&w_prev).re;

    let mut basis = vec![b0.clone()];
    let mut alphas = vec![alpha0];
    let mut betas: Vec<f64> = Vec::new();

    let mut b_prev = b0;
    let mut alpha_prev = alpha0;
    let mut energy = alpha0;

    let mut m = 0usize;
    loop {
        m += 1;

        let mut gamma = w_prev;
        gamma.scale_add(C64::new(-alpha_prev, 0.0), &b_prev);
        if m >= 2 {
            let beta_m_minus_2 = betas[m - 2];
            let b_m_minus_2 = &basis[m - 2];
            gamma.scale_add(C64::new(-beta_m_minus_2, 0.0), b_m_minus_2);
        }

        let eta = gamma.normalize();

        if eta == 0.0 {
            if m == 1 {
                return LanczosResult {
                    iters: 1,
                    gs_eng: alphas[0],
                    gs_vec: basis[0].clone(),
                };
            }
            let (eigval, eigvec) = tridiag::ground_state(&alphas, &betas, Mode::Full);
            let refs: Vec<&S> = basis.iter().collect();
            let coefs: Vec<C64> = eigvec.into_iter().map(|c| C64::new(c, 0.0)).collect();
            let gs_vec = S::linear_combine(&coefs, &refs);
            return LanczosResult {
                iters: m,
                gs_eng: eigval,
                gs_vec,
            };
        }

        let b_m = gamma;
        betas.push(eta);
        let w_m = apply(&b_m);
        let alpha_m = b_m.inner(&w_m).re;

        alphas.push(alpha_m);
        basis.push(b_m.clone());

        let (e_new, _) = tridiag::ground_state(&alphas, &betas, Mode::ValueOnly);

        let converged = (energy - e_new) < params.error
            || m == dim
            || m + 1 == params.max_iterations;

        if converged {
            let (eigval, eigvec) = tridiag::ground_state(&alphas, &betas, Mode::Full);
            let refs: Vec<&S> = basis.iter().collect();
            let coefs: Vec<C64> = eigvec.into_iter().map(|c| C64::new(c, 0.0)).collect();
            let gs_vec = S::linear_combine(&coefs, &refs);
            return LanczosResult {
                iters: m,
                gs_eng: eigval,
                gs_vec,
            };
        }

        energy = e_new;
        w_prev = w_m;
        b_prev = b_m;
        alpha_prev = alpha_m;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A plain dense-vector state (not a tensor) so Lanczos correctness can
    /// be checked directly against dense Hermitian matrices.
    #[derive(Clone)]
    struct Vector(Vec<C64>);

    impl LanczosState for Vector {
        fn dim(&self) -> usize {
            self.0.len()
        }
        fn normalize(&mut self) -> f64 {
            let n: f64 = self.0.iter().map(|x| x.norm_sqr()).sum::<f64>().sqrt();
            if n > 0.0 {
                for v in self.0.iter_mut() {
                    *v /= n;
                }
            }
            n
        }
        fn inner(&self, other: &Self) -> C64 {
            self.0
                .iter()
                .zip(other.0.iter())
                .map(|(a, b)| a.conj() * b)
                .sum()
        }
        fn scale_add(&mut self, coef: C64, other: &Self) {
            for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
                *a += coef * b;
            }
        }
        fn linear_combine(coefs: &[C64], vecs: &[&Self]) -> Self {
            let n = vecs[0].0.len();
            let mut out = vec![C64::new(0.0, 0.0); n];
            for (&c, v) in coefs.iter().zip(vecs.iter()) {
                for i in 0..n {
                    out[i] += c * v.0[i];
                }
            }
            Vector(out)
        }
    }

    fn matvec(mat: &[Vec<C64>], v: &Vector) -> Vector {
        let n = mat.len();
        let mut out = vec![C64::new(0.0, 0.0); n];
        for i in 0..n {
            for j in 0..n {
                out[i] += mat[i][j] * v.0[j];
            }
        }
        Vector(out)
    }

    /// Deterministic splitmix64 stream seeded from a string, producing
    /// `f64` values in `[0, 1)` for randomized test fixtures.
    struct TestRng(u64);

    impl TestRng {
        fn new(seed: &str) -> Self {
            let mut h: u64 = 0xcbf29ce484222325;
            for b in seed.bytes() {
                h ^= b as u64;
                h = h.wrapping_mul(0x100000001b3);
            }
            Self(h)
        }

        fn next_f64(&mut self) -> f64 {
            self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
            let mut z = self.0;
            z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
            z ^= z >> 31;
            (z >> 11) as f64 / (1u64 << 53) as f64
        }
    }

    /// A random `2x2` Hermitian `[[a, b], [conj(b), d]]` with `a, d` real
    /// and its exact ground energy from the closed-form eigenvalue formula,
    /// an independent reference that never calls into `run` itself.
    fn random_hermitian_2x2(rng: &mut TestRng) -> (Vec<Vec<C64>>, f64) {
        let a = rng.next_f64() * 4.0 - 2.0;
        let d = rng.next_f64() * 4.0 - 2.0;
        let b_re = rng.next_f64() * 2.0 - 1.0;
        let b_im = rng.next_f64() * 2.0 - 1.0;
        let b = C64::new(b_re, b_im);

        let mat = vec![
            vec![C64::new(a, 0.0), b],
            vec![b.conj(), C64::new(d, 0.0)],
        ];
        let ground = (a + d) / 2.0 - (((a - d) / 2.0).powi(2) + b.norm_sqr()).sqrt();
        (mat, ground)
    }

    #[test]
    fn breakdown_at_m_equals_one_returns_exact_eigenvector() {
        // v0 is already an eigenvector of the diagonal matrix -> Hv0 = a*v0
        // exactly, so gamma is zero on the very first iteration.
        let mat = vec![
            vec![C64::new(5.0, 0.0), C64::new(0.0, 0.0)],
            vec![C64::new(0.0, 0.0), C64::new(-2.0, 0.0)],
        ];
        let v0 = Vector(vec![C64::new(0.0, 0.0), C64::new(1.0, 0.0)]);
        let params = LanczosParams {
            error: 1e-10,
            max_iterations: 50,
        };
        let result = run(v0, |v| matvec(&mat, v), &params);
        assert_eq!(result.iters, 1);
        assert!((result.gs_eng - (-2.0)).abs() < 1e-12);
    }

    #[test]
    fn matches_dense_diagonalization_for_a_small_hermitian_operator() {
        // H = [[2, 1], [1, 2]] has eigenvalues {1, 3}; ground energy = 1.
        let mat = vec![
            vec![C64::new(2.0, 0.0), C64::new(1.0, 0.0)],
            vec![C64::new(1.0, 0.0), C64::new(2.0, 0.0)],
        ];
        let v0 = Vector(vec![C64::new(1.0, 0.0), C64::new(0.3, 0.0)]);
        let params = LanczosParams {
            error: 1e-12,
            max_iterations: 50,
        };
        let result = run(v0, |v| matvec(&mat, v), &params);
        assert!((result.gs_eng - 1.0).abs() < 1e-8);

        // (H - E*I) gs_vec has norm below 100*error*||H||.
        let hv = matvec(&mat, &result.gs_vec);
        let mut residual = hv;
        residual.scale_add(C64::new(-result.gs_eng, 0.0), &result.gs_vec);
        let res_norm: f64 = residual.0.iter().map(|x| x.norm_sqr()).sum::<f64>().sqrt();
        assert!(res_norm < 100.0 * params.error * 3.0);
    }

    #[test]
    fn matches_closed_form_ground_energy_for_random_hermitian_operators() {
        let params = LanczosParams {
            error: 1e-12,
            max_iterations: 50,
        };
        for seed in 0..8u64 {
            let mut rng = TestRng::new(&format!("lanczos-random-hermitian-{seed}"));
            let (mat, expected) = random_hermitian_2x2(&mut rng);
            let h_norm = mat.iter().flatten().map(|c| c.norm()).fold(0.0, f64::max) * 2.0;

            let v0 = Vector(vec![
                C64::new(rng.next_f64(), rng.next_f64()),
                C64::new(rng.next_f64(), rng.next_f64()),
            ]);
            let result = run(v0, |v| matvec(&mat, v), &params);

            assert!(
                (result.gs_eng - expected).abs() < 10.0 * params.error,
                "seed {seed}: {} vs {expected}",
                result.gs_eng
            );

            let hv = matvec(&mat, &result.gs_vec);
            let mut residual = hv;
            residual.scale_add(C64::new(-result.gs_eng, 0.0), &result.gs_vec);
            let res_norm: f64 = residual.0.iter().map(|x| x.norm_sqr()).sum::<f64>().sqrt();
            assert!(
                res_norm < 100.0 * params.error * h_norm.max(1.0),
                "seed {seed}: residual norm {res_norm} too large"
            );
        }
    }
}
