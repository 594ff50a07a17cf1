pub mod error;
mod ops;
mod svd;
mod tensor;

pub use error::TensorError;
pub use ops::{
    contract_bond, dag3, dag4, div3, div4, inner3, inner4, linear_combine4, normalize3,
    normalize4, scale_add3, scale_add4,
};
pub use svd::{svd_left, svd_right, svd_two_site, TruncParams};
pub use tensor::{C64, GTensor2, GTensor3, GTensor4};

#[cfg(test)]
mod tests {
    use super::*;

    fn basis_site(dl: usize, dp: usize, dr: usize, pick: (usize, usize, usize)) -> GTensor3 {
        let mut t = GTensor3::zeros(dl, dp, dr);
        t.set(pick.0, pick.1, pick.2, C64::new(1.0, 0.0));
        t
    }

    #[test]
    fn contract_bond_joins_shared_index() {
        let a = basis_site(1, 2, 3, (0, 1, 2));
        let b = basis_site(3, 2, 1, (2, 0, 0));
        let state = contract_bond(&a, &b);
        assert_eq!(state.shape(), (1, 2, 2, 1));
        assert_eq!(state.get(0, 1, 0, 0), C64::new(1.0, 0.0));
        assert_eq!(state.get(0, 0, 0, 0), C64::new(0.0, 0.0));
    }

    #[test]
    fn normalize_scales_to_unit_norm() {
        let mut t = GTensor3::zeros(1, 2, 1);
        t.set(0, 0, 0, C64::new(3.0, 4.0));
        let n = normalize3(&mut t);
        assert!((n - 5.0).abs() < 1e-12);
        assert!((inner3(&t, &t).re - 1.0).abs() < 1e-12);
    }

    #[test]
    fn normalize_zero_tensor_reports_zero_norm() {
        let mut t = GTensor3::zeros(1, 2, 1);
        let n = normalize3(&mut t);
        assert_eq!(n, 0.0);
    }

    #[test]
    fn svd_two_site_round_trips_a_product_state() {
        let a = basis_site(1, 2, 2, (0, 0, 0));
        let mut a = a;
        a.set(0, 0, 1, C64::new(1.0, 0.0));
        let state = contract_bond(&a, &basis_site(2, 2, 1, (0, 1, 0)));
        let (u, s, vt, eps, kept) = svd_two_site(&state, &TruncParams::exact()).unwrap();
        assert!(eps < 1e-12);
        assert!(kept >= 1);
        assert_eq!(u.dl, 1);
        assert_eq!(vt.dr, 1);
        let _ = s;
    }

    #[test]
    fn svd_two_site_truncation_matches_discarded_weight() {
        // Build a rank-4 state with 4 orthogonal, equally weighted terms
        // packed into a 4x4 bipartition: singular values are all equal.
        let mut state = GTensor4::zeros(2, 2, 2, 2);
        for i in 0..4usize {
            let l = i / 2;
            let pl = i % 2;
            state.set(l, pl, l, pl, C64::new(1.0, 0.0));
        }
        let params = TruncParams {
            trunc_err: 0.0,
            d_min: 1,
            d_max: 2,
        };
        let (_, s, _, eps, kept) = svd_two_site(&state, &params).unwrap();
        assert_eq!(kept, 2);
        let discarded: f64 = {
            let (_, full_s, _, _, _) = svd_two_site(&state, &TruncParams::exact()).unwrap();
            full_s[2..].iter().map(|x| x * x).sum()
        };
        assert!((eps - discarded).abs() < 1e-9);
        assert_eq!(s.len(), 2);
    }
}
