use num_complex::Complex64;
use serde::{Deserialize, Serialize};

pub type C64 = Complex64;

/// A rank-2 on-site operator (physical-out, physical-in).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GTensor2 {
    pub data: Vec<C64>,
    pub d_out: usize,
    pub d_in: usize,
}

impl GTensor2 {
    pub fn zeros(d_out: usize, d_in: usize) -> Self {
        Self {
            data: vec![C64::new(0.0, 0.0); d_out * d_in],
            d_out,
            d_in,
        }
    }

    pub fn identity(d: usize) -> Self {
        let mut t = Self::zeros(d, d);
        for i in 0..d {
            t.set(i, i, C64::new(1.0, 0.0));
        }
        t
    }

    #[inline]
    fn idx(&self, out: usize, inp: usize) -> usize {
        out * self.d_in + inp
    }

    pub fn get(&self, out: usize, inp: usize) -> C64 {
        self.data[self.idx(out, inp)]
    }

    pub fn set(&mut self, out: usize, inp: usize, v: C64) {
        let i = self.idx(out, inp);
        self.data[i] = v;
    }
}

/// A site tensor with axes (left-bond, physical, right-bond), carrying a
/// trivial U(1)-style charge divergence.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GTensor3 {
    pub data: Vec<C64>,
    pub dl: usize,
    pub dp: usize,
    pub dr: usize,
    pub div: i64,
}

impl GTensor3 {
    pub fn zeros(dl: usize, dp: usize, dr: usize) -> Self {
        Self {
            data: vec![C64::new(0.0, 0.0); dl * dp * dr],
            dl,
            dp,
            dr,
            div: 0,
        }
    }

    pub fn zeros_div(dl: usize, dp: usize, dr: usize, div: i64) -> Self {
        let mut t = Self::zeros(dl, dp, dr);
        t.div = div;
        t
    }

    #[inline]
    fn idx(&self, l: usize, p: usize, r: usize) -> usize {
        (l * self.dp + p) * self.dr + r
    }

    pub fn get(&self, l: usize, p: usize, r: usize) -> C64 {
        self.data[self.idx(l, p, r)]
    }

    pub fn set(&mut self, l: usize, p: usize, r: usize, v: C64) {
        let i = self.idx(l, p, r);
        self.data[i] = v;
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (self.dl, self.dp, self.dr)
    }
}

/// The transient two-site object (left-bond, physical-L, physical-R,
/// right-bond) produced by joining two neighboring site tensors and
/// consumed by Lanczos.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GTensor4 {
    pub data: Vec<C64>,
    pub dl: usize,
    pub dpl: usize,
    pub dpr: usize,
    pub dr: usize,
    pub div: i64,
}

impl GTensor4 {
    pub fn zeros(dl: usize, dpl: usize, dpr: usize, dr: usize) -> Self {
        Self {
            data: vec![C64::new(0.0, 0.0); dl * dpl * dpr * dr],
            dl,
            dpl,
            dpr,
            dr,
            div: 0,
        }
    }

    #[inline]
    fn idx(&self, l: usize, pl: usize, pr: usize, r: usize) -> usize {
        ((l * self.dpl + pl) * self.dpr + pr) * self.dr + r
    }

    pub fn get(&self, l: usize, pl: usize, pr: usize, r: usize) -> C64 {
        self.data[self.idx(l, pl, pr, r)]
    }

    pub fn set(&mut self, l: usize, pl: usize, pr: usize, r: usize, v: C64) {
        let i = self.idx(l, pl, pr, r);
        self.data[i] = v;
    }

    pub fn shape(&self) -> (usize, usize, usize, usize) {
        (self.dl, self.dpl, self.dpr, self.dr)
    }
}
