use crate::error::SweepError;
use dmrg_tensor::{svd_left, svd_right, GTensor3, TruncParams, C64};
use std::path::Path;

fn absorb_into_left(sv: &[C64], kept: usize, next: &GTensor3) -> GTensor3 {
    let mid = next.dl;
    let mut out = GTensor3::zeros(kept, next.dp, next.dr);
    out.div = next.div;
    for k in 0..kept {
        for p in 0..next.dp {
            for r in 0..next.dr {
                let mut acc = C64::new(0.0, 0.0);
                for m in 0..mid {
                    acc += sv[k * mid + m] * next.get(m, p, r);
                }
                out.set(k, p, r, acc);
            }
        }
    }
    out
}

fn absorb_into_right(prev: &GTensor3, us: &[C64], kept: usize) -> GTensor3 {
    let mid = prev.dr;
    let mut out = GTensor3::zeros(prev.dl, prev.dp, kept);
    out.div = prev.div;
    for l in 0..prev.dl {
        for p in 0..prev.dp {
            for k in 0..kept {
                let mut acc = C64::new(0.0, 0.0);
                for m in 0..mid {
                    acc += prev.get(l, p, m) * us[m * kept + k];
                }
                out.set(l, p, k, acc);
            }
        }
    }
    out
}

/// Ordered chain of site tensors with a tracked canonical center. A site is
/// non-resident (paged out to disk) when its slot holds `None`.
pub struct Mps {
    sites: Vec<Option<GTensor3>>,
    center: Option<usize>,
}

impl Mps {
    pub fn new(sites: Vec<GTensor3>) -> Self {
        Self {
            sites: sites.into_iter().map(Some).collect(),
            center: None,
        }
    }

    /// `n` empty, non-resident slots, for reconstructing an `Mps` whose
    /// tensors will be populated by [`Self::load_all`].
    pub fn placeholder(n: usize) -> Self {
        Self {
            sites: vec![None; n],
            center: None,
        }
    }

    /// Dumps every site to `<dir>/site<i>.bin`, leaving them resident.
    pub fn dump_all(&mut self, dir: &Path) -> Result<(), SweepError> {
        for i in 0..self.len() {
            self.dump_ten(i, dir, false)?;
        }
        Ok(())
    }

    /// Loads every site from `<dir>/site<i>.bin`.
    pub fn load_all(&mut self, dir: &Path) -> Result<(), SweepError> {
        for i in 0..self.len() {
            self.load_ten(i, dir)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn center(&self) -> Option<usize> {
        self.center
    }

    pub fn get(&self, i: usize) -> Result<&GTensor3, SweepError> {
        self.sites[i]
            .as_ref()
            .ok_or_else(|| SweepError::Precondition(format!("site {i} is not resident")))
    }

    /// Overwrites site `i`; always uncanonicalizes the
    /// chain, since an arbitrary write need not preserve isometry.
    pub fn set(&mut self, i: usize, t: GTensor3) {
        self.sites[i] = Some(t);
        self.center = None;
    }

    pub(crate) fn set_canonical(&mut self, i: usize, t: GTensor3) {
        self.sites[i] = Some(t);
    }

    pub(crate) fn set_center(&mut self, c: usize) {
        self.center = Some(c);
    }

    /// Splits site `i` with left-dimension grouping `(left-bond, physical)`
    /// against `right-bond`; replaces site `i` by the left-isometric factor
    /// and absorbs `S·Vᵀ` into site `i + 1` (when it exists).
    pub fn left_canonicalize_at(&mut self, i: usize) -> Result<(), SweepError> {
        let t = self.get(i)?.clone();
        let (u, sv, kept) = svd_left(&t, &TruncParams::exact())?;
        self.set_canonical(i, u);
        if i + 1 < self.len() {
            let next = self.get(i + 1)?.clone();
            let absorbed = absorb_into_left(&sv, kept, &next);
            self.set_canonical(i + 1, absorbed);
        }
        Ok(())
    }

    /// Mirror of [`Self::left_canonicalize_at`]: replaces site `i` by the
    /// right-isometric factor and absorbs `U·S` into site `i - 1`.
    pub fn right_canonicalize_at(&mut self, i: usize) -> Result<(), SweepError> {
        let t = self.get(i)?.clone();
        let (us, vt, kept) = svd_right(&t, &TruncParams::exact())?;
        self.set_canonical(i, vt);
        if i > 0 {
            let prev = self.get(i - 1)?.clone();
            let absorbed = absorb_into_right(&prev, &us, kept);
            self.set_canonical(i - 1, absorbed);
        }
        Ok(())
    }

    /// Canonicalizes to `target`: a left-canonicalization pass from the
    /// current center (or the left boundary, if uncentralized) up to
    /// `target - 1`, then a right-canonicalization pass down to
    /// `target + 1`. Idempotent when already centered at `target`.
    pub fn centralize(&mut self, target: usize) -> Result<(), SweepError> {
        let n = self.len();
        match self.center {
            Some(c) if c == target => return Ok(()),
            Some(c) if c < target => {
                for i in c..target {
                    self.left_canonicalize_at(i)?;
                }
            }
            Some(c) => {
                for i in (target + 1..=c).rev() {
                    self.right_canonicalize_at(i)?;
                }
            }
            None => {
                for i in 0..target {
                    self.left_canonicalize_at(i)?;
                }
                for i in (target + 1..n).rev() {
                    self.right_canonicalize_at(i)?;
                }
            }
        }
        self.center = Some(target);
        Ok(())
    }

    fn site_path(dir: &Path, i: usize) -> std::path::PathBuf {
        dir.join(format!("site{i}.bin"))
    }

    /// Loads site `i` from `<dir>/site<i>.bin`, making it resident. Does not
    /// touch the canonical center: loading changes residency, not identity.
    pub fn load_ten(&mut self, i: usize, dir: &Path) -> Result<(), SweepError> {
        let bytes = std::fs::read(Self::site_path(dir, i))?;
        let t: GTensor3 = bincode::deserialize(&bytes)?;
        self.set_canonical(i, t);
        Ok(())
    }

    /// Dumps site `i` to `<dir>/site<i>.bin`; when `release` is set, the
    /// in-memory slot is freed afterward.
    pub fn dump_ten(&mut self, i: usize, dir: &Path, release: bool) -> Result<(), SweepError> {
        std::fs::create_dir_all(dir)?;
        let bytes = bincode::serialize(self.get(i)?)?;
        std::fs::write(Self::site_path(dir, i), bytes)?;
        if release {
            self.sites[i] = None;
        }
        Ok(())
    }
}
