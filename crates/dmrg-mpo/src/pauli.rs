use dmrg_tensor::{C64, GTensor2};

/// Spin-1/2 Pauli operators as rank-2 on-site operators, for use in MPO
/// construction. Mirrors `quantum::gates`'s fixed-size matrix constructors,
/// re-expressed as the dynamically-sized `GTensor2` the MPO layer needs.
pub fn pauli_x() -> GTensor2 {
    let mut t = GTensor2::zeros(2, 2);
    t.set(0, 1, C64::new(1.0, 0.0));
    t.set(1, 0, C64::new(1.0, 0.0));
    t
}

pub fn pauli_y() -> GTensor2 {
    let mut t = GTensor2::zeros(2, 2);
    t.set(0, 1, C64::new(0.0, -1.0));
    t.set(1, 0, C64::new(0.0, 1.0));
    t
}

pub fn pauli_z() -> GTensor2 {
    let mut t = GTensor2::zeros(2, 2);
    t.set(0, 0, C64::new(1.0, 0.0));
    t.set(1, 1, C64::new(-1.0, 0.0));
    t
}
