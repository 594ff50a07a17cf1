mod pauli;

pub mod builders;
mod site;

pub use pauli::{pauli_x, pauli_y, pauli_z};
pub use site::{Mpo, MpoSite};
