pub mod dispersion;
pub mod load;

pub use dispersion::{from_fn, CorrelationCoefficient, Dispersion};
pub use load::{leader_counts, replica_sizes};
