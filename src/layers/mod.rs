pub mod chain;
pub mod dense;
pub mod init;

pub use dense::{Dense, Layer};
pub use init::{NormalInitializer, Scale, WeightInitializer};
