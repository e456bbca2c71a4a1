pub mod optimizer;
pub mod schedule;
pub mod sgd;

pub use optimizer::{LayerState, Optimizer, OptimizerState};
pub use schedule::Schedule;
pub use sgd::Sgd;
