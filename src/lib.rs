pub mod math;
pub mod activation;
pub mod error;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod train;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use activation::activation::Activation;
pub use error::{Error, Result};
pub use layers::dense::{Dense, Layer};
pub use layers::init::{NormalInitializer, Scale, WeightInitializer};
pub use network::network::Network;
pub use network::export::{Exporter, JsonExporter};
pub use network::spec::{LayerSpec, NetworkSpec};
pub use loss::loss_type::{LossType, Reduction};
pub use optim::optimizer::Optimizer;
pub use optim::schedule::Schedule;
pub use optim::sgd::Sgd;
pub use train::callbacks::{Callback, Control, EarlyStopping, SaveBest};
pub use train::evaluation::Evaluation;
pub use train::fit_options::FitOptions;
pub use train::loop_fn::train_loop;
