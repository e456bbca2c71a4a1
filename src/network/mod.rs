pub mod export;
pub mod network;
pub mod spec;

pub use export::{Exporter, JsonExporter, ModelSnapshot};
pub use network::Network;
pub use spec::{LayerSpec, NetworkSpec};
