use serde::{Serialize, Deserialize};

use crate::activation::activation::Activation;
use crate::error::Result;
use crate::layers::init::WeightInitializer;
use crate::loss::loss_type::{LossType, Reduction};
use crate::network::network::Network;
use crate::optim::sgd::Sgd;

/// Describes one layer in a network specification.
///
/// The input width of hidden and output layers is implied by the previous
/// entry, so only the neuron count and activation are stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerSpec {
    Input { size: usize },
    Hidden { size: usize, activation: Activation },
    Output { size: usize, activation: Activation },
}

/// A fully serializable description of a network architecture plus its loss
/// and optimizer settings.
///
/// `NetworkSpec` can be saved to / loaded from JSON independently of the
/// trained weights, so a run can be configured before training starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Human-readable name used as the model file stem.
    pub name: String,
    /// Ordered list of layer descriptions (input → output).
    pub layers: Vec<LayerSpec>,
    pub loss: LossType,
    #[serde(default)]
    pub reduction: Reduction,
    /// SGD momentum in `[0, 1)`; `0` means plain SGD.
    #[serde(default)]
    pub momentum: f64,
    #[serde(default)]
    pub nesterov: bool,
}

impl NetworkSpec {
    /// Builds a network with the default N(0, 1) initializer.
    pub fn build(&self) -> Result<Network> {
        self.assemble(Network::new())
    }

    /// Builds a network drawing its parameters from `initializer`.
    pub fn build_with<I: WeightInitializer + 'static>(&self, initializer: I) -> Result<Network> {
        let mut network = Network::new();
        network.set_initializer(initializer);
        self.assemble(network)
    }

    fn assemble(&self, mut network: Network) -> Result<Network> {
        network.set_optimizer(Sgd::with_momentum(self.momentum, self.nesterov)?);
        network.set_loss(self.loss, self.reduction);
        for layer in &self.layers {
            network.add_layer(layer.clone())?;
        }
        network.check_complete()?;
        Ok(network)
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a `NetworkSpec` from a JSON file.
    pub fn load_json(path: &str) -> Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
