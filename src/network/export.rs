use std::io::{Read, Write};

use serde::{Serialize, Deserialize};

use crate::activation::activation::Activation;
use crate::error::{Error, Result};
use crate::layers::dense::{Dense, Layer};
use crate::math::matrix::Matrix;
use crate::network::network::Network;

/// Saves trained parameters and restores them into a fresh layer chain.
pub trait Exporter {
    /// Writes `network`; closing `dst` is the caller's business.
    fn save(&self, dst: &mut dyn Write, network: &Network) -> Result<()>;

    /// Rebuilds a network from `src` without re-initializing any weights.
    fn load(&self, src: &mut dyn Read) -> Result<Network>;
}

/// Serialized form of a trained network: layer sizes plus one weight and one
/// bias matrix per non-input layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub sizes: Vec<usize>,
    /// One per non-input layer. Older files without it load as Sigmoid hidden
    /// layers and a Softmax output.
    #[serde(default)]
    pub activations: Vec<Activation>,
    pub weights: Vec<Matrix>,
    pub biases: Vec<Matrix>,
}

impl ModelSnapshot {
    pub fn capture(network: &Network) -> ModelSnapshot {
        let layers = network.layers();
        ModelSnapshot {
            sizes: network.sizes(),
            activations: layers.iter().filter_map(Layer::activation).collect(),
            weights: layers.iter().filter_map(Layer::weights).cloned().collect(),
            biases: layers.iter().filter_map(Layer::biases).cloned().collect(),
        }
    }

    pub fn restore(self) -> Result<Network> {
        let trainable = self.sizes.len().saturating_sub(1);
        if self.sizes.len() < 2 || self.weights.len() != trainable || self.biases.len() != trainable {
            return Err(Error::InvalidData(format!(
                "snapshot has {} sizes, {} weight and {} bias matrices",
                self.sizes.len(),
                self.weights.len(),
                self.biases.len()
            )));
        }
        if !self.activations.is_empty() && self.activations.len() != trainable {
            return Err(Error::InvalidData(format!(
                "snapshot has {} activations for {} layers",
                self.activations.len(),
                trainable
            )));
        }

        for (i, m) in self.weights.iter().chain(&self.biases).enumerate() {
            if m.data.len() != m.rows * m.cols {
                return Err(Error::InvalidShape(format!(
                    "matrix {i} declares {}x{} but holds {} values",
                    m.rows,
                    m.cols,
                    m.data.len()
                )));
            }
        }

        let mut network = Network::new();
        network.attach(Layer::Input { size: self.sizes[0] })?;

        let params = self.weights.into_iter().zip(self.biases).enumerate();
        for (i, (weights, biases)) in params {
            let is_output = i + 1 == trainable;
            let activation = self.activations.get(i).copied().unwrap_or(if is_output {
                Activation::Softmax
            } else {
                Activation::Sigmoid
            });
            if weights.rows != self.sizes[i + 1] {
                return Err(Error::InvalidShape(format!(
                    "layer {} declares {} neurons but has {} weight rows",
                    i + 1,
                    self.sizes[i + 1],
                    weights.rows
                )));
            }
            let dense = Dense::new(weights, biases, activation);
            network.attach(if is_output { Layer::Output(dense) } else { Layer::Hidden(dense) })?;
        }

        Ok(network)
    }
}

/// Stores a [`ModelSnapshot`] as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporter;

impl Exporter for JsonExporter {
    fn save(&self, dst: &mut dyn Write, network: &Network) -> Result<()> {
        serde_json::to_writer(dst, &ModelSnapshot::capture(network))?;
        Ok(())
    }

    fn load(&self, src: &mut dyn Read) -> Result<Network> {
        let snapshot: ModelSnapshot = serde_json::from_reader(src)?;
        snapshot.restore()
    }
}
