use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use tracing::{info, warn};

use crate::error::Result;
use crate::network::export::Exporter;
use crate::network::network::Network;
use crate::train::evaluation::Evaluation;

/// Whether training should go on after an epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Stop,
}

/// Hook run after every epoch's validation pass, in registration order.
pub trait Callback {
    fn after_epoch(&mut self, network: &Network, epoch: usize, evaluation: &Evaluation) -> Result<Control>;
}

/// Exports the network whenever validation accuracy clears `threshold` and
/// beats the best accuracy seen so far in this session.
///
/// Files land in `dir` as `model-<accuracy>.json`.
pub struct SaveBest<E: Exporter> {
    exporter: E,
    threshold: f64,
    best_accuracy: f64,
    dir: PathBuf,
}

impl<E: Exporter> SaveBest<E> {
    pub fn new(exporter: E, threshold: f64, dir: impl Into<PathBuf>) -> SaveBest<E> {
        SaveBest {
            exporter,
            threshold,
            best_accuracy: 0.0,
            dir: dir.into(),
        }
    }

    pub fn best_accuracy(&self) -> f64 {
        self.best_accuracy
    }

    fn path_for(&self, accuracy: f64) -> PathBuf {
        self.dir.join(format!("model-{accuracy:.4}.json"))
    }
}

impl<E: Exporter> Callback for SaveBest<E> {
    fn after_epoch(&mut self, network: &Network, epoch: usize, evaluation: &Evaluation) -> Result<Control> {
        if evaluation.accuracy > self.threshold && evaluation.accuracy > self.best_accuracy {
            self.best_accuracy = evaluation.accuracy;
            let path = self.path_for(evaluation.accuracy);
            let mut writer = BufWriter::new(File::create(&path)?);
            self.exporter.save(&mut writer, network)?;
            writer.flush()?;
            info!(epoch, accuracy = evaluation.accuracy, path = %path.display(), "saved best model");
        }
        Ok(Control::Continue)
    }
}

/// Stops training once `patience` epochs have passed since the last
/// accuracy improvement.
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    patience: usize,
    best_accuracy: f64,
    best_epoch: usize,
}

impl EarlyStopping {
    pub fn new(patience: usize) -> EarlyStopping {
        EarlyStopping {
            patience,
            best_accuracy: 0.0,
            best_epoch: 0,
        }
    }

    pub fn best_epoch(&self) -> usize {
        self.best_epoch
    }
}

impl Callback for EarlyStopping {
    fn after_epoch(&mut self, _network: &Network, epoch: usize, evaluation: &Evaluation) -> Result<Control> {
        if epoch.saturating_sub(self.best_epoch) >= self.patience {
            warn!(epoch, best_epoch = self.best_epoch, best_accuracy = self.best_accuracy, "early stopping");
            return Ok(Control::Stop);
        }

        if evaluation.accuracy > self.best_accuracy {
            self.best_accuracy = evaluation.accuracy;
            self.best_epoch = epoch;
        }

        Ok(Control::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::export::JsonExporter;

    fn with_accuracy(accuracy: f64) -> Evaluation {
        let mut ev = Evaluation::new(2);
        ev.accuracy = accuracy;
        ev
    }

    #[test]
    fn early_stopping_waits_full_patience_after_last_improvement() {
        let network = Network::new();
        let mut es = EarlyStopping::new(3);
        let accuracies = [0.5, 0.4, 0.45, 0.3, 0.2];
        let mut controls = Vec::new();
        for (i, &acc) in accuracies.iter().enumerate() {
            controls.push(es.after_epoch(&network, i + 1, &with_accuracy(acc)).unwrap());
        }
        // Improvement at epoch 1; epochs 2 and 3 are within patience.
        assert_eq!(&controls[..3], &[Control::Continue; 3]);
        assert_eq!(controls[3], Control::Stop);
        assert_eq!(es.best_epoch(), 1);
    }

    #[test]
    fn early_stopping_resets_on_improvement() {
        let network = Network::new();
        let mut es = EarlyStopping::new(2);
        assert_eq!(es.after_epoch(&network, 1, &with_accuracy(0.5)).unwrap(), Control::Continue);
        assert_eq!(es.after_epoch(&network, 2, &with_accuracy(0.6)).unwrap(), Control::Continue);
        assert_eq!(es.after_epoch(&network, 3, &with_accuracy(0.6)).unwrap(), Control::Continue);
        assert_eq!(es.after_epoch(&network, 4, &with_accuracy(0.1)).unwrap(), Control::Stop);
    }

    #[test]
    fn save_best_only_exports_improvements_above_threshold() {
        use crate::activation::activation::Activation;
        use crate::network::spec::LayerSpec;

        let dir = tempfile::tempdir().unwrap();
        let mut network = Network::new();
        network.add_layer(LayerSpec::Input { size: 2 }).unwrap();
        network.add_layer(LayerSpec::Output { size: 2, activation: Activation::Softmax }).unwrap();

        let mut sb = SaveBest::new(JsonExporter, 0.6, dir.path());
        for (epoch, acc) in [(1, 0.5), (2, 0.7), (3, 0.65), (4, 0.8)] {
            let control = sb.after_epoch(&network, epoch, &with_accuracy(acc)).unwrap();
            assert_eq!(control, Control::Continue);
        }

        let mut files: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        files.sort();
        assert_eq!(files, vec!["model-0.7000.json", "model-0.8000.json"]);
        assert_eq!(sb.best_accuracy(), 0.8);
    }
}
