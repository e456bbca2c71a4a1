use std::fmt;

use crate::math::matrix::Matrix;

/// Hit counter for one class.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Counter {
    pub correct: usize,
    pub total: usize,
    /// `correct / total * 100`, or `0.0` when the class was never seen.
    pub percent: f64,
}

impl Counter {
    fn finish(&mut self) {
        self.percent = if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64 * 100.0
        };
    }
}

/// Classification quality over a labelled set.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// `correct / total`, in `[0, 1]`.
    pub accuracy: f64,
    pub correct: usize,
    pub total: usize,
    /// `confusion[truth][predicted]` occurrence counts.
    pub confusion: Vec<Vec<usize>>,
    /// Indexed by true class.
    pub recall: Vec<Counter>,
    /// Indexed by predicted class.
    pub precision: Vec<Counter>,
}

impl Evaluation {
    pub fn new(classes: usize) -> Evaluation {
        Evaluation {
            accuracy: 0.0,
            correct: 0,
            total: 0,
            confusion: vec![vec![0; classes]; classes],
            recall: vec![Counter::default(); classes],
            precision: vec![Counter::default(); classes],
        }
    }

    pub fn classes(&self) -> usize {
        self.confusion.len()
    }

    /// Counts one `(prediction, truth)` pair.
    pub fn record(&mut self, prediction: &Matrix, truth: &Matrix) {
        let truth = argmax(truth);
        let predicted = argmax(prediction);

        self.confusion[truth][predicted] += 1;
        self.recall[truth].total += 1;
        self.precision[predicted].total += 1;
        self.total += 1;

        if predicted == truth {
            self.correct += 1;
            self.recall[truth].correct += 1;
            self.precision[predicted].correct += 1;
        }
    }

    /// Derives accuracy and per-class percentages from the raw counts.
    pub fn finish(&mut self) {
        self.accuracy = if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        };
        for counter in self.recall.iter_mut().chain(self.precision.iter_mut()) {
            counter.finish();
        }
    }
}

/// Index of the first strictly greatest entry, scanning from a running max
/// of `0.0`.
///
/// A vector with no positive entry therefore maps to class 0. Predictions
/// coming out of Softmax or Sigmoid are always positive, so this only bites
/// on raw or degenerate outputs.
pub fn argmax(m: &Matrix) -> usize {
    let mut max_idx = 0;
    let mut last_max = 0.0;
    for (i, &v) in m.data.iter().enumerate() {
        if v > last_max {
            last_max = v;
            max_idx = i;
        }
    }
    max_idx
}

impl fmt::Display for Evaluation {
    /// Confusion table with a recall column and a precision row.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let classes = self.classes();

        write!(f, "{:>9} ", "")?;
        for j in 0..classes {
            write!(f, "{j:>5} ")?;
        }
        writeln!(f, " Recall")?;

        for (i, row) in self.confusion.iter().enumerate() {
            write!(f, "{i:>9} ")?;
            for count in row {
                write!(f, "{count:>5} ")?;
            }
            writeln!(f, "  {:.2}", self.recall[i].percent)?;
        }

        write!(f, "Precision ")?;
        for counter in &self.precision {
            write!(f, "{:>5.1} ", counter.percent)?;
        }
        writeln!(f)?;
        write!(f, "Accuracy  {:.4} ({}/{})", self.accuracy, self.correct, self.total)
    }
}
