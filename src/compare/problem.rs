use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::error::Result;
use crate::loss::softmax::check_inputs;
use crate::math::matrix::Matrix;

/// Scale of the initial weights drawn for a random problem. Small enough that
/// every class starts near probability `1 / num_classes`.
const WEIGHT_SCALE: f64 = 1e-4;

/// One complete set of loss inputs.
///
/// Can be written to / read from JSON so a fixed case can be replayed
/// against both strategies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    /// `[num_classes, num_features]`
    pub weights: Matrix,
    /// `[num_features, num_samples]`
    pub data: Matrix,
    pub labels: Vec<usize>,
    pub reg: f64,
}

impl Problem {
    /// Draws small Gaussian weights, standard-normal data and uniform labels.
    pub fn random<R: Rng + ?Sized>(
        num_classes: usize,
        num_features: usize,
        num_samples: usize,
        reg: f64,
        rng: &mut R,
    ) -> Problem {
        let weights = Matrix::random_gaussian(num_classes, num_features, WEIGHT_SCALE, rng);
        let data = Matrix::random_gaussian(num_features, num_samples, 1.0, rng);
        let labels = (0..num_samples).map(|_| rng.gen_range(0..num_classes)).collect();
        Problem { weights, data, labels, reg }
    }

    pub fn num_classes(&self) -> usize {
        self.weights.rows
    }

    pub fn num_features(&self) -> usize {
        self.weights.cols
    }

    pub fn num_samples(&self) -> usize {
        self.labels.len()
    }

    /// Checks the shape and label contract without computing anything.
    pub fn validate(&self) -> Result<()> {
        check_inputs(&self.weights, &self.data, &self.labels, self.reg)
    }

    /// Serializes the problem to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a problem from a JSON file and validates it.
    pub fn load_json(path: &str) -> Result<Problem> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let problem: Problem = serde_json::from_reader(reader)?;
        problem.validate()?;
        Ok(problem)
    }
}
