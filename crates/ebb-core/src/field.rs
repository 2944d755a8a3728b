use crate::F;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Diffusion time, running from 1.0 (pure noise) down to a small epsilon
pub type Time = f64;

/// Grid layout of one field snapshot: `height x width` cells with
/// `channels` values per cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldShape {
    pub height: usize,
    pub width: usize,
    pub channels: usize,
}

impl FieldShape {
    pub fn new(height: usize, width: usize, channels: usize) -> Self {
        Self {
            height,
            width,
            channels,
        }
    }

    /// Number of values in one flattened field
    pub fn len(&self) -> usize {
        self.height * self.width * self.channels
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat index of a grid value. Fields are stored channel-major: all of
    /// channel 0 row by row, then channel 1, and so on.
    pub fn index(&self, channel: usize, row: usize, col: usize) -> usize {
        debug_assert!(
            channel < self.channels && row < self.height && col < self.width,
            "grid coordinates out of range"
        );
        (channel * self.height + row) * self.width + col
    }
}

/// A batch of field snapshots, one flattened field per column.
///
/// Columns evolve independently under the sampler, so per-step arithmetic is
/// expressed as column-wise updates with per-sample coefficients.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SampleBatch {
    pub data: DMatrix<F>,
    pub shape: FieldShape,
}

impl SampleBatch {
    pub fn zeros(shape: FieldShape, batch_size: usize) -> Self {
        Self {
            data: DMatrix::zeros(shape.len(), batch_size),
            shape,
        }
    }

    pub fn from_matrix(data: DMatrix<F>, shape: FieldShape) -> Self {
        assert_eq!(
            data.nrows(),
            shape.len(),
            "matrix rows must match the field length"
        );
        Self { data, shape }
    }

    pub fn batch_size(&self) -> usize {
        self.data.ncols()
    }

    /// Values per flattened field
    pub fn field_len(&self) -> usize {
        self.data.nrows()
    }

    /// Value of one grid cell of one sample
    pub fn value(&self, sample: usize, channel: usize, row: usize, col: usize) -> F {
        self.data[(self.shape.index(channel, row, col), sample)]
    }

    /// `out[:, j] = self[:, j] * coeffs[j]` for every column
    pub fn scale_columns(&self, coeffs: &DVector<F>) -> SampleBatch {
        assert_eq!(
            coeffs.len(),
            self.batch_size(),
            "one coefficient per sample required"
        );
        let mut out = self.clone();
        for (j, mut col) in out.data.column_iter_mut().enumerate() {
            col *= coeffs[j];
        }
        out
    }

    /// `out[:, j] = self[:, j] + coeffs[j] * other[:, j]` for every column.
    ///
    /// This is the broadcast per-sample update every reverse-time stepper is
    /// built from.
    pub fn add_scaled_columns(&self, other: &SampleBatch, coeffs: &DVector<F>) -> SampleBatch {
        assert_eq!(self.shape, other.shape, "operand field shapes must agree");
        assert_eq!(
            self.batch_size(),
            other.batch_size(),
            "operand batch sizes must agree"
        );
        assert_eq!(
            coeffs.len(),
            self.batch_size(),
            "one coefficient per sample required"
        );
        let mut out = self.clone();
        for j in 0..out.batch_size() {
            out.data.column_mut(j).axpy(coeffs[j], &other.data.column(j), 1.0);
        }
        out
    }
}

/// Per-sample times, the broadcast form of a scalar step time
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeBatch(pub DVector<F>);

impl TimeBatch {
    /// Broadcast one scalar time across a batch
    pub fn splat(t: Time, batch_size: usize) -> Self {
        TimeBatch(DVector::from_element(batch_size, t))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::ops::Deref for TimeBatch {
    type Target = DVector<F>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
