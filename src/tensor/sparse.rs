//! A tensor restricted to a fixed list of coordinates.

use super::Tensor;
use crate::algebra::Element;
use crate::backend::Backend;
use crate::error::{Error, Result};

/// Bulk blended I/O against a fixed coordinate list.
///
/// # Example
///
/// ```rust
/// use ctf::{Tensor, World};
///
/// let world = World::new(1).unwrap();
/// let mut t = Tensor::<f64>::zeros(&[4], &world).unwrap();
/// let mut view = t.sparse(&[3, 0]).unwrap();
///
/// view.assign(&[7.0, 1.0]).unwrap();
/// view.add(&[1.0, 1.0]).unwrap();
/// assert_eq!(view.to_vec(), vec![8.0, 2.0]);
/// assert_eq!(t.data(), &[2.0, 0.0, 0.0, 8.0]);
/// ```
pub struct SparseTensor<'a, T: Element, B: Backend> {
    tensor: &'a mut Tensor<T, B>,
    indices: Vec<usize>,
}

impl<T: Element, B: Backend> Tensor<T, B> {
    /// View over the given global coordinates, validated once here.
    pub fn sparse(&mut self, indices: &[usize]) -> Result<SparseTensor<'_, T, B>> {
        for &g in indices {
            self.check_coord(g)?;
        }
        Ok(SparseTensor {
            tensor: self,
            indices: indices.to_vec(),
        })
    }
}

impl<'a, T: Element, B: Backend> SparseTensor<'a, T, B> {
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    fn check_values(&self, got: usize) -> Result<()> {
        if got != self.indices.len() {
            return Err(Error::LengthMismatch {
                expected: self.indices.len(),
                got,
            });
        }
        Ok(())
    }

    /// `tensor[idx[j]] = β·tensor[idx[j]] + α·values[j]`.
    pub fn write(&mut self, alpha: T, values: &[T], beta: T) -> Result<()> {
        self.check_values(values.len())?;
        let _prof = self.tensor.trace_op("sparse_write");
        let entries = self.indices.iter().copied().zip(values.iter().copied());
        self.tensor.write_entries(alpha, beta, entries);
        Ok(())
    }

    /// `values[j] = α·tensor[idx[j]] + β·values[j]`.
    pub fn read(&self, alpha: T, values: &mut [T], beta: T) -> Result<()> {
        self.check_values(values.len())?;
        self.tensor.read_scaled(alpha, beta, &self.indices, values)
    }

    /// Overwrite the viewed entries with `values`.
    pub fn assign(&mut self, values: &[T]) -> Result<()> {
        let ar = *self.tensor.arithmetic();
        self.write(ar.one(), values, ar.zero())
    }

    /// Add `values` onto the viewed entries.
    pub fn add(&mut self, values: &[T]) -> Result<()> {
        let ar = *self.tensor.arithmetic();
        self.write(ar.one(), values, ar.one())
    }

    /// Subtract `values` from the viewed entries.
    pub fn sub(&mut self, values: &[T]) -> Result<()> {
        let ar = *self.tensor.arithmetic();
        self.write(-ar.one(), values, ar.one())
    }

    /// Current values of the viewed entries.
    pub fn to_vec(&self) -> Vec<T> {
        self.indices.iter().map(|&g| self.tensor.data[g]).collect()
    }
}
