//! Coordinate-level reads and writes, whole-tensor accessors and reductions.

use num_traits::{Float, Zero};

use super::pair::Pair;
use super::sym;
use super::{compute_contiguous_strides, Tensor};
use crate::algebra::Element;
use crate::backend::Backend;
use crate::error::{Error, Result};

/// Whole-tensor reductions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReduceOp {
    /// `⊕` of all elements in the tensor's arithmetic.
    Sum,
    /// Sum of moduli.
    SumAbs,
    /// Sum of squared moduli.
    SumSq,
    /// Square root of [`ReduceOp::SumSq`].
    Norm2,
    /// Largest modulus.
    MaxAbs,
    /// Smallest modulus.
    MinAbs,
}

impl<T: Element, B: Backend> Tensor<T, B> {
    // ========================================================================
    // Reads
    // ========================================================================

    /// Values at the given global coordinates.
    pub fn read(&self, indices: &[usize]) -> Result<Vec<T>> {
        let mut values = vec![self.arithmetic.zero(); indices.len()];
        let (one, zero) = (self.arithmetic.one(), self.arithmetic.zero());
        self.read_scaled(one, zero, indices, &mut values)?;
        Ok(values)
    }

    /// `values[i] = α·self[indices[i]] + β·values[i]`.
    pub fn read_scaled(&self, alpha: T, beta: T, indices: &[usize], values: &mut [T]) -> Result<()> {
        if indices.len() != values.len() {
            return Err(Error::LengthMismatch {
                expected: indices.len(),
                got: values.len(),
            });
        }
        for &g in indices {
            self.check_coord(g)?;
        }
        let _prof = self.trace_op("read");
        let ar = self.arithmetic;
        for (&g, v) in indices.iter().zip(values.iter_mut()) {
            *v = ar.blend(alpha, self.data[g], beta, *v);
        }
        Ok(())
    }

    /// Fill in the value of every pair from its coordinate.
    pub fn read_pairs(&self, pairs: &mut [Pair<T>]) -> Result<()> {
        let (one, zero) = (self.arithmetic.one(), self.arithmetic.zero());
        self.read_pairs_scaled(one, zero, pairs)
    }

    /// `pair.d = α·self[pair.k] + β·pair.d`.
    pub fn read_pairs_scaled(&self, alpha: T, beta: T, pairs: &mut [Pair<T>]) -> Result<()> {
        for p in pairs.iter() {
            self.check_coord(p.k)?;
        }
        let _prof = self.trace_op("read");
        let ar = self.arithmetic;
        for p in pairs.iter_mut() {
            p.d = ar.blend(alpha, self.data[p.k], beta, p.d);
        }
        Ok(())
    }

    /// Copy of the dense contents, every coordinate in column-major order.
    pub fn read_all(&self) -> Vec<T> {
        let _prof = self.trace_op("read_all");
        self.data.clone()
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Store `values[i]` at `indices[i]`.
    pub fn write(&mut self, indices: &[usize], values: &[T]) -> Result<()> {
        let (one, zero) = (self.arithmetic.one(), self.arithmetic.zero());
        self.write_scaled(one, zero, indices, values)
    }

    /// `self[indices[i]] = α·values[i] + β·self[indices[i]]`.
    ///
    /// Every symmetric image of a written coordinate is updated with it.
    /// Coordinates that are structurally zero are skipped.
    pub fn write_scaled(&mut self, alpha: T, beta: T, indices: &[usize], values: &[T]) -> Result<()> {
        if indices.len() != values.len() {
            return Err(Error::LengthMismatch {
                expected: indices.len(),
                got: values.len(),
            });
        }
        for &g in indices {
            self.check_coord(g)?;
        }
        let _prof = self.trace_op("write");
        self.write_entries(alpha, beta, indices.iter().copied().zip(values.iter().copied()));
        Ok(())
    }

    pub fn write_pairs(&mut self, pairs: &[Pair<T>]) -> Result<()> {
        let (one, zero) = (self.arithmetic.one(), self.arithmetic.zero());
        self.write_pairs_scaled(one, zero, pairs)
    }

    /// `self[pair.k] = α·pair.d + β·self[pair.k]`.
    pub fn write_pairs_scaled(&mut self, alpha: T, beta: T, pairs: &[Pair<T>]) -> Result<()> {
        for p in pairs {
            self.check_coord(p.k)?;
        }
        let _prof = self.trace_op("write");
        self.write_entries(alpha, beta, pairs.iter().map(|p| (p.k, p.d)));
        Ok(())
    }

    /// Validated coordinates only.
    pub(crate) fn write_entries(&mut self, alpha: T, beta: T, entries: impl Iterator<Item = (usize, T)>) {
        let ar = self.arithmetic;
        let runs = sym::runs(&self.sym);
        if runs.is_empty() {
            for (g, v) in entries {
                self.data[g] = ar.blend(alpha, v, beta, self.data[g]);
            }
            return;
        }

        let strides = compute_contiguous_strides(&self.len);
        let mut idx = vec![0usize; self.ndim()];
        for (g, v) in entries {
            self.decode(g, &mut idx);
            let Some(negate) = sym::canonicalize(&mut idx, &runs) else {
                continue;
            };
            let new = ar.blend(alpha, v, beta, self.data[g]);
            let canon = if negate { -new } else { new };
            let data = &mut self.data;
            sym::for_each_image(&idx, &runs, |img, neg| {
                let off: usize = img.iter().zip(strides.iter()).map(|(i, s)| i * s).sum();
                data[off] = if neg { -canon } else { canon };
            });
        }
    }

    /// Set every canonical element to `val` (images follow the symmetry).
    pub fn fill(&mut self, val: T) {
        let _prof = self.trace_op("fill");
        self.data.fill(val);
        self.symmetrize();
    }

    // ========================================================================
    // Order-0 tensors
    // ========================================================================

    /// The value of an order-0 tensor.
    pub fn get_val(&self) -> Result<T> {
        if self.ndim() != 0 {
            return Err(Error::shape(format!(
                "get_val needs an order-0 tensor, got order {}",
                self.ndim()
            )));
        }
        Ok(self.data[0])
    }

    pub fn set_val(&mut self, val: T) -> Result<()> {
        if self.ndim() != 0 {
            return Err(Error::shape(format!(
                "set_val needs an order-0 tensor, got order {}",
                self.ndim()
            )));
        }
        self.data[0] = val;
        Ok(())
    }

    // ========================================================================
    // Reductions
    // ========================================================================

    /// Visit each canonical element once, with its coordinate.
    fn for_each_canonical(&self, mut f: impl FnMut(usize, T)) {
        let runs = sym::runs(&self.sym);
        if runs.is_empty() {
            for (g, &v) in self.data.iter().enumerate() {
                f(g, v);
            }
            return;
        }
        let mut idx = vec![0usize; self.ndim()];
        for (g, &v) in self.data.iter().enumerate() {
            self.decode(g, &mut idx);
            if sym::is_canonical(&idx, &runs) {
                f(g, v);
            }
        }
    }

    /// Reduce the tensor to one value, counting each canonical element once.
    ///
    /// Modulus-based reductions return a real value embedded in `T`. An empty
    /// tensor reduces to zero.
    pub fn reduce(&self, op: ReduceOp) -> T {
        let _prof = self.trace_op("reduce");
        match op {
            ReduceOp::Sum => {
                let ar = self.arithmetic;
                let mut acc = ar.zero();
                self.for_each_canonical(|_, v| acc = ar.add(acc, v));
                acc
            }
            ReduceOp::SumAbs => T::from_real(self.fold_modulus(|acc, m| acc + m)),
            ReduceOp::SumSq => T::from_real(self.fold_modulus(|acc, m| acc + m * m)),
            ReduceOp::Norm2 => T::from_real(self.fold_modulus(|acc, m| acc + m * m).sqrt()),
            ReduceOp::MaxAbs => T::from_real(self.extreme_modulus(|m, best| m > best)),
            ReduceOp::MinAbs => T::from_real(self.extreme_modulus(|m, best| m < best)),
        }
    }

    fn fold_modulus(&self, f: impl Fn(T::Real, T::Real) -> T::Real) -> T::Real {
        let mut acc = T::Real::zero();
        self.for_each_canonical(|_, v| acc = f(acc, v.modulus()));
        acc
    }

    fn extreme_modulus(&self, better: impl Fn(T::Real, T::Real) -> bool) -> T::Real {
        let mut best: Option<T::Real> = None;
        self.for_each_canonical(|_, v| {
            let m = v.modulus();
            if best.map_or(true, |b| better(m, b)) {
                best = Some(m);
            }
        });
        best.unwrap_or_else(T::Real::zero)
    }

    /// Sum of moduli.
    pub fn norm1(&self) -> T::Real {
        let _prof = self.trace_op("norm1");
        self.fold_modulus(|acc, m| acc + m)
    }

    /// Euclidean norm.
    pub fn norm2(&self) -> T::Real {
        let _prof = self.trace_op("norm2");
        self.fold_modulus(|acc, m| acc + m * m).sqrt()
    }

    /// Largest modulus.
    pub fn norm_infty(&self) -> T::Real {
        let _prof = self.trace_op("norm_infty");
        self.extreme_modulus(|m, best| m > best)
    }

    /// The `n` canonical values of largest modulus, largest first.
    ///
    /// Ties are broken by ascending coordinate.
    pub fn get_max_abs(&self, n: usize) -> Result<Vec<T>> {
        let mut entries: Vec<(usize, T)> = Vec::new();
        self.for_each_canonical(|g, v| entries.push((g, v)));
        if n > entries.len() {
            return Err(Error::InvalidArgument(format!(
                "asked for {n} values from a tensor with {} distinct elements",
                entries.len()
            )));
        }
        let _prof = self.trace_op("get_max_abs");
        entries.sort_by(|(ga, a), (gb, b)| {
            b.modulus()
                .partial_cmp(&a.modulus())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(ga.cmp(gb))
        });
        Ok(entries.into_iter().take(n).map(|(_, v)| v).collect())
    }
}
