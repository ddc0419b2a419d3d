//! Structural operations: summation, contraction and scaling over labels.

use std::collections::HashMap;

use super::{sym, Tensor};
use crate::algebra::Element;
use crate::backend::{Backend, ContractFn, ScaleFn, SumFn};
use crate::error::{Error, Result};

/// Kernel modes for a label list.
pub(crate) fn modes(labels: &[char]) -> Vec<i32> {
    labels.iter().map(|&c| c as u32 as i32).collect()
}

/// Check that every label is bound to one extent, and return the binding.
pub(crate) fn bind_extents(operands: &[(&[char], &[usize])]) -> Result<HashMap<char, usize>> {
    let mut extents = HashMap::new();
    for (labels, len) in operands {
        for (&l, &n) in labels.iter().zip(len.iter()) {
            match extents.get(&l) {
                Some(&first) if first != n => {
                    return Err(Error::ExtentMismatch {
                        label: l,
                        first,
                        second: n,
                    })
                }
                Some(_) => {}
                None => {
                    extents.insert(l, n);
                }
            }
        }
    }
    Ok(extents)
}

pub(crate) fn check_unique(labels: &[char]) -> Result<()> {
    for (i, &l) in labels.iter().enumerate() {
        if labels[..i].contains(&l) {
            return Err(Error::DuplicateLabel { label: l });
        }
    }
    Ok(())
}

impl<T: Element, B: Backend> Tensor<T, B> {
    /// `self[idx_b] = β·self[idx_b] + α·A[idx_a]`.
    ///
    /// Labels only in `idx_a` are summed over; labels only in `idx_b` are
    /// broadcast; a label repeated inside one operand addresses its diagonal.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ctf::{Tensor, World};
    ///
    /// let world = World::new(1).unwrap();
    /// // Column-major: [[1, 3], [2, 4]]
    /// let a = Tensor::from_data(&[1.0, 2.0, 3.0, 4.0], &[2, 2], &world).unwrap();
    /// let mut t = Tensor::scalar(0.0, &world).unwrap();
    ///
    /// // trace
    /// t.sum(1.0, &a, "ii", 0.0, "").unwrap();
    /// assert_eq!(t.get_val().unwrap(), 5.0);
    /// ```
    pub fn sum(&mut self, alpha: T, a: &Tensor<T, B>, idx_a: &str, beta: T, idx_b: &str) -> Result<()> {
        let la = a.labels(idx_a)?;
        let lb = self.labels(idx_b)?;
        self.sum_labeled(alpha, a, &la, beta, &lb, None)
    }

    /// [`Tensor::sum`] with an element-wise override `f(α, a, &mut b)`.
    pub fn sum_with(
        &mut self,
        alpha: T,
        a: &Tensor<T, B>,
        idx_a: &str,
        beta: T,
        idx_b: &str,
        f: SumFn<T>,
    ) -> Result<()> {
        let la = a.labels(idx_a)?;
        let lb = self.labels(idx_b)?;
        self.sum_labeled(alpha, a, &la, beta, &lb, Some(f))
    }

    pub(crate) fn sum_labeled(
        &mut self,
        alpha: T,
        a: &Tensor<T, B>,
        la: &[char],
        beta: T,
        lb: &[char],
        f: Option<SumFn<T>>,
    ) -> Result<()> {
        a.check_labels(la)?;
        self.check_labels(lb)?;
        if a.world != self.world {
            return Err(Error::WorldMismatch);
        }
        bind_extents(&[(la, &a.len), (lb, &self.len)])?;
        sym::check_flow(lb, &self.sym, &[(la, &a.sym)])?;

        self.sum_kernel(alpha, a, la, beta, lb, f);
        Ok(())
    }

    /// Run a sum whose operands were already validated.
    pub(crate) fn sum_kernel(
        &mut self,
        alpha: T,
        a: &Tensor<T, B>,
        la: &[char],
        beta: T,
        lb: &[char],
        f: Option<SumFn<T>>,
    ) {
        let _prof = self.trace_op("sum");
        let (ma, mb) = (modes(la), modes(lb));
        let ar = self.arithmetic;
        self.backend
            .scale(&ar, beta, &mut self.data, &self.len, &mb, None);
        self.backend
            .sum(&ar, alpha, &a.data, &a.len, &ma, &mut self.data, &self.len, &mb, f);
        self.symmetrize();
    }

    /// `self[idx_c] = β·self[idx_c] + α·Σ A[idx_a]·B[idx_b]`.
    ///
    /// Labels in both operands and absent from `idx_c` are contracted.
    /// Labels of `idx_c` must be unique.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ctf::{Tensor, World};
    ///
    /// let world = World::new(1).unwrap();
    /// // Column-major: A = [[1, 2], [3, 4]], B = [[5, 6], [7, 8]]
    /// let a = Tensor::from_data(&[1.0, 3.0, 2.0, 4.0], &[2, 2], &world).unwrap();
    /// let b = Tensor::from_data(&[5.0, 7.0, 6.0, 8.0], &[2, 2], &world).unwrap();
    /// let mut c = Tensor::<f64>::zeros(&[2, 2], &world).unwrap();
    ///
    /// c.contract(1.0, &a, "ik", &b, "kj", 0.0, "ij").unwrap();
    /// // [[19, 22], [43, 50]]
    /// assert_eq!(c.data(), &[19.0, 43.0, 22.0, 50.0]);
    /// ```
    #[allow(clippy::too_many_arguments)]
    pub fn contract(
        &mut self,
        alpha: T,
        a: &Tensor<T, B>,
        idx_a: &str,
        b: &Tensor<T, B>,
        idx_b: &str,
        beta: T,
        idx_c: &str,
    ) -> Result<()> {
        let la = a.labels(idx_a)?;
        let lb = b.labels(idx_b)?;
        let lc = self.labels(idx_c)?;
        self.contract_labeled(alpha, a, &la, b, &lb, beta, &lc, None)
    }

    /// [`Tensor::contract`] with an element-wise override `f(α, a, b, &mut c)`.
    #[allow(clippy::too_many_arguments)]
    pub fn contract_with(
        &mut self,
        alpha: T,
        a: &Tensor<T, B>,
        idx_a: &str,
        b: &Tensor<T, B>,
        idx_b: &str,
        beta: T,
        idx_c: &str,
        f: ContractFn<T>,
    ) -> Result<()> {
        let la = a.labels(idx_a)?;
        let lb = b.labels(idx_b)?;
        let lc = self.labels(idx_c)?;
        self.contract_labeled(alpha, a, &la, b, &lb, beta, &lc, Some(f))
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn contract_labeled(
        &mut self,
        alpha: T,
        a: &Tensor<T, B>,
        la: &[char],
        b: &Tensor<T, B>,
        lb: &[char],
        beta: T,
        lc: &[char],
        f: Option<ContractFn<T>>,
    ) -> Result<()> {
        a.check_labels(la)?;
        b.check_labels(lb)?;
        self.check_labels(lc)?;
        check_unique(lc)?;
        if a.world != self.world || b.world != self.world {
            return Err(Error::WorldMismatch);
        }
        bind_extents(&[(la, &a.len), (lb, &b.len), (lc, &self.len)])?;
        sym::check_flow(lc, &self.sym, &[(la, &a.sym), (lb, &b.sym)])?;

        self.contract_kernel(alpha, a, la, b, lb, beta, lc, f);
        Ok(())
    }

    /// Run a contraction whose operands were already validated.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn contract_kernel(
        &mut self,
        alpha: T,
        a: &Tensor<T, B>,
        la: &[char],
        b: &Tensor<T, B>,
        lb: &[char],
        beta: T,
        lc: &[char],
        f: Option<ContractFn<T>>,
    ) {
        let _prof = self.trace_op("contract");
        let (ma, mb, mc) = (modes(la), modes(lb), modes(lc));
        let ar = self.arithmetic;
        self.backend
            .scale(&ar, beta, &mut self.data, &self.len, &mc, None);
        self.backend.contract(
            &ar,
            alpha,
            &a.data,
            &a.len,
            &ma,
            &b.data,
            &b.len,
            &mb,
            &mut self.data,
            &self.len,
            &mc,
            f,
        );
        self.symmetrize();
    }

    /// `self[idx] = α·self[idx]`; a repeated label scales only the diagonal.
    pub fn scale(&mut self, alpha: T, idx: &str) -> Result<()> {
        let labels = self.labels(idx)?;
        self.scale_labeled(alpha, &labels, None)
    }

    /// [`Tensor::scale`] with an element-wise override `f(α, &mut a)`.
    pub fn scale_with(&mut self, alpha: T, idx: &str, f: ScaleFn<T>) -> Result<()> {
        let labels = self.labels(idx)?;
        self.scale_labeled(alpha, &labels, Some(f))
    }

    fn scale_labeled(&mut self, alpha: T, labels: &[char], f: Option<ScaleFn<T>>) -> Result<()> {
        bind_extents(&[(labels, &self.len)])?;
        let _prof = self.trace_op("scale");
        let ar = self.arithmetic;
        self.backend
            .scale(&ar, alpha, &mut self.data, &self.len, &modes(labels), f);
        self.symmetrize();
        Ok(())
    }

    /// Work estimate for `self[idx_c] = A[idx_a]·B[idx_b]`, without running it.
    ///
    /// The estimate is the size of the label space divided over the ranks of
    /// this tensor's world, and grows monotonically with every extent.
    pub fn estimate_cost_contract(
        &self,
        a: &Tensor<T, B>,
        idx_a: &str,
        b: &Tensor<T, B>,
        idx_b: &str,
        idx_c: &str,
    ) -> Result<u64> {
        let la = a.labels(idx_a)?;
        let lb = b.labels(idx_b)?;
        let lc = self.labels(idx_c)?;
        let extents = bind_extents(&[(&la, &a.len), (&lb, &b.len), (&lc, &self.len)])?;
        Ok(self.cost_of(&extents))
    }

    /// Work estimate for `self[idx_b] = A[idx_a]`, without running it.
    pub fn estimate_cost_sum(&self, a: &Tensor<T, B>, idx_a: &str, idx_b: &str) -> Result<u64> {
        let la = a.labels(idx_a)?;
        let lb = self.labels(idx_b)?;
        let extents = bind_extents(&[(&la, &a.len), (&lb, &self.len)])?;
        Ok(self.cost_of(&extents))
    }

    fn cost_of(&self, extents: &HashMap<char, usize>) -> u64 {
        let work = extents
            .values()
            .fold(1u64, |acc, &n| acc.saturating_mul(n as u64));
        work.div_ceil(self.world.nproc() as u64)
    }
}
