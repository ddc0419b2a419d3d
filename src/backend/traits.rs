//! Backend trait definitions.

use crate::algebra::{Arithmetic, Element};

/// Element-wise summation override: `f(α, a, &mut b)`.
///
/// Replaces the default `b = b ⊕ α ⊗ a`.
pub type SumFn<T> = fn(T, T, &mut T);

/// Element-wise contraction override: `f(α, a, b, &mut c)`.
///
/// Replaces the default `c = c ⊕ α ⊗ a ⊗ b`.
pub type ContractFn<T> = fn(T, T, T, &mut T);

/// Element-wise scaling override: `f(α, &mut a)`.
///
/// Replaces the default `a = α ⊗ a`.
pub type ScaleFn<T> = fn(T, &mut T);

/// Backend trait for the local multiply-add kernels.
///
/// Buffers are dense and column-major. Modes are integer labels, one per
/// dimension; a mode repeated inside one operand addresses that operand's
/// diagonal. Extents of equal modes agree across operands.
///
/// `sum` and `contract` accumulate into `c`: the caller applies the β
/// coefficient through [`Backend::scale`] beforehand.
pub trait Backend: Clone + Default + Send + Sync + std::fmt::Debug + 'static {
    /// Backend name for debugging.
    fn name() -> &'static str;

    /// Computes `c[modes_c] ⊕= α ⊗ Σ a[modes_a]`.
    ///
    /// Modes only in `a` are reduced; modes only in `c` are broadcast.
    #[allow(clippy::too_many_arguments)]
    fn sum<T: Element>(
        &self,
        arithmetic: &Arithmetic<T>,
        alpha: T,
        a: &[T],
        shape_a: &[usize],
        modes_a: &[i32],
        c: &mut [T],
        shape_c: &[usize],
        modes_c: &[i32],
        f: Option<SumFn<T>>,
    );

    /// Computes `c[modes_c] ⊕= α ⊗ Σ a[modes_a] ⊗ b[modes_b]`.
    ///
    /// Modes in both `a` and `b` but absent from `c` are contracted.
    #[allow(clippy::too_many_arguments)]
    fn contract<T: Element>(
        &self,
        arithmetic: &Arithmetic<T>,
        alpha: T,
        a: &[T],
        shape_a: &[usize],
        modes_a: &[i32],
        b: &[T],
        shape_b: &[usize],
        modes_b: &[i32],
        c: &mut [T],
        shape_c: &[usize],
        modes_c: &[i32],
        f: Option<ContractFn<T>>,
    );

    /// Computes `a[modes] = α ⊗ a[modes]`, touching only the addressed
    /// entries (the diagonal when a mode repeats).
    ///
    /// Without an override, `α = 0` overwrites with zero.
    fn scale<T: Element>(
        &self,
        arithmetic: &Arithmetic<T>,
        alpha: T,
        a: &mut [T],
        shape: &[usize],
        modes: &[i32],
        f: Option<ScaleFn<T>>,
    );
}
