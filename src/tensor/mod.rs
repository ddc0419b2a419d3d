//! Distributed, possibly symmetric, dense tensors.
//!
//! The [`Tensor`] type supports:
//! - Coordinate-level I/O by flat column-major global coordinate
//! - The structural primitives `sum`, `contract` and `scale` over index labels
//! - Slicing, permutation, reduction and transfers between related worlds
//!
//! Storage is dense and column-major with every symmetric image populated,
//! so kernels can address any coordinate directly.

mod io;
pub(crate) mod ops;
mod pair;
mod slice;
mod sparse;
pub(crate) mod sym;

use std::time::Instant;

use tracing::{debug, info};

use crate::algebra::{Arithmetic, Element};
use crate::backend::{Backend, Cpu};
use crate::error::{Error, Result};
use crate::world::World;

pub use io::ReduceOp;
pub use pair::{Pair, PairSet};
pub use sparse::SparseTensor;
pub use sym::Sym;

/// Construction-time options.
///
/// # Example
///
/// ```rust
/// use ctf::{Arithmetic, Sym, Tensor, TensorOptions, World};
///
/// let world = World::new(2).unwrap();
/// let opts = TensorOptions::new()
///     .name("dist")
///     .profile(true)
///     .arithmetic(Arithmetic::custom(f64::INFINITY, 0.0, f64::min, |a, b| a + b));
/// let t = Tensor::<f64>::with_options(&[4, 4], &[Sym::NS, Sym::NS], &world, opts).unwrap();
///
/// assert_eq!(t.name(), Some("dist"));
/// assert!(!t.arithmetic().is_standard());
/// ```
#[derive(Debug, Clone)]
pub struct TensorOptions<T> {
    name: Option<String>,
    profile: bool,
    arithmetic: Option<Arithmetic<T>>,
}

impl<T: Element> TensorOptions<T> {
    pub fn new() -> Self {
        Self {
            name: None,
            profile: false,
            arithmetic: None,
        }
    }

    /// Name used by profiling output.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Emit timing events for every operation on the tensor.
    pub fn profile(mut self, on: bool) -> Self {
        self.profile = on;
        self
    }

    /// Semiring override used by every operation writing into the tensor.
    pub fn arithmetic(mut self, arithmetic: Arithmetic<T>) -> Self {
        self.arithmetic = Some(arithmetic);
        self
    }
}

impl<T: Element> Default for TensorOptions<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A dense N-dimensional tensor distributed over a [`World`].
///
/// # Type Parameters
///
/// * `T` - The element type (f32, f64, Complex32, Complex64)
/// * `B` - The backend running the local kernels
///
/// # Example
///
/// ```rust
/// use ctf::{Tensor, World};
///
/// let world = World::new(1).unwrap();
/// // Column-major: [[1, 3], [2, 4]]
/// let a = Tensor::from_data(&[1.0, 2.0, 3.0, 4.0], &[2, 2], &world).unwrap();
/// let mut c = Tensor::<f64>::zeros(&[2, 2], &world).unwrap();
///
/// // C[i,j] = A[j,i]
/// c.sum(1.0, &a, "ji", 0.0, "ij").unwrap();
/// assert_eq!(c.data(), &[1.0, 3.0, 2.0, 4.0]);
/// ```
#[derive(Clone)]
pub struct Tensor<T: Element, B: Backend = Cpu> {
    /// Dense column-major data, all symmetric images populated
    data: Vec<T>,

    /// Extent of each dimension
    len: Vec<usize>,

    /// `sym[d]` relates dimension d to d + 1
    sym: Vec<Sym>,

    world: World,
    arithmetic: Arithmetic<T>,
    name: Option<String>,
    profile: bool,
    backend: B,
}

impl<T: Element> Tensor<T, Cpu> {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Zero-filled tensor with the given extents and symmetry.
    pub fn new(len: &[usize], sym: &[Sym], world: &World) -> Result<Self> {
        Self::with_options(len, sym, world, TensorOptions::new())
    }

    /// Zero-filled tensor without symmetry.
    pub fn zeros(len: &[usize], world: &World) -> Result<Self> {
        Self::new(len, &vec![Sym::NS; len.len()], world)
    }

    pub fn with_options(
        len: &[usize],
        sym: &[Sym],
        world: &World,
        options: TensorOptions<T>,
    ) -> Result<Self> {
        Self::with_backend(len, sym, world, options, Cpu)
    }

    /// Tensor without symmetry from column-major data.
    pub fn from_data(data: &[T], len: &[usize], world: &World) -> Result<Self> {
        let mut t = Self::zeros(len, world)?;
        if data.len() != t.data.len() {
            return Err(Error::LengthMismatch {
                expected: t.data.len(),
                got: data.len(),
            });
        }
        t.data.copy_from_slice(data);
        Ok(t)
    }

    /// `nrow × ncol` matrix; `sym` relates rows to columns.
    pub fn matrix(nrow: usize, ncol: usize, sym: Sym, world: &World) -> Result<Self> {
        Self::new(&[nrow, ncol], &[sym, Sym::NS], world)
    }

    pub fn vector(n: usize, world: &World) -> Result<Self> {
        Self::zeros(&[n], world)
    }

    /// Order-0 tensor holding `val`.
    pub fn scalar(val: T, world: &World) -> Result<Self> {
        let mut t = Self::zeros(&[], world)?;
        t.data[0] = val;
        Ok(t)
    }
}

impl<T: Element, B: Backend> Tensor<T, B> {
    /// Zero-filled tensor on an explicit backend.
    pub fn with_backend(
        len: &[usize],
        sym: &[Sym],
        world: &World,
        options: TensorOptions<T>,
        backend: B,
    ) -> Result<Self> {
        sym::validate(len, sym)?;
        let arithmetic = options.arithmetic.unwrap_or_default();
        let size = len.iter().product();
        debug!(?len, ?sym, world = world.id(), "tensor created");
        Ok(Self {
            data: vec![arithmetic.zero(); size],
            len: len.to_vec(),
            sym: sym.to_vec(),
            world: world.clone(),
            arithmetic,
            name: options.name,
            profile: options.profile,
            backend,
        })
    }

    /// Zero-filled tensor with the same shape, symmetry, world and arithmetic.
    pub fn zeros_like(&self) -> Self {
        self.twin_in(&self.world)
    }

    /// Zero-filled tensor like `self` but living in `world`.
    pub fn twin_in(&self, world: &World) -> Self {
        Self {
            data: vec![self.arithmetic.zero(); self.data.len()],
            len: self.len.clone(),
            sym: self.sym.clone(),
            world: world.clone(),
            arithmetic: self.arithmetic,
            name: None,
            profile: false,
            backend: self.backend.clone(),
        }
    }

    // ========================================================================
    // Metadata
    // ========================================================================

    #[inline]
    pub fn ndim(&self) -> usize {
        self.len.len()
    }

    /// Extent of each dimension.
    #[inline]
    pub fn lens(&self) -> &[usize] {
        &self.len
    }

    #[inline]
    pub fn sym(&self) -> &[Sym] {
        &self.sym
    }

    /// Total number of addressable coordinates.
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Arithmetic used by every operation writing into this tensor.
    #[inline]
    pub fn arithmetic(&self) -> &Arithmetic<T> {
        &self.arithmetic
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Dense column-major contents.
    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn profile_on(&mut self) {
        self.profile = true;
    }

    pub fn profile_off(&mut self) {
        self.profile = false;
    }

    pub fn is_profiling(&self) -> bool {
        self.profile
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    /// Log the start of a collective and, when profiling, time it.
    pub(crate) fn trace_op(&self, op: &'static str) -> Option<ProfileGuard> {
        debug!(op, tensor = self.name.as_deref().unwrap_or("-"), "tensor op");
        self.profile.then(|| ProfileGuard {
            op,
            name: self.name.clone().unwrap_or_default(),
            start: Instant::now(),
        })
    }

    /// Column-major global coordinate of `idx`.
    pub(crate) fn offset(&self, idx: &[usize]) -> usize {
        let mut g = 0;
        let mut stride = 1;
        for (&i, &n) in idx.iter().zip(self.len.iter()) {
            g += i * stride;
            stride *= n;
        }
        g
    }

    /// Multi-index of global coordinate `g`.
    pub(crate) fn decode(&self, mut g: usize, idx: &mut [usize]) {
        for (i, &n) in idx.iter_mut().zip(self.len.iter()) {
            *i = g % n;
            g /= n;
        }
    }

    pub(crate) fn check_coord(&self, g: usize) -> Result<()> {
        if g >= self.data.len() {
            return Err(Error::OutOfRange {
                index: g,
                size: self.data.len(),
            });
        }
        Ok(())
    }

    /// Parse a label string, one label per dimension.
    pub(crate) fn labels(&self, idx: &str) -> Result<Vec<char>> {
        let labels: Vec<char> = idx.chars().collect();
        self.check_labels(&labels)?;
        Ok(labels)
    }

    pub(crate) fn check_labels(&self, labels: &[char]) -> Result<()> {
        if labels.len() != self.ndim() {
            return Err(Error::LabelCount {
                ndim: self.ndim(),
                got: labels.len(),
            });
        }
        Ok(())
    }

    pub(crate) fn symmetrize(&mut self) {
        let zero = self.arithmetic.zero();
        sym::symmetrize(&mut self.data, &self.len, &self.sym, zero);
    }
}

/// Times one operation on a profiled tensor; reports on drop.
pub(crate) struct ProfileGuard {
    op: &'static str,
    name: String,
    start: Instant,
}

impl Drop for ProfileGuard {
    fn drop(&mut self) {
        info!(
            tensor = %self.name,
            op = self.op,
            elapsed_us = self.start.elapsed().as_micros() as u64,
            "profile"
        );
    }
}

/// Compute contiguous strides for column-major (Fortran) layout.
///
/// For shape [m, n], returns strides [1, m] (first dimension is contiguous).
pub fn compute_contiguous_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = Vec::with_capacity(shape.len());
    let mut acc = 1;
    for &n in shape {
        strides.push(acc);
        acc *= n;
    }
    strides
}

impl<T: Element, B: Backend> std::fmt::Debug for Tensor<T, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tensor")
            .field("name", &self.name)
            .field("len", &self.len)
            .field("sym", &self.sym)
            .field("world", &self.world)
            .field("backend", &B::name())
            .finish()
    }
}
