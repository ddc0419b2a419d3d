//! Runtime semiring table.

use std::any::TypeId;

use super::semiring::Semiring;
use super::standard::Standard;
use super::Element;

/// The arithmetic a tensor operation runs in: identities plus ⊕ and ⊗.
///
/// Every tensor evaluates `sum`, `contract` and the α/β blends of its I/O in
/// an `Arithmetic`. By default that is [`Standard`]; a tensor created with an
/// override (see [`TensorOptions`](crate::TensorOptions)) uses the override
/// for every operation that writes into it.
///
/// # Example
///
/// ```rust
/// use ctf::algebra::Arithmetic;
///
/// let std = Arithmetic::<f64>::standard();
/// assert_eq!(std.mul(2.0, 3.0), 6.0);
///
/// let max = Arithmetic::<f64>::custom(f64::MIN, 0.0, f64::max, |a, b| a + b);
/// assert_eq!(max.add(2.0, 3.0), 3.0);
/// assert!(!max.is_standard());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Arithmetic<T> {
    zero: T,
    one: T,
    add: fn(T, T) -> T,
    mul: fn(T, T) -> T,
    standard: bool,
}

impl<T: Element> Arithmetic<T> {
    /// Ordinary `(+, ×)` arithmetic.
    pub fn standard() -> Self {
        Self::of::<Standard<T>>()
    }

    /// Arithmetic of a compile-time [`Semiring`].
    pub fn of<S: Semiring<Scalar = T>>() -> Self {
        Self {
            zero: S::zero(),
            one: S::one(),
            add: S::add,
            mul: S::mul,
            standard: TypeId::of::<S>() == TypeId::of::<Standard<T>>(),
        }
    }

    /// Arithmetic from explicit identities and operations.
    pub fn custom(zero: T, one: T, add: fn(T, T) -> T, mul: fn(T, T) -> T) -> Self {
        Self {
            zero,
            one,
            add,
            mul,
            standard: false,
        }
    }

    /// Additive identity.
    #[inline]
    pub fn zero(&self) -> T {
        self.zero
    }

    /// Multiplicative identity.
    #[inline]
    pub fn one(&self) -> T {
        self.one
    }

    #[inline]
    pub fn add(&self, a: T, b: T) -> T {
        (self.add)(a, b)
    }

    #[inline]
    pub fn mul(&self, a: T, b: T) -> T {
        (self.mul)(a, b)
    }

    /// Whether this is plain `(+, ×)`, which enables the GEMM kernels.
    #[inline]
    pub fn is_standard(&self) -> bool {
        self.standard
    }

    /// `α ⊗ x ⊕ β ⊗ y`.
    ///
    /// A zero coefficient drops its term entirely, so `β = 0` overwrites `y`
    /// even when `y` holds garbage and `α = 0, β = 1` returns `y` unchanged.
    #[inline]
    pub fn blend(&self, alpha: T, x: T, beta: T, y: T) -> T {
        if beta == self.zero {
            if alpha == self.zero {
                self.zero
            } else {
                self.mul(alpha, x)
            }
        } else if alpha == self.zero {
            self.mul(beta, y)
        } else {
            self.add(self.mul(alpha, x), self.mul(beta, y))
        }
    }
}

impl<T: Element> Default for Arithmetic<T> {
    fn default() -> Self {
        Self::standard()
    }
}
