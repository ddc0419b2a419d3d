//! Algebraic structures for tensor operations.
//!
//! This module defines:
//! - [`Scalar`] and [`Element`]: the element types a tensor can hold
//! - [`Semiring`]: compile-time semirings with [`Standard<T>`] `(+, ×)` and,
//!   behind the `tropical` feature, [`MaxPlus<T>`], [`MinPlus<T>`], [`MaxMul<T>`]
//! - [`Arithmetic<T>`]: a runtime semiring table, used as a tensor's
//!   arithmetic override and handed to the kernels

mod arithmetic;
mod semiring;
mod standard;
mod tropical;

pub use arithmetic::Arithmetic;
pub use num_complex::{Complex32, Complex64};
pub use semiring::Semiring;
pub use standard::Standard;

#[cfg(feature = "tropical")]
pub use tropical::{MaxMul, MaxPlus, MinPlus};

use std::ops::{Add, Mul, Neg, Sub};

use num_traits::{Float, One, Zero};

/// Marker trait for scalar types that can be stored in tensors.
pub trait Scalar:
    Copy + Clone + Send + Sync + Default + std::fmt::Debug + 'static + bytemuck::Pod
{
}

impl Scalar for f32 {}
impl Scalar for f64 {}
impl Scalar for Complex32 {}
impl Scalar for Complex64 {}

/// Numeric element type of a [`Tensor`](crate::Tensor).
///
/// Beyond the semiring operations, the tensor layer needs subtraction and
/// negation (antisymmetric images, `-=`) and a modulus for reductions.
pub trait Element:
    Scalar
    + Zero
    + One
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
{
    /// Real type that moduli and norms are measured in.
    type Real: Float + std::fmt::Debug + Send + Sync + 'static;

    /// Absolute value (modulus for complex numbers).
    fn modulus(self) -> Self::Real;

    /// Embed a real value.
    fn from_real(r: Self::Real) -> Self;
}

impl Element for f32 {
    type Real = f32;

    #[inline]
    fn modulus(self) -> f32 {
        self.abs()
    }

    #[inline]
    fn from_real(r: f32) -> f32 {
        r
    }
}

impl Element for f64 {
    type Real = f64;

    #[inline]
    fn modulus(self) -> f64 {
        self.abs()
    }

    #[inline]
    fn from_real(r: f64) -> f64 {
        r
    }
}

impl Element for Complex32 {
    type Real = f32;

    #[inline]
    fn modulus(self) -> f32 {
        self.norm()
    }

    #[inline]
    fn from_real(r: f32) -> Complex32 {
        Complex32::new(r, 0.0)
    }
}

impl Element for Complex64 {
    type Real = f64;

    #[inline]
    fn modulus(self) -> f64 {
        self.norm()
    }

    #[inline]
    fn from_real(r: f64) -> Complex64 {
        Complex64::new(r, 0.0)
    }
}
