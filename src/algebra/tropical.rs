//! Tropical semirings for path and probability problems.
//!
//! | Semiring  | ⊕   | ⊗ | use                       |
//! |-----------|-----|---|---------------------------|
//! | `MaxPlus` | max | + | longest path, Viterbi     |
//! | `MinPlus` | min | + | shortest path             |
//! | `MaxMul`  | max | × | most probable assignment  |
//!
//! The infinities are the type's bounds, so `MinPlus<f64>` reports an
//! unreachable entry as `f64::MAX`.

#![cfg(feature = "tropical")]

use std::marker::PhantomData;
use std::ops::{Add, Mul};

use num_traits::{Bounded, One, Zero};

use super::semiring::Semiring;
use super::Scalar;

/// `(max, +)` with zero at the type's minimum.
#[derive(Debug, Clone, Copy)]
pub struct MaxPlus<T>(PhantomData<T>);

/// `(min, +)` with zero at the type's maximum.
#[derive(Debug, Clone, Copy)]
pub struct MinPlus<T>(PhantomData<T>);

/// `(max, ×)` over non-negative values.
#[derive(Debug, Clone, Copy)]
pub struct MaxMul<T>(PhantomData<T>);

#[inline]
fn max<T: PartialOrd>(a: T, b: T) -> T {
    if a >= b {
        a
    } else {
        b
    }
}

#[inline]
fn min<T: PartialOrd>(a: T, b: T) -> T {
    if a <= b {
        a
    } else {
        b
    }
}

impl<T> Semiring for MaxPlus<T>
where
    T: Scalar + Bounded + Zero + PartialOrd + Add<Output = T>,
{
    type Scalar = T;

    fn zero() -> T {
        T::min_value()
    }

    fn one() -> T {
        T::zero()
    }

    #[inline]
    fn add(a: T, b: T) -> T {
        max(a, b)
    }

    #[inline]
    fn mul(a: T, b: T) -> T {
        a + b
    }
}

impl<T> Semiring for MinPlus<T>
where
    T: Scalar + Bounded + Zero + PartialOrd + Add<Output = T>,
{
    type Scalar = T;

    fn zero() -> T {
        T::max_value()
    }

    fn one() -> T {
        T::zero()
    }

    #[inline]
    fn add(a: T, b: T) -> T {
        min(a, b)
    }

    #[inline]
    fn mul(a: T, b: T) -> T {
        a + b
    }
}

impl<T> Semiring for MaxMul<T>
where
    T: Scalar + Zero + One + PartialOrd + Mul<Output = T>,
{
    type Scalar = T;

    fn zero() -> T {
        T::zero()
    }

    fn one() -> T {
        T::one()
    }

    #[inline]
    fn add(a: T, b: T) -> T {
        max(a, b)
    }

    #[inline]
    fn mul(a: T, b: T) -> T {
        a * b
    }
}
