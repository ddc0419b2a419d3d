//! Ordinary `(+, ×)` arithmetic.

use std::marker::PhantomData;
use std::ops::{Add, Mul};

use num_traits::{One, Zero};

use super::semiring::Semiring;
use super::Scalar;

/// The semiring every tensor uses unless it carries an override.
///
/// Only this semiring reaches the GEMM fast path.
///
/// # Example
///
/// ```rust
/// use ctf::algebra::{Semiring, Standard};
///
/// assert_eq!(Standard::<f64>::add(2.0, 3.0), 5.0);
/// assert_eq!(Standard::<f64>::mul(2.0, 3.0), 6.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Standard<T>(PhantomData<T>);

impl<T> Semiring for Standard<T>
where
    T: Scalar + Zero + One + Add<Output = T> + Mul<Output = T>,
{
    type Scalar = T;

    #[inline]
    fn zero() -> T {
        T::zero()
    }

    #[inline]
    fn one() -> T {
        T::one()
    }

    #[inline]
    fn add(a: T, b: T) -> T {
        a + b
    }

    #[inline]
    fn mul(a: T, b: T) -> T {
        a * b
    }
}
