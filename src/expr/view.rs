//! Labeled views over tensors: the leaves and destinations of expressions.

use std::borrow::Cow;
use std::ops::{Mul, Neg};

use num_complex::{Complex32, Complex64};

use super::eval::evaluate;
use super::term::Term;
use crate::algebra::Element;
use crate::backend::Backend;
use crate::error::Result;
use crate::tensor::Tensor;

/// A tensor with one label per dimension and an optional multiplier.
///
/// A multiplier of `None` is the multiplicative identity of whatever
/// arithmetic evaluates the view.
#[derive(Clone)]
pub struct LabeledView<'a, T: Element, B: Backend> {
    pub(crate) tensor: Cow<'a, Tensor<T, B>>,
    pub(crate) labels: Vec<char>,
    pub(crate) scale: Option<T>,
}

impl<'a, T: Element, B: Backend> LabeledView<'a, T, B> {
    pub fn tensor(&self) -> &Tensor<T, B> {
        &self.tensor
    }

    pub fn labels(&self) -> &[char] {
        &self.labels
    }

    pub fn scale(&self) -> Option<T> {
        self.scale
    }

    /// Fold `alpha` into the multiplier.
    pub fn scaled(mut self, alpha: T) -> Self {
        let ar = *self.tensor.arithmetic();
        self.scale = Some(ar.mul(self.scale.unwrap_or(ar.one()), alpha));
        self
    }

    pub(crate) fn negated(mut self) -> Self {
        let one = self.tensor.arithmetic().one();
        self.scale = Some(-self.scale.unwrap_or(one));
        self
    }
}

/// A destination: the left-hand side of an assignment.
///
/// # Example
///
/// ```rust
/// use ctf::{Tensor, World};
///
/// let world = World::new(1).unwrap();
/// let a = Tensor::from_data(&[1.0, 3.0, 2.0, 4.0], &[2, 2], &world).unwrap();
/// let b = Tensor::from_data(&[5.0, 7.0, 6.0, 8.0], &[2, 2], &world).unwrap();
/// let mut c = Tensor::<f64>::zeros(&[2, 2], &world).unwrap();
///
/// c.idx_mut("ij").assign(a.idx("ik") * b.idx("kj")).unwrap();
/// assert_eq!(c.data(), &[19.0, 43.0, 22.0, 50.0]);
///
/// c.idx_mut("ij").sub_assign(a.idx("ik") * b.idx("kj")).unwrap();
/// assert_eq!(c.data(), &[0.0; 4]);
/// ```
pub struct LabeledViewMut<'a, T: Element, B: Backend> {
    tensor: &'a mut Tensor<T, B>,
    labels: Vec<char>,
}

impl<'a, T: Element, B: Backend> LabeledViewMut<'a, T, B> {
    pub fn labels(&self) -> &[char] {
        &self.labels
    }

    /// `dest = term`.
    pub fn assign<'b>(&mut self, term: impl Into<Term<'b, T, B>>) -> Result<()> {
        let zero = self.tensor.arithmetic().zero();
        evaluate(self.tensor, &self.labels, term.into(), zero)
    }

    /// `dest += term`.
    pub fn add_assign<'b>(&mut self, term: impl Into<Term<'b, T, B>>) -> Result<()> {
        let one = self.tensor.arithmetic().one();
        evaluate(self.tensor, &self.labels, term.into(), one)
    }

    /// `dest -= term`.
    pub fn sub_assign<'b>(&mut self, term: impl Into<Term<'b, T, B>>) -> Result<()> {
        let one = self.tensor.arithmetic().one();
        let term = term.into().negated_in(self.tensor.arithmetic());
        evaluate(self.tensor, &self.labels, term, one)
    }

    /// `dest = dest * term`, contracting over the labels they share.
    pub fn mul_assign<'b>(&mut self, term: impl Into<Term<'b, T, B>>) -> Result<()> {
        let current = LabeledView {
            tensor: Cow::Owned(self.tensor.clone()),
            labels: self.labels.clone(),
            scale: None,
        };
        let zero = self.tensor.arithmetic().zero();
        evaluate(self.tensor, &self.labels, current * term.into(), zero)
    }
}

impl<T: Element, B: Backend> Tensor<T, B> {
    /// Operand view borrowing this tensor.
    pub fn idx(&self, labels: &str) -> LabeledView<'_, T, B> {
        LabeledView {
            tensor: Cow::Borrowed(self),
            labels: labels.chars().collect(),
            scale: None,
        }
    }

    /// Operand view over a fresh copy, usable while the tensor is a destination.
    pub fn idx_owned(&self, labels: &str) -> LabeledView<'static, T, B> {
        LabeledView {
            tensor: Cow::Owned(self.clone()),
            labels: labels.chars().collect(),
            scale: None,
        }
    }

    /// Destination view.
    pub fn idx_mut(&mut self, labels: &str) -> LabeledViewMut<'_, T, B> {
        LabeledViewMut {
            tensor: self,
            labels: labels.chars().collect(),
        }
    }
}

impl<'a, T: Element, B: Backend> Neg for LabeledView<'a, T, B> {
    type Output = Self;

    fn neg(self) -> Self {
        self.negated()
    }
}

macro_rules! impl_scalar_mul {
    ($($t:ty),*) => {$(
        impl<'a, B: Backend> Mul<$t> for LabeledView<'a, $t, B> {
            type Output = Self;

            fn mul(self, alpha: $t) -> Self {
                self.scaled(alpha)
            }
        }

        impl<'a, B: Backend> Mul<LabeledView<'a, $t, B>> for $t {
            type Output = LabeledView<'a, $t, B>;

            fn mul(self, view: LabeledView<'a, $t, B>) -> LabeledView<'a, $t, B> {
                view.scaled(self)
            }
        }
    )*};
}

impl_scalar_mul!(f32, f64, Complex32, Complex64);
