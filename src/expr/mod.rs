//! Index-notation expressions over tensors.
//!
//! Operators on labeled views build a [`Term`] tree without touching data;
//! a destination trigger on a [`LabeledViewMut`] consumes the tree and
//! evaluates it with `sum` and `contract` calls on the destination.
//!
//! # Example
//!
//! ```rust
//! use ctf::{Tensor, World};
//!
//! let world = World::new(1).unwrap();
//! let a = Tensor::from_data(&[1.0, 2.0, 3.0], &[3], &world).unwrap();
//! let b = Tensor::from_data(&[4.0, 5.0, 6.0], &[3], &world).unwrap();
//! let mut dot = Tensor::scalar(0.0, &world).unwrap();
//!
//! dot.idx_mut("").assign(a.idx("i") * b.idx("i")).unwrap();
//! assert_eq!(dot.get_val().unwrap(), 32.0);
//! ```

mod eval;
mod term;
mod view;

pub use term::Term;
pub use view::{LabeledView, LabeledViewMut};
