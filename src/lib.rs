//! # ctf
//!
//! Distributed dense tensor algebra with symmetry, index-notation expressions
//! and semiring overrides.
//!
//! ## Features
//!
//! - **Index notation**: `c.idx_mut("ij").assign(a.idx("ik") * b.idx("kj"))`
//! - **Symmetry**: symmetric, antisymmetric and symmetric-hollow dimension pairs
//! - **Semiring-agnostic**: standard `(+, ×)` or any [`Arithmetic`] override,
//!   including tropical semirings behind the `tropical` feature
//! - **Worlds**: tensors live on a [`World`]; slices, permutations and
//!   transfers move data between related worlds
//! - **Coordinate I/O**: blended reads and writes by global coordinate
//!
//! ## Quick Start
//!
//! ```rust
//! use ctf::{Sym, Tensor, World};
//!
//! let world = World::new(4).unwrap();
//!
//! // Column-major: A = [[1, 2], [3, 4]], B = [[5, 6], [7, 8]]
//! let a = Tensor::from_data(&[1.0, 3.0, 2.0, 4.0], &[2, 2], &world).unwrap();
//! let b = Tensor::from_data(&[5.0, 7.0, 6.0, 8.0], &[2, 2], &world).unwrap();
//!
//! let mut c = Tensor::<f64>::zeros(&[2, 2], &world).unwrap();
//! c.idx_mut("ij").assign(a.idx("ik") * b.idx("kj")).unwrap();
//! assert_eq!(c.data(), &[19.0, 43.0, 22.0, 50.0]);
//!
//! // Outer product v vᵀ stored symmetrically
//! let v = Tensor::from_data(&[1.0, 2.0], &[2], &world).unwrap();
//! let mut s = Tensor::<f64>::matrix(2, 2, Sym::SY, &world).unwrap();
//! s.idx_mut("ij").assign(v.idx("i") * v.idx("j")).unwrap();
//! assert_eq!(s.data(), &[1.0, 2.0, 2.0, 4.0]);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         User API                            │
//! │   c.idx_mut("ij").assign(a.idx("ik") * b.idx("kj"))         │
//! │   Term tree → recursive evaluator (expr)                    │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Tensor primitives                       │
//! │   sum / contract / scale, symmetry checks, coordinate I/O,  │
//! │   slices, permutations, subworld transfers                  │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Backend (Cpu) kernels                    │
//! │   Standard f32/f64 pairwise contraction → faer GEMM         │
//! │   Anything else → label-space loops over Arithmetic<T>      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod algebra;
pub mod backend;
pub mod error;
pub mod expr;
pub mod tensor;
pub mod world;

// Re-exports
pub use algebra::{Arithmetic, Complex32, Complex64, Element, Scalar, Semiring, Standard};
pub use backend::{Backend, ContractFn, Cpu, ScaleFn, SumFn};
pub use error::{Error, Result};
pub use expr::{LabeledView, LabeledViewMut, Term};
pub use tensor::{Pair, PairSet, ReduceOp, SparseTensor, Sym, Tensor, TensorOptions};
pub use world::{World, WorldRelation};

#[cfg(feature = "tropical")]
pub use algebra::{MaxMul, MaxPlus, MinPlus};
