//! Local kernels behind the tensor operations.
//!
//! This module defines the [`Backend`] trait and its implementation:
//! - [`Cpu`]: dense column-major kernels, with GEMM through `faer` for
//!   plain `f32`/`f64` contractions
//!
//! The tensor layer validates labels, extents and symmetry before calling a
//! backend, so kernels assume well-formed arguments.

mod cpu;
mod traits;

pub use cpu::Cpu;
pub use traits::{Backend, ContractFn, ScaleFn, SumFn};
