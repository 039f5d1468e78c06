//! The [Tensor] struct, [Cpu] device, and gradient tape.
//!
//! At a high level a tensor is made up of:
//! 1. A row-major buffer of [crate::dtypes::Dtype] elements, shared with an [std::sync::Arc]
//! 2. A runtime [crate::shapes::Shape]
//! 3. A [UniqueId] that gradients (and committed update values) are keyed by
//! 4. A tape, either [NoneTape] or [OwnedTape]
//!
//! # Creating tensors
//!
//! Tensors are allocated with a [Cpu] device:
//!
//! ```rust
//! # use stepwise_core::prelude::*;
//! let dev: Cpu = Default::default();
//! let a: Tensor<f32> = dev.zeros([2, 3]);
//! let b: Tensor<f32> = dev.tensor([1.0, 2.0, 3.0]);
//! let c: Tensor<f32> = dev.tensor_from_vec(vec![1.0, 2.0, 3.0, 4.0], [2, 2]);
//! let d: Tensor<f32> = dev.sample_normal([4]);
//! ```
//!
//! # Tracking gradients
//!
//! [Tensor::leaky_trace] returns a copy of a tensor (with the same id)
//! that records every operation applied to it. Calling
//! [crate::tensor_ops::Backward::backward] on a scalar result runs the
//! recorded operations in reverse and returns [Gradients]:
//!
//! ```rust
//! # use stepwise_core::prelude::*;
//! # let dev: Cpu = Default::default();
//! let w: Tensor<f32> = dev.tensor([1.0, 2.0, 3.0]);
//! let loss = (w.leaky_trace() * 2.0).sum();
//! let grads = loss.backward();
//! assert_eq!(grads.get(&w).unwrap().as_vec(), [2.0; 3]);
//! ```
//!
//! Tapes are only merged left to right: in a binary operation the tensor
//! carrying the tape must be on the left hand side.

mod cpu;
mod error;
mod ghost;
mod gradients;
pub(crate) mod safetensors;
mod tensor_impl;
mod unique_id;

pub(crate) use unique_id::unique_id;

pub use cpu::Cpu;
pub use error::Error;
pub use ghost::GhostTensor;
pub use gradients::{Gradients, Merge, NoneTape, OwnedTape, Tape};
pub use safetensors::Writer;
pub use tensor_impl::Tensor;
pub use unique_id::{HasUniqueId, UniqueId};
