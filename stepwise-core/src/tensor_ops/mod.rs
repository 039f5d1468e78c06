//! Operations on tensors like [Tensor::square], [TryAdd::try_add], [Tensor::mean] and [Backward::backward].
//!
//! # Fallibility
//!
//! Every operation has a `try_*` version that returns a [Result] instead of
//! panicking, e.g. [Tensor::try_square], [TryMul::try_mul].
//! Binary operations error with [crate::tensor::Error::ShapeMismatch] when
//! the operands disagree on shape. There is no broadcasting.
//!
//! # Tapes
//!
//! All operations are generic over the tape, and only record a backward
//! operation when the tensor carries an [crate::tensor::OwnedTape]:
//!
//! ```rust
//! # use stepwise_core::prelude::*;
//! # let dev: Cpu = Default::default();
//! let a: Tensor<f32> = dev.tensor([1.0, 2.0]);
//! let b: Tensor<f32> = dev.tensor([3.0, 4.0]);
//! let untraced: Tensor<f32> = a.clone() * b.clone();
//! let traced: Tensor<f32, OwnedTape<f32>> = a.leaky_trace() * b;
//! ```
//!
//! # Scalar operands
//!
//! [TryAdd], [TrySub] and [TryMul] are also implemented with a plain
//! element as the right hand side:
//!
//! ```rust
//! # use stepwise_core::prelude::*;
//! # let dev: Cpu = Default::default();
//! let a: Tensor<f32> = dev.tensor([1.0, 2.0]);
//! let r = (a * 2.0 - 1.0) + 0.5;
//! assert_eq!(r.as_vec(), [1.5, 3.5]);
//! ```

mod add;
mod backward;
mod mul;
mod negate;
mod reduce;
mod square;
mod sub;
pub(crate) mod utilities;

pub use add::TryAdd;
pub use backward::Backward;
pub use mul::TryMul;
pub use sub::TrySub;

#[cfg(doc)]
use crate::tensor::Tensor;
