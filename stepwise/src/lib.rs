//! Gradient descent, momentum and Nesterov momentum, expressed as batches of
//! update pairs over a [stepwise_core::shared::ParamStore].
//!
//! An update rule never mutates anything itself. Given something that can
//! produce gradients (a [stepwise_core::shared::GradientSource]), it returns
//! the [stepwise_core::shared::Updates] for one step: each pair names a
//! stored tensor and the expression for its next value. Committing them is
//! left to [stepwise_core::shared::ParamStore::apply], which evaluates every
//! expression against the values from before the step.
//!
//! ```rust
//! use stepwise::prelude::*;
//!
//! let dev: Cpu = Default::default();
//! let mut store = ParamStore::new();
//! let w = store.insert("w", dev.tensor([1.0f32, -1.0])).unwrap();
//!
//! let opt = Momentum::new(&mut store, &w, MomentumConfig { lr: 0.1, momentum: 0.9 }).unwrap();
//! for _ in 0..10 {
//!     let loss = sum_squared(store.trace(&w).unwrap());
//!     let grads = loss.backward();
//!     opt.step(&mut store, &grads).unwrap();
//! }
//! assert_eq!(store.names().collect::<Vec<_>>(), ["velocity_w", "w"]);
//! ```

pub mod optim;

pub use stepwise_core::{dtypes, losses, shapes, shared, tensor, tensor_ops};

/// Contains all public exports.
pub mod prelude {
    pub use crate::optim::*;
    pub use stepwise_core::prelude::*;
}

#[cfg(test)]
pub(crate) mod tests {
    pub use stepwise_core::tests::*;
}
