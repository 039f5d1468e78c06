//! Update rules such as [GradientDescent], [Momentum] and [Nesterov].
//!
//! # Initializing
//!
//! Every rule is built from the [Shared] handle of the weights it updates
//! and a config object:
//! - [GradientDescent::new()] with [GradientDescentConfig]
//! - [Momentum::new()] with [MomentumConfig]
//! - [Nesterov::new()] with [MomentumConfig]
//!
//! The stateful rules allocate their zero filled velocities in the same
//! [ParamStore] as the weights when they are constructed.
//!
//! # Updating weights
//!
//! [UpdateRule::updates()] returns the pairs for one step without changing
//! anything, and [Optimizer::step()] commits them:
//!
//! ```rust
//! # use stepwise::prelude::*;
//! # let dev: Cpu = Default::default();
//! let mut store = ParamStore::new();
//! let w = store.insert("w", dev.tensor([1.0f32, 2.0])).unwrap();
//! let opt = Nesterov::new(&mut store, &w, Default::default()).unwrap();
//!
//! let grads = sum_squared(store.trace(&w).unwrap()).backward();
//! let updates = opt.updates(&grads).unwrap();
//! let targets: Vec<&str> = updates.targets().map(|t| t.name()).collect();
//! assert_eq!(targets, ["velocity_prev_w", "velocity_w", "w"]);
//! store.apply(updates).unwrap();
//! ```
//!
//! Or equivalently `opt.step(&mut store, &grads)`.

mod config;
mod gradient_descent;
mod momentum;
mod nesterov;

pub use config::{GradientDescentConfig, MomentumConfig};
pub use gradient_descent::{gradient_descent_update, GradientDescent};
pub use momentum::Momentum;
pub use nesterov::Nesterov;

use stepwise_core::{
    dtypes::Dtype,
    shapes::HasShape,
    shared::{GradientSource, ParamStore, Shared, Updates},
    tensor::{Error, Tensor},
};

/// Produces the update pairs for one optimization step of a single weight tensor.
///
/// Implementations only read the store (through the returned expressions);
/// nothing changes until the [Updates] are applied.
pub trait UpdateRule<E> {
    /// The weights this rule updates.
    fn weights(&self) -> &Shared;

    /// The update pairs for one step, given the gradients of the loss.
    ///
    /// Errors with [Error::NoGradientPath] if the loss does not depend on
    /// [UpdateRule::weights], and with [Error::InvalidCoefficient] if the
    /// config was changed to an invalid value.
    fn updates(&self, loss: &dyn GradientSource<E>) -> Result<Updates<E>, Error>;
}

/// Computes and commits one step of an [UpdateRule].
pub trait Optimizer<E> {
    fn step(&self, store: &mut ParamStore<E>, loss: &dyn GradientSource<E>) -> Result<(), Error>;
}

impl<E: Dtype, R: UpdateRule<E> + ?Sized> Optimizer<E> for R {
    fn step(&self, store: &mut ParamStore<E>, loss: &dyn GradientSource<E>) -> Result<(), Error> {
        let updates = self.updates(loss)?;
        store.apply(updates)
    }
}

/// `∂loss/∂weights`, which must have the same shape as `weights`.
pub(crate) fn checked_gradient<E: Dtype, G: GradientSource<E> + ?Sized>(
    loss: &G,
    weights: &Shared,
) -> Result<Tensor<E>, Error> {
    let grad = loss.gradient(weights)?;
    if grad.shape() != weights.shape() {
        return Err(Error::ShapeMismatch {
            expected: weights.shape().clone(),
            found: grad.shape().clone(),
        });
    }
    Ok(grad)
}

pub(crate) fn coefficient<E: Dtype>(name: &'static str, value: f64) -> Result<E, Error> {
    E::from_f64(value).ok_or(Error::InvalidCoefficient { name, value })
}

/// Checks that `like` is in `store`, and that a tensor named `name`, if
/// present, has the shape of `like`. Changes nothing.
pub(crate) fn check_state<E: Dtype>(
    store: &ParamStore<E>,
    name: &str,
    like: &Shared,
) -> Result<Option<Shared>, Error> {
    store.get(like)?;
    match store.find(name) {
        Some(state) if state.shape() != like.shape() => Err(Error::ShapeMismatch {
            expected: like.shape().clone(),
            found: state.shape().clone(),
        }),
        found => Ok(found),
    }
}

/// Finds `name` in `store`, or adds it zero filled with the shape of `like`.
///
/// An existing tensor (e.g. loaded from a checkpoint) must have the same
/// shape as `like`.
pub(crate) fn alloc_state<E: Dtype>(
    store: &mut ParamStore<E>,
    name: std::string::String,
    like: &Shared,
) -> Result<Shared, Error> {
    match check_state(store, &name, like)? {
        Some(state) => {
            log::debug!("reusing {state} for {like}");
            Ok(state)
        }
        None => {
            let state = store.zeros_like(name, like)?;
            log::debug!("allocated {state} for {like}");
            Ok(state)
        }
    }
}
