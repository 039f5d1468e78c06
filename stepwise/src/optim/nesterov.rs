use std::marker::PhantomData;

use stepwise_core::{
    dtypes::Dtype,
    shared::{Expr, GradientSource, ParamStore, Shared, Updates},
    tensor::Error,
};

use super::{alloc_state, check_state, checked_gradient, coefficient, MomentumConfig, UpdateRule};

/// Gradient descent with Nesterov momentum, in the look ahead form that
/// only needs the gradient at `W_t`.
///
/// ```text
/// V_prev_{t+1} = V_t
/// V_{t+1}      = momentum * V_t - lr * grad(W_t)
/// W_{t+1}      = W_t - momentum * V_prev_{t+1} + (1 + momentum) * V_{t+1}
/// ```
///
/// See [On the importance of initialization and momentum in deep learning](https://proceedings.mlr.press/v28/sutskever13.html).
///
/// Keeps two tensors in the [ParamStore] next to the weights,
/// `velocity_{weights}` and `velocity_prev_{weights}`, both zero filled when
/// the rule is constructed. `velocity_{weights}` is shared with any
/// [super::Momentum] built for the same weights. Each step produces three
/// pairs in the order above. They are committed at once, so the weight pair
/// substitutes the expressions of the other two and only reads `W_t` and
/// `V_t`.
///
/// ```rust
/// # use stepwise::prelude::*;
/// # let dev: Cpu = Default::default();
/// let mut store = ParamStore::new();
/// let w = store.insert("w", dev.tensor([1.0f32])).unwrap();
/// let opt = Nesterov::new(&mut store, &w, MomentumConfig { lr: 0.25, momentum: 0.5 }).unwrap();
///
/// // grad of w^2 at 1.0 is 2.0
/// let grads = sum_squared(store.trace(&w).unwrap()).backward();
/// opt.step(&mut store, &grads).unwrap();
/// assert_eq!(store.get(opt.velocity_prev()).unwrap().as_vec(), [0.0]);
/// assert_eq!(store.get(opt.velocity()).unwrap().as_vec(), [-0.5]);
/// assert_eq!(store.get(&w).unwrap().as_vec(), [0.25]);
/// ```
#[derive(Debug, Clone)]
pub struct Nesterov<E> {
    /// Hyperparameter configuration
    pub cfg: MomentumConfig,

    weights: Shared,
    velocity: Shared,
    velocity_prev: Shared,

    marker: PhantomData<E>,
}

impl<E: Dtype> Nesterov<E> {
    /// Allocates both velocities of `weights` in `store`, reusing any that
    /// are already present with the right shape. Both are checked before
    /// either is allocated, so on error `store` is unchanged.
    pub fn new(store: &mut ParamStore<E>, weights: &Shared, cfg: MomentumConfig) -> Result<Self, Error> {
        cfg.validate()?;
        let velocity_name = std::format!("velocity_{}", weights.name());
        let velocity_prev_name = std::format!("velocity_prev_{}", weights.name());
        check_state(store, &velocity_name, weights)?;
        check_state(store, &velocity_prev_name, weights)?;
        let velocity = alloc_state(store, velocity_name, weights)?;
        let velocity_prev = alloc_state(store, velocity_prev_name, weights)?;
        Ok(Self {
            cfg,
            weights: weights.clone(),
            velocity,
            velocity_prev,
            marker: PhantomData,
        })
    }

    pub fn velocity(&self) -> &Shared {
        &self.velocity
    }

    /// The velocity of the previous step.
    pub fn velocity_prev(&self) -> &Shared {
        &self.velocity_prev
    }
}

impl<E: Dtype> UpdateRule<E> for Nesterov<E> {
    fn weights(&self) -> &Shared {
        &self.weights
    }

    fn updates(&self, loss: &dyn GradientSource<E>) -> Result<Updates<E>, Error> {
        self.cfg.validate()?;
        let lr: E = coefficient("lr", self.cfg.lr)?;
        let momentum: E = coefficient("momentum", self.cfg.momentum)?;
        let grad = checked_gradient(loss, &self.weights)?;

        let velocity_prev = Expr::from(&self.velocity);
        let velocity = Expr::from(&self.velocity) * momentum - Expr::constant(grad) * lr;
        let weights = Expr::from(&self.weights) - velocity_prev.clone() * momentum
            + velocity.clone() * (E::ONE + momentum);

        let mut updates = Updates::new();
        updates.push(&self.velocity_prev, velocity_prev);
        updates.push(&self.velocity, velocity);
        updates.push(&self.weights, weights);
        Ok(updates)
    }
}
