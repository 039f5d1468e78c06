use std::marker::PhantomData;

use stepwise_core::{
    dtypes::Dtype,
    shared::{Expr, GradientSource, ParamStore, Shared, Updates},
    tensor::Error,
};

use super::{alloc_state, checked_gradient, coefficient, MomentumConfig, UpdateRule};

/// Gradient descent with classic momentum.
///
/// ```text
/// V_{t+1} = momentum * V_t - lr * grad(W_t)
/// W_{t+1} = W_t + V_{t+1}
/// ```
///
/// The velocity `V` is stored as `velocity_{weights}` in the same
/// [ParamStore] as the weights, zero filled when the rule is constructed.
/// Any other rule built for the same weights in the same store (including a
/// [super::Nesterov]) finds and shares that velocity.
/// Each step produces two pairs, the velocity first. Since both are
/// committed at once, the weight pair is written in terms of `V_t`:
/// `W_t + (momentum * V_t - lr * grad)`.
///
/// ```rust
/// # use stepwise::prelude::*;
/// # let dev: Cpu = Default::default();
/// let mut store = ParamStore::new();
/// let w = store.insert("w", dev.tensor([1.0f32])).unwrap();
/// let opt = Momentum::new(&mut store, &w, MomentumConfig { lr: 0.5, momentum: 0.5 }).unwrap();
/// assert_eq!(opt.velocity().name(), "velocity_w");
///
/// // grad of w^2 at 1.0 is 2.0
/// let grads = sum_squared(store.trace(&w).unwrap()).backward();
/// opt.step(&mut store, &grads).unwrap();
/// assert_eq!(store.get(opt.velocity()).unwrap().as_vec(), [-1.0]);
/// assert_eq!(store.get(&w).unwrap().as_vec(), [0.0]);
/// ```
#[derive(Debug, Clone)]
pub struct Momentum<E> {
    /// Hyperparameter configuration
    pub cfg: MomentumConfig,

    weights: Shared,
    velocity: Shared,

    marker: PhantomData<E>,
}

impl<E: Dtype> Momentum<E> {
    /// Allocates the velocity of `weights` in `store`. If `store` already
    /// holds a `velocity_{weights}` (e.g. loaded from a checkpoint) it is
    /// reused, and must have the same shape as `weights`.
    pub fn new(store: &mut ParamStore<E>, weights: &Shared, cfg: MomentumConfig) -> Result<Self, Error> {
        cfg.validate()?;
        let velocity = alloc_state(store, std::format!("velocity_{}", weights.name()), weights)?;
        Ok(Self {
            cfg,
            weights: weights.clone(),
            velocity,
            marker: PhantomData,
        })
    }

    pub fn velocity(&self) -> &Shared {
        &self.velocity
    }
}

impl<E: Dtype> UpdateRule<E> for Momentum<E> {
    fn weights(&self) -> &Shared {
        &self.weights
    }

    fn updates(&self, loss: &dyn GradientSource<E>) -> Result<Updates<E>, Error> {
        self.cfg.validate()?;
        let lr: E = coefficient("lr", self.cfg.lr)?;
        let momentum: E = coefficient("momentum", self.cfg.momentum)?;
        let grad = checked_gradient(loss, &self.weights)?;

        let velocity = Expr::from(&self.velocity) * momentum - Expr::constant(grad) * lr;
        let mut updates = Updates::new();
        updates.push(&self.velocity, velocity.clone());
        updates.push(&self.weights, Expr::from(&self.weights) + velocity);
        Ok(updates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        optim::{gradient_descent_update, Optimizer},
        tests::*,
    };
    use stepwise_core::prelude::*;

    #[test]
    fn test_momentum_scenario() {
        let dev: Cpu = Default::default();
        let mut store = ParamStore::<TestDtype>::new();
        let w = store.insert("w", dev.tensor([1.0])).unwrap();
        let cfg = MomentumConfig {
            lr: 0.1,
            momentum: 0.9,
        };
        let opt = Momentum::new(&mut store, &w, cfg).unwrap();
        assert_eq!(store.get(opt.velocity()).unwrap().as_vec(), [0.0]);

        let grad = FnGradient(|_: &Shared| -> Result<Tensor<TestDtype>, Error> {
            Ok(dev.tensor([2.0]))
        });
        opt.step(&mut store, &grad).unwrap();
        assert_close!(store.get(opt.velocity()).unwrap().as_vec(), vec![-0.2]);
        assert_close!(store.get(&w).unwrap().as_vec(), vec![0.8]);

        opt.step(&mut store, &grad).unwrap();
        assert_close!(store.get(opt.velocity()).unwrap().as_vec(), vec![-0.38]);
        assert_close!(store.get(&w).unwrap().as_vec(), vec![0.42]);
    }

    #[test]
    fn test_momentum_sequence() {
        let dev: Cpu = Default::default();
        let mut store = ParamStore::<TestDtype>::new();
        let t = store.insert("t", dev.ones([5])).unwrap();
        let cfg = MomentumConfig {
            lr: 1e-2,
            momentum: 0.5,
        };
        let opt = Momentum::new(&mut store, &t, cfg).unwrap();

        let rate: Tensor<TestDtype> = dev.tensor([0.1, 1.0, 2.0, 10.0, 100.0]);
        let expected = [
            [0.9998, 0.998, 0.996, 0.98, 0.8],
            [0.99950004, 0.995, 0.99, 0.95000005, 0.5],
            [0.99915004, 0.9915, 0.983, 0.915, 0.15],
            [0.99877506, 0.98775, 0.9755, 0.8775, -0.225],
            [0.9983876, 0.983875, 0.96775, 0.83875, -0.61249995],
        ];
        for e in expected.iter() {
            let grads = (store.trace(&t).unwrap() * rate.clone()).mean().backward();
            opt.step(&mut store, &grads).unwrap();
            assert_close!(store.get(&t).unwrap().as_vec(), e.to_vec(), 1e-5);
        }
    }

    #[test]
    fn test_zero_momentum_is_gradient_descent() {
        let dev: Cpu = Cpu::seed_from_u64(0);
        let mut store = ParamStore::<TestDtype>::new();
        let w = store.insert("w", dev.sample_normal([8])).unwrap();
        let mut reference = store.clone();
        let cfg = MomentumConfig {
            lr: 0.05,
            momentum: 0.0,
        };
        let opt = Momentum::new(&mut store, &w, cfg).unwrap();

        for _ in 0..5 {
            let grads = sum_squared(store.trace(&w).unwrap()).backward();
            opt.step(&mut store, &grads).unwrap();

            let grads = sum_squared(reference.trace(&w).unwrap()).backward();
            let updates = gradient_descent_update(&grads, &w, 0.05).unwrap();
            reference.apply(updates).unwrap();

            assert_eq!(store.get(&w).unwrap().as_vec(), reference.get(&w).unwrap().as_vec());
        }
    }

    #[test]
    fn test_updates_are_deterministic() {
        let dev: Cpu = Cpu::seed_from_u64(1);
        let mut store = ParamStore::<TestDtype>::new();
        let w = store.insert("w", dev.sample_normal([4])).unwrap();
        let opt = Momentum::new(&mut store, &w, Default::default()).unwrap();
        let grads = sum_squared(store.trace(&w).unwrap()).backward();
        opt.step(&mut store, &grads).unwrap();

        let grads = sum_squared(store.trace(&w).unwrap()).backward();
        let a = opt.updates(&grads).unwrap();
        let b = opt.updates(&grads).unwrap();
        assert_eq!(a.len(), 2);
        for (a, b) in a.iter().zip(b.iter()) {
            assert_eq!(a.target, b.target);
            assert_eq!(
                a.value.eval(&store).as_vec(),
                b.value.eval(&store).as_vec()
            );
        }
    }

    #[test]
    fn test_pair_order() {
        let dev: Cpu = Default::default();
        let mut store = ParamStore::<TestDtype>::new();
        let w = store.insert("w", dev.ones([3])).unwrap();
        let opt = Momentum::new(&mut store, &w, Default::default()).unwrap();
        let grads = sum_squared(store.trace(&w).unwrap()).backward();
        let updates = opt.updates(&grads).unwrap();
        let targets: Vec<&Shared> = updates.targets().collect();
        assert_eq!(targets, [opt.velocity(), &w]);
        assert_eq!(opt.weights(), &w);
    }

    #[test]
    fn test_rules_on_same_weights_share_velocity() {
        let dev: Cpu = Default::default();
        let mut store = ParamStore::<TestDtype>::new();
        let w = store.insert("w", dev.ones([2])).unwrap();
        let momentum = Momentum::new(&mut store, &w, Default::default()).unwrap();
        let nesterov = crate::optim::Nesterov::new(&mut store, &w, Default::default()).unwrap();
        assert_eq!(momentum.velocity(), nesterov.velocity());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_invalid_momentum() {
        let dev: Cpu = Default::default();
        let mut store = ParamStore::<TestDtype>::new();
        let w = store.insert("w", dev.ones([1])).unwrap();
        let cfg = MomentumConfig {
            lr: 1e-2,
            momentum: 1.0,
        };
        let err = Momentum::new(&mut store, &w, cfg).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidCoefficient {
                name: "momentum",
                ..
            }
        ));
        // nothing allocated
        assert_eq!(store.len(), 1);

        let mut opt = Momentum::new(&mut store, &w, Default::default()).unwrap();
        opt.cfg.momentum = -0.5;
        let grads = sum_squared(store.trace(&w).unwrap()).backward();
        assert!(opt.updates(&grads).is_err());
    }

    #[test]
    fn test_missing_weights() {
        let dev: Cpu = Default::default();
        let mut other = ParamStore::<TestDtype>::new();
        let w = other.insert("w", dev.ones([1])).unwrap();
        let mut store = ParamStore::<TestDtype>::new();
        let err = Momentum::new(&mut store, &w, Default::default()).unwrap_err();
        assert!(matches!(err, Error::UnknownState(_)));
        assert!(store.is_empty());
    }
}
