use std::marker::PhantomData;

use stepwise_core::{
    dtypes::Dtype,
    shared::{Expr, GradientSource, Shared, Updates},
    tensor::Error,
};

use super::{checked_gradient, coefficient, GradientDescentConfig, UpdateRule};

/// The single update pair `(weights, weights - learning_rate * ∂loss/∂weights)`.
///
/// ```rust
/// # use stepwise::prelude::*;
/// # let dev: Cpu = Default::default();
/// let mut store = ParamStore::new();
/// let w = store.insert("w", dev.tensor([1.0f32, -2.0])).unwrap();
/// let grads = sum_squared(store.trace(&w).unwrap()).backward();
/// let updates = gradient_descent_update(&grads, &w, 0.25).unwrap();
/// store.apply(updates).unwrap();
/// assert_eq!(store.get(&w).unwrap().as_vec(), [0.5, -1.0]);
/// ```
pub fn gradient_descent_update<E: Dtype, G: GradientSource<E> + ?Sized>(
    loss: &G,
    weights: &Shared,
    learning_rate: f64,
) -> Result<Updates<E>, Error> {
    GradientDescentConfig { lr: learning_rate }.validate()?;
    let lr: E = coefficient("lr", learning_rate)?;
    let grad = checked_gradient(loss, weights)?;

    let mut updates = Updates::new();
    updates.push(weights, Expr::from(weights) - Expr::constant(grad) * lr);
    Ok(updates)
}

/// Plain gradient descent: `W_{t+1} = W_t - lr * grad(W_t)`.
///
/// Has no state of its own, so unlike [super::Momentum] it does not need
/// the [stepwise_core::shared::ParamStore] to be constructed.
///
/// ```rust
/// # use stepwise::prelude::*;
/// # let dev: Cpu = Default::default();
/// # let mut store = ParamStore::new();
/// let w = store.insert("w", dev.zeros::<f32>([3])).unwrap();
/// let opt: GradientDescent<f32> = GradientDescent::new(&w, GradientDescentConfig { lr: 1e-1 }).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct GradientDescent<E> {
    /// Hyperparameter configuration
    pub cfg: GradientDescentConfig,

    weights: Shared,

    marker: PhantomData<E>,
}

impl<E: Dtype> GradientDescent<E> {
    pub fn new(weights: &Shared, cfg: GradientDescentConfig) -> Result<Self, Error> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            weights: weights.clone(),
            marker: PhantomData,
        })
    }
}

impl<E: Dtype> UpdateRule<E> for GradientDescent<E> {
    fn weights(&self) -> &Shared {
        &self.weights
    }

    fn updates(&self, loss: &dyn GradientSource<E>) -> Result<Updates<E>, Error> {
        gradient_descent_update(loss, &self.weights, self.cfg.lr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{optim::Optimizer, tests::*};
    use stepwise_core::{prelude::*, shared::ParamStore};

    #[test]
    fn test_perfect_gradient_descent() {
        let dev: Cpu = Default::default();
        let mut store = ParamStore::<TestDtype>::new();
        let pred = store.insert("pred", dev.zeros([5])).unwrap();
        let opt: GradientDescent<TestDtype> = GradientDescent::new(&pred, GradientDescentConfig { lr: 2.5 }).unwrap();

        let targ: Tensor<TestDtype> = dev.ones([5]);
        let grads = mse_loss(store.trace(&pred).unwrap(), targ.clone()).backward();
        opt.step(&mut store, &grads).unwrap();
        // d/dp mean((p - 1)^2) = 2 * (p - 1) / 5 = -0.4, so one step of 2.5 lands on 1
        assert_close!(store.get(&pred).unwrap().as_vec(), targ.as_vec());
    }

    #[test]
    fn test_gradient_descent_sequence() {
        let dev: Cpu = Default::default();
        let mut store = ParamStore::<TestDtype>::new();
        let t = store.insert("t", dev.ones([5])).unwrap();
        let opt: GradientDescent<TestDtype> = GradientDescent::new(&t, Default::default()).unwrap();

        let rate: Tensor<TestDtype> = dev.tensor([0.1, 1.0, 2.0, 10.0, 100.0]);
        let expected = [
            [0.9998, 0.998, 0.996, 0.98, 0.8],
            [0.99960005, 0.99600005, 0.992, 0.96000004, 0.6],
            [0.9994001, 0.9940001, 0.988, 0.94000006, 0.40000004],
            [0.9992001, 0.9920001, 0.98399997, 0.9200001, 0.20000005],
            [0.99900013, 0.9900001, 0.97999996, 0.9000001, 5.9604645e-8],
        ];
        for e in expected.iter() {
            let grads = (store.trace(&t).unwrap() * rate.clone()).mean().backward();
            opt.step(&mut store, &grads).unwrap();
            assert_close!(store.get(&t).unwrap().as_vec(), e.to_vec(), 1e-5);
        }
    }

    #[test]
    fn test_zero_gradient_is_identity() {
        let dev: Cpu = Default::default();
        let mut store = ParamStore::<TestDtype>::new();
        let w = store.insert("w", dev.tensor([0.3, -1.7, 4.0])).unwrap();
        let zero = FnGradient(|wrt: &Shared| -> Result<Tensor<TestDtype>, Error> {
            Ok(dev.zeros(wrt.shape().clone()))
        });
        let before = store.get(&w).unwrap().as_vec();
        let updates = gradient_descent_update(&zero, &w, 0.5).unwrap();
        assert_eq!(updates.len(), 1);
        store.apply(updates).unwrap();
        assert_eq!(store.get(&w).unwrap().as_vec(), before);
    }

    #[test]
    fn test_invalid_learning_rate() {
        let dev: Cpu = Default::default();
        let mut store = ParamStore::<TestDtype>::new();
        let w = store.insert("w", dev.ones([1])).unwrap();
        let grads = sum_squared(store.trace(&w).unwrap()).backward();
        let err = gradient_descent_update(&grads, &w, -0.1).unwrap_err();
        assert!(matches!(err, Error::InvalidCoefficient { name: "lr", .. }));
        assert!(GradientDescent::<TestDtype>::new(&w, GradientDescentConfig { lr: 0.0 }).is_err());
    }

    #[test]
    fn test_config_checked_every_step() {
        let dev: Cpu = Default::default();
        let mut store = ParamStore::<TestDtype>::new();
        let w = store.insert("w", dev.ones([1])).unwrap();
        let mut opt: GradientDescent<TestDtype> = GradientDescent::new(&w, Default::default()).unwrap();
        opt.cfg.lr = f64::NAN;
        let grads = sum_squared(store.trace(&w).unwrap()).backward();
        let result = opt.updates(&grads);
        assert!(matches!(result, Err(Error::InvalidCoefficient { .. })));
    }

    #[test]
    fn test_no_gradient_path() {
        let dev: Cpu = Default::default();
        let mut store = ParamStore::<TestDtype>::new();
        let w = store.insert("w", dev.ones([2])).unwrap();
        let b = store.insert("b", dev.ones([2])).unwrap();
        let grads = sum_squared(store.trace(&b).unwrap()).backward();
        let err = gradient_descent_update(&grads, &w, 0.1).unwrap_err();
        assert!(matches!(err, Error::NoGradientPath(name) if name == "w"));
    }
    #[test]
    fn test_untraced_target_has_no_gradient_path() {
        let dev: Cpu = Default::default();
        let mut store = ParamStore::<TestDtype>::new();
        let w = store.insert("w", dev.tensor([1.0, 2.0])).unwrap();
        let b = store.insert("b", dev.tensor([0.0, 0.0])).unwrap();

        // `w` only appears as a constant target
        let target = store.get(&w).unwrap().clone();
        let grads = mse_loss(store.trace(&b).unwrap(), target).backward();
        assert!(grads.gradient(&b).is_ok());
        let err = gradient_descent_update(&grads, &w, 0.1).unwrap_err();
        assert!(matches!(err, Error::NoGradientPath(name) if name == "w"));
        assert_eq!(store.get(&w).unwrap().as_vec(), [1.0, 2.0]);
    }
}
