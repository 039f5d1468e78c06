//! Standard loss functions such as [mse_loss] and [sum_squared].

use crate::{
    dtypes::Dtype,
    tensor::{Error, Merge, Tape, Tensor},
    tensor_ops::TrySub,
};

/// `x.square().sum()`, the quadratic bowl centered at the origin.
///
/// ```rust
/// # use stepwise_core::prelude::*;
/// # let dev: Cpu = Default::default();
/// let x: Tensor<f32> = dev.tensor([1.0, -2.0]);
/// assert_eq!(sum_squared(x).item(), Some(5.0));
/// ```
pub fn sum_squared<E: Dtype, T: Tape<E>>(x: Tensor<E, T>) -> Tensor<E, T> {
    try_sum_squared(x).unwrap()
}

/// See [sum_squared]
pub fn try_sum_squared<E: Dtype, T: Tape<E>>(x: Tensor<E, T>) -> Result<Tensor<E, T>, Error> {
    x.try_square()?.try_sum()
}

/// [Mean Squared Error](https://en.wikipedia.org/wiki/Mean_squared_error).
/// This computes `(pred - targ).square().mean()`.
///
/// ```rust
/// # use stepwise_core::prelude::*;
/// # let dev: Cpu = Default::default();
/// let pred: Tensor<f32> = dev.tensor([1.0, 2.0, 3.0]);
/// let targ: Tensor<f32> = dev.tensor([1.0, 2.0, 5.0]);
/// let loss = mse_loss(pred.leaky_trace(), targ);
/// assert_eq!(loss.item(), Some(4.0 / 3.0));
/// ```
pub fn mse_loss<E: Dtype, T: Tape<E> + Merge<R>, R: Tape<E>>(
    pred: Tensor<E, T>,
    targ: Tensor<E, R>,
) -> Tensor<E, T> {
    try_mse_loss(pred, targ).unwrap()
}

/// See [mse_loss]
pub fn try_mse_loss<E: Dtype, T: Tape<E> + Merge<R>, R: Tape<E>>(
    pred: Tensor<E, T>,
    targ: Tensor<E, R>,
) -> Result<Tensor<E, T>, Error> {
    pred.try_sub(targ)?.try_square()?.try_mean()
}
