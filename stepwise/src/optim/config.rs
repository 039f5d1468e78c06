use stepwise_core::tensor::Error;

/// Configuration of hyperparameters for [super::GradientDescent].
///
/// ```rust
/// # use stepwise::prelude::*;
/// let cfg = GradientDescentConfig { lr: 1e-1 };
/// assert!(cfg.validate().is_ok());
/// assert!(GradientDescentConfig { lr: 0.0 }.validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientDescentConfig {
    /// Learning rate. Must be finite and positive. Defaults to `1e-2`
    pub lr: f64,
}

impl Default for GradientDescentConfig {
    fn default() -> Self {
        Self { lr: 1e-2 }
    }
}

impl GradientDescentConfig {
    pub fn validate(&self) -> Result<(), Error> {
        validate_lr(self.lr)
    }
}

/// Configuration of hyperparameters for [super::Momentum] and [super::Nesterov].
///
/// ```rust
/// # use stepwise::prelude::*;
/// let cfg = MomentumConfig {
///     lr: 1e-2,
///     momentum: 0.5,
/// };
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MomentumConfig {
    /// Learning rate. Must be finite and positive. Defaults to `1e-2`
    pub lr: f64,

    /// Momentum, in `[0, 1)`. Defaults to `0.9`
    pub momentum: f64,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            lr: 1e-2,
            momentum: 0.9,
        }
    }
}

impl MomentumConfig {
    pub fn validate(&self) -> Result<(), Error> {
        validate_lr(self.lr)?;
        if !(0.0..1.0).contains(&self.momentum) {
            return Err(Error::InvalidCoefficient {
                name: "momentum",
                value: self.momentum,
            });
        }
        Ok(())
    }
}

fn validate_lr(lr: f64) -> Result<(), Error> {
    if lr.is_finite() && lr > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidCoefficient {
            name: "lr",
            value: lr,
        })
    }
}
