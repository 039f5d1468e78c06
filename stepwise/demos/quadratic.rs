//! Fits the same regression targets with each of the update rules.
//!
//! Run with `RUST_LOG=debug` to see the optimizer state being allocated,
//! or `RUST_LOG=trace` to see every committed batch.

use stepwise::prelude::*;

fn main() -> Result<(), Error> {
    env_logger::init();

    let dev: Cpu = Cpu::seed_from_u64(0);
    let init: Tensor<f32> = dev.sample_normal([8]);
    let targ: Tensor<f32> = dev.sample_uniform([8], -1.0, 1.0);

    let cfg = MomentumConfig {
        lr: 0.5,
        momentum: 0.9,
    };

    for name in ["gradient descent", "momentum", "nesterov"] {
        // each rule gets a fresh store so they all start from `init`
        let mut store = ParamStore::new();
        let w = store.insert("w", init.clone())?;
        let rule: Box<dyn UpdateRule<f32>> = match name {
            "gradient descent" => Box::new(GradientDescent::<f32>::new(&w, GradientDescentConfig { lr: cfg.lr })?),
            "momentum" => Box::new(Momentum::new(&mut store, &w, cfg)?),
            _ => Box::new(Nesterov::new(&mut store, &w, cfg)?),
        };

        for i in 0..30 {
            let loss = mse_loss(store.trace(&w)?, targ.clone());
            if i % 5 == 0 {
                println!("{name:>16} step {i:>2}: loss={:.6}", loss.item().unwrap_or(f32::NAN));
            }
            let grads = loss.try_backward()?;
            rule.step(&mut store, &grads)?;
        }

        let loss = mse_loss(store.trace(&w)?, targ.clone());
        println!("{name:>16} final  : loss={:.6}", loss.item().unwrap_or(f32::NAN));
    }

    Ok(())
}
