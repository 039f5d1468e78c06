//! Trains for a few steps, saves the weights and velocities, then resumes
//! from the file in a brand new store.

use stepwise::prelude::*;

const CFG: MomentumConfig = MomentumConfig {
    lr: 0.1,
    momentum: 0.9,
};

fn train(opt: &Nesterov<f32>, store: &mut ParamStore<f32>, steps: usize) -> Result<f32, Error> {
    let mut last = f32::NAN;
    for _ in 0..steps {
        let loss = sum_squared(store.trace(opt.weights())?);
        last = loss.item().unwrap_or(f32::NAN);
        let grads = loss.try_backward()?;
        opt.step(store, &grads)?;
    }
    Ok(last)
}

fn main() -> Result<(), Error> {
    env_logger::init();

    let path = std::env::temp_dir().join("stepwise-checkpoint.safetensors");
    let dev: Cpu = Cpu::seed_from_u64(0);

    let mut store = ParamStore::new();
    let w = store.insert("w", dev.sample_normal::<f32>([4, 3]))?;
    let opt = Nesterov::new(&mut store, &w, CFG)?;
    let loss = train(&opt, &mut store, 10)?;
    println!("loss before saving: {loss:.6}");
    store.save_safetensors(&path)?;
    println!("saved {:?} to {}", store.names().collect::<Vec<_>>(), path.display());

    // the resumed store only needs the right names and shapes, the values
    // come from the file
    let mut resumed = ParamStore::new();
    let w = resumed.insert("w", dev.zeros::<f32>([4, 3]))?;
    resumed.zeros_like("velocity_w", &w)?;
    resumed.zeros_like("velocity_prev_w", &w)?;
    resumed.load_safetensors(&path)?;

    let opt = Nesterov::new(&mut resumed, &w, CFG)?;
    let loss = train(&opt, &mut resumed, 10)?;
    println!("loss after resuming: {loss:.6}");

    std::fs::remove_file(&path)?;
    Ok(())
}
