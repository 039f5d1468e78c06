use std::sync::{Arc, Mutex};
use std::vec::Vec;

use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal, Uniform};

use crate::{dtypes::Dtype, shapes::Shape};

use super::{unique_id, Error, NoneTape, Tensor};

/// A device that allocates tensors on the heap and runs every operation
/// on the calling thread.
///
/// Cloning a [Cpu] is cheap, and all clones share the same random number
/// generator.
#[derive(Clone, Debug)]
pub struct Cpu {
    pub(crate) rng: Arc<Mutex<StdRng>>,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::seed_from_u64(0)
    }
}

impl Cpu {
    /// Constructs with the random number generator seeded with `seed`.
    pub fn seed_from_u64(seed: u64) -> Self {
        Self {
            rng: Arc::new(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }

    pub(crate) fn wrap<E>(&self, data: Vec<E>, shape: Shape) -> Tensor<E, NoneTape> {
        Tensor {
            id: unique_id(),
            data: Arc::new(data),
            shape,
            device: self.clone(),
            tape: NoneTape,
        }
    }

    /// Creates a tensor from a row-major buffer. Errors if the buffer
    /// length disagrees with the shape.
    pub fn try_tensor_from_vec<E: Dtype>(
        &self,
        data: Vec<E>,
        shape: impl Into<Shape>,
    ) -> Result<Tensor<E>, Error> {
        let shape = shape.into();
        if data.len() != shape.num_elements() {
            return Err(Error::WrongNumElements {
                expected: shape.num_elements(),
                found: data.len(),
            });
        }
        Ok(self.wrap(data, shape))
    }

    /// See [Cpu::try_tensor_from_vec].
    pub fn tensor_from_vec<E: Dtype>(&self, data: Vec<E>, shape: impl Into<Shape>) -> Tensor<E> {
        self.try_tensor_from_vec(data, shape).unwrap()
    }

    /// Creates a 1d tensor from an array.
    pub fn tensor<E: Dtype, const N: usize>(&self, data: [E; N]) -> Tensor<E> {
        self.wrap(data.to_vec(), [N].into())
    }

    /// Creates a rank 0 tensor.
    pub fn scalar<E: Dtype>(&self, value: E) -> Tensor<E> {
        self.wrap(vec![value], Shape::scalar())
    }

    pub fn zeros<E: Dtype>(&self, shape: impl Into<Shape>) -> Tensor<E> {
        let shape = shape.into();
        self.wrap(vec![E::ZERO; shape.num_elements()], shape)
    }

    pub fn ones<E: Dtype>(&self, shape: impl Into<Shape>) -> Tensor<E> {
        let shape = shape.into();
        self.wrap(vec![E::ONE; shape.num_elements()], shape)
    }

    /// Creates a tensor of zeros with the same shape as `t`.
    pub fn zeros_like<E: Dtype, T>(&self, t: &Tensor<E, T>) -> Tensor<E> {
        self.zeros(t.shape.clone())
    }

    /// Samples every element from `distr`.
    pub fn sample<E: Dtype, D: Distribution<E>>(
        &self,
        shape: impl Into<Shape>,
        distr: D,
    ) -> Tensor<E> {
        let shape = shape.into();
        let data: Vec<E> = {
            let mut rng = self.rng.lock().unwrap();
            (0..shape.num_elements())
                .map(|_| rng.sample(&distr))
                .collect()
        };
        self.wrap(data, shape)
    }

    /// Samples from the standard normal distribution.
    pub fn sample_normal<E: Dtype>(&self, shape: impl Into<Shape>) -> Tensor<E>
    where
        StandardNormal: Distribution<E>,
    {
        self.sample(shape, StandardNormal)
    }

    /// Samples uniformly from `[low, high)`.
    pub fn sample_uniform<E: Dtype + rand_distr::uniform::SampleUniform>(
        &self,
        shape: impl Into<Shape>,
        low: E,
        high: E,
    ) -> Tensor<E> {
        self.sample(shape, Uniform::new(low, high))
    }
}
