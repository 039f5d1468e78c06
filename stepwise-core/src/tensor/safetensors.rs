use std::collections::BTreeMap;
use std::{path::Path, string::String, vec::Vec};

use safetensors::tensor::{Dtype as SDtype, SafeTensors, TensorView};

use super::{Error, Tensor};
use crate::{
    dtypes::{Dtype, SafeTensorsDtype},
    shapes::Shape,
};

struct TensorData {
    dtype: SDtype,
    shape: Vec<usize>,
    data: Vec<u8>,
}

/// Collects named tensors and serializes them into a single `.safetensors` file.
#[derive(Default)]
pub struct Writer {
    tensors: BTreeMap<String, TensorData>,
}

impl Writer {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add<E: Dtype, T>(&mut self, key: String, tensor: &Tensor<E, T>) {
        let data: Vec<u8> = tensor
            .as_slice()
            .iter()
            .flat_map(|e| SafeTensorsDtype::to_le_bytes(*e))
            .collect();
        let tdata = TensorData {
            dtype: E::DTYPE,
            shape: tensor.shape().dims().to_vec(),
            data,
        };
        self.tensors.insert(key, tdata);
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let views = self
            .tensors
            .iter()
            .map(|(k, t)| Ok((k.clone(), TensorView::new(t.dtype, t.shape.clone(), &t.data)?)))
            .collect::<Result<Vec<_>, Error>>()?;
        safetensors::serialize_to_file(views.iter().map(|(k, v)| (k, v)), &None, path)?;
        Ok(())
    }
}

impl<E: Dtype, T> Tensor<E, T> {
    /// Loads data from the [SafeTensors] storage with the given `key`.
    ///
    /// Returns `Ok(false)` if `key` isn't present. The stored tensor must have
    /// the same dtype and shape as `self`.
    pub fn load_safetensor(&mut self, tensors: &SafeTensors, key: &str) -> Result<bool, Error> {
        let view = match tensors.tensor(key) {
            Ok(ok) => ok,
            Err(safetensors::SafeTensorError::TensorNotFound(_)) => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        if view.dtype() != E::DTYPE {
            return Err(Error::DtypeMismatch {
                name: key.into(),
                expected: E::DTYPE,
                found: view.dtype(),
            });
        }
        let shape = Shape::from(view.shape());
        if &shape != self.shape() {
            return Err(Error::ShapeMismatch {
                expected: self.shape().clone(),
                found: shape,
            });
        }
        let c: Vec<E> = view
            .data()
            .chunks_exact(std::mem::size_of::<E>())
            .map(<E as SafeTensorsDtype>::from_le_bytes)
            .collect();
        self.copy_from(&c);
        Ok(true)
    }
}
