use std::path::Path;
use std::vec::Vec;

use safetensors::SafeTensors;

use super::ParamStore;
use crate::{
    dtypes::Dtype,
    tensor::{Error, Tensor, UniqueId, Writer},
};

impl<E: Dtype> ParamStore<E> {
    /// Writes every stored tensor, keyed by name, to a `.safetensors` file.
    pub fn save_safetensors<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let mut w = Writer::new();
        for entry in self.entries.values() {
            w.add(entry.name.clone(), &entry.value);
        }
        w.save(path.as_ref())
    }

    /// Overwrites the value of every stored tensor whose name is present
    /// in the `.safetensors` file at `path`. Names missing from the file
    /// are left untouched, and entries of the file that are not in the
    /// store are ignored.
    ///
    /// Stored dtypes and shapes must match. On error nothing is changed.
    pub fn load_safetensors<P: AsRef<Path>>(&mut self, path: P) -> Result<(), Error> {
        let f = std::fs::File::open(path)?;
        let buffer = unsafe { memmap2::MmapOptions::new().map(&f)? };
        let tensors = SafeTensors::deserialize(&buffer)?;

        let mut staged: Vec<(UniqueId, Tensor<E>)> = Vec::with_capacity(self.entries.len());
        for (id, entry) in self.entries.iter() {
            let mut value = entry.value.clone();
            if value.load_safetensor(&tensors, &entry.name)? {
                staged.push((*id, value));
            } else {
                log::warn!("`{}` not found in checkpoint, keeping current value", entry.name);
            }
        }

        for (id, value) in staged {
            if let Some(entry) = self.entries.get_mut(&id) {
                entry.value = value;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{shared::Updates, tensor::*, tests::*};
    use tempfile::NamedTempFile;

    #[test]
    fn test_save_load_store() {
        let dev: Cpu = Cpu::seed_from_u64(3);
        let file = NamedTempFile::new().expect("failed to create tempfile");

        let mut store = ParamStore::<TestDtype>::new();
        let w = store.insert("w", dev.sample_normal([2, 3])).unwrap();
        let v = store.zeros_like("velocity_w", &w).unwrap();
        let mut updates: Updates<TestDtype> = Updates::new();
        updates.push(&v, dev.ones([2, 3]));
        store.apply(updates).unwrap();
        store.save_safetensors(file.path()).expect("");

        let mut loaded = ParamStore::<TestDtype>::new();
        let w2 = loaded.insert("w", dev.zeros([2, 3])).unwrap();
        let v2 = loaded.insert("velocity_w", dev.zeros([2, 3])).unwrap();
        loaded.load_safetensors(file.path()).expect("");

        assert_eq!(loaded.get(&w2).unwrap().as_vec(), store.get(&w).unwrap().as_vec());
        assert_eq!(loaded.get(&v2).unwrap().as_vec(), [1.0; 6]);
        assert_eq!(loaded.get(&w2).unwrap().id(), w2.id());
    }

    #[test]
    fn test_load_missing_names_untouched() {
        let dev: Cpu = Default::default();
        let file = NamedTempFile::new().expect("failed to create tempfile");

        let mut saved = ParamStore::<TestDtype>::new();
        saved.insert("w", dev.tensor([1.0, 2.0])).unwrap();
        saved.save_safetensors(file.path()).expect("");

        let mut store = ParamStore::<TestDtype>::new();
        let w = store.insert("w", dev.zeros([2])).unwrap();
        let b = store.insert("b", dev.tensor([7.0])).unwrap();
        store.load_safetensors(file.path()).expect("");
        assert_eq!(store.get(&w).unwrap().as_vec(), [1.0, 2.0]);
        assert_eq!(store.get(&b).unwrap().as_vec(), [7.0]);
    }

    #[test]
    fn test_load_wrong_shape_changes_nothing() {
        let dev: Cpu = Default::default();
        let file = NamedTempFile::new().expect("failed to create tempfile");

        let mut saved = ParamStore::<TestDtype>::new();
        saved.insert("a", dev.tensor([1.0, 2.0])).unwrap();
        saved.insert("b", dev.tensor([1.0, 2.0])).unwrap();
        saved.save_safetensors(file.path()).expect("");

        let mut store = ParamStore::<TestDtype>::new();
        let a = store.insert("a", dev.zeros([2])).unwrap();
        store.insert("b", dev.zeros([3])).unwrap();
        let err = store.load_safetensors(file.path()).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
        assert_eq!(store.get(&a).unwrap().as_vec(), [0.0; 2]);
    }
}
