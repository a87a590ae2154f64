mod dataset;
mod dataset_storage;
mod loader;
mod profile;

use std::sync::Arc;

pub use dataset::Dataset;
pub use dataset_storage::{DatasetKey, DatasetStorage};
pub use loader::{load_view, read_view};
pub use profile::{profile_file, profile_reader, DatasetProfile, Encoding};

pub trait Storage: Send + Sync + 'static {
    fn load(&self, key: &DatasetKey) -> Option<Arc<Dataset>>;
    fn save(&self, key: DatasetKey, dataset: Arc<Dataset>);
}
