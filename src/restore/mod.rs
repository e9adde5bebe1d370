pub mod manager;

pub use manager::{RestoreManager, RestorePreview, RestoreResult};
