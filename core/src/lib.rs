pub mod registry;
pub mod scheme;
pub mod snapshot;
pub mod types;

pub use registry::error::RegistryError;
pub use registry::{Instance, NodeId, Registry};
pub use scheme::{Scheme, SchemeError};
pub use snapshot::{Snapshot, SnapshotError};
pub use types::{DeclareOptions, SettingKey, Value};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("scheme error: {0}")]
    Scheme(#[from] SchemeError),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}
