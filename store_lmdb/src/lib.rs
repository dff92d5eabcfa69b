//! LMDB storage backend for kycgate.
//!
//! Implements the storage traits from `kycgate-store` using the `heed` LMDB bindings.
//! All logical stores share one environment, so a single write transaction can
//! span accounts and the fingerprint index.

pub mod account;
pub mod environment;
pub mod error;
pub mod integrity;
pub mod session;

mod codec;

pub use account::LmdbAccountStore;
pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use integrity::{check_data_dir, check_integrity, IntegrityReport};
pub use session::LmdbSessionStore;
