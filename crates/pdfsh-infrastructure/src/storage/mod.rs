//! File-backed stores for history, configuration and secrets.

mod atomic;
mod config_storage;
mod history_store;
mod secret_storage;

pub use atomic::write_atomic;
pub use config_storage::{ConfigStorage, ConfigStorageError};
pub use history_store::FileHistoryStore;
pub use secret_storage::{
    ANTHROPIC_API_KEY_ENV, GOOGLE_ACCESS_TOKEN_ENV, SecretStorage, SecretStorageError,
    with_env_fallback,
};
