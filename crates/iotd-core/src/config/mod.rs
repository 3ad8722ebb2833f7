//! # iotd Core Configuration
//!
//! Settings for the data server and its getters, decoded with `serde` from
//! JSON, YAML (`yaml-config` feature) or TOML (`toml-config` feature). The
//! format is picked from the file extension.
//!
//! - [`ServerSettings`]: service port, stale-node sweep interval and the list
//!   of configured getters.
//! - [`GetterSetting`]: one getter entry (id, catalog type name, optional
//!   config file, test mode, required flag, free-form settings).
//! - [`SimpleSettings`]: the typed-lookup key/value map getters read from.
pub mod error;
pub mod format;
pub mod settings;

pub use error::ConfigError;
pub use format::{ConfigFormat, load_file};
pub use settings::{DEFAULT_SERVICE_PORT, GetterSetting, ServerSettings, SimpleSettings};
