//! Typings rc configuration.
//!
//! Settings are layered from lowest to highest priority:
//!
//! 1. built-in defaults
//! 2. `$HOME/.typingsrc`
//! 3. `<cwd>/.typingsrc`
//! 4. `TYPINGS_*` environment variables
//!
//! ```no_run
//! use typings_config::RcLoader;
//!
//! let rc = RcLoader::new(".").load().unwrap();
//! let retry = rc.retry_policy();
//! ```

pub mod config;
pub mod conversions;
pub mod error;
pub mod loading;
pub mod validation;

pub use config::*;
pub use error::*;
pub use loading::{ENV_PREFIX, RC_FILE, RcLoader, env_overrides};
pub use validation::validate;
