use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized},
};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::config::RcConfig;
use crate::error::Result;
use crate::validation::validate;

/// Name of the rc file looked up in the home and working directories.
pub const RC_FILE: &str = ".typingsrc";

pub const ENV_PREFIX: &str = "TYPINGS_";

/// Locates and layers rc files.
#[derive(Debug, Clone)]
pub struct RcLoader {
    cwd: PathBuf,
    home: Option<PathBuf>,
    env: bool,
}

impl RcLoader {
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            home: dirs::home_dir(),
            env: true,
        }
    }

    /// Use `home` instead of the user's home directory.
    pub fn with_home(mut self, home: Option<PathBuf>) -> Self {
        self.home = home;
        self
    }

    /// Whether `TYPINGS_*` variables are read.
    pub fn with_env(mut self, env: bool) -> Self {
        self.env = env;
        self
    }

    /// Rc files that would be merged, lowest priority first.
    pub fn files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        if let Some(home) = &self.home {
            files.push(home.join(RC_FILE));
        }

        let local = self.cwd.join(RC_FILE);
        if !files.contains(&local) {
            files.push(local);
        }

        files.into_iter().filter(|path| path.is_file()).collect()
    }

    pub fn figment(&self) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(RcConfig::default()));

        for path in self.files() {
            tracing::debug!(path = %path.display(), "merging rc file");
            figment = figment.merge(Json::file(path));
        }

        if self.env {
            let env = Env::prefixed(ENV_PREFIX);
            let overrides = env_overrides(env.iter().map(|(key, value)| (key.as_str().to_string(), value)));
            if !overrides.is_empty() {
                figment = figment.merge(Serialized::defaults(overrides));
            }
        }

        figment
    }

    /// Load and validate the merged configuration.
    pub fn load(&self) -> Result<RcConfig> {
        let config: RcConfig = self.figment().extract()?;
        validate(&config)?;
        Ok(config)
    }
}

/// Turn prefix-stripped variables (`max_retries=5`) into camel case settings.
///
/// Values that parse as JSON keep their type, anything else is a string.
pub fn env_overrides(vars: impl IntoIterator<Item = (String, String)>) -> Map<String, Value> {
    vars.into_iter()
        .map(|(key, value)| {
            let value = serde_json::from_str::<Value>(&value)
                .ok()
                .filter(|parsed| !parsed.is_object() && !parsed.is_array())
                .unwrap_or(Value::String(value));
            (camel_case(&key), value)
        })
        .collect()
}

fn camel_case(key: &str) -> String {
    let mut output = String::with_capacity(key.len());
    let mut upper = false;

    for ch in key.chars() {
        if ch == '_' {
            upper = !output.is_empty();
        } else if upper {
            output.push(ch.to_ascii_uppercase());
            upper = false;
        } else {
            output.push(ch.to_ascii_lowercase());
        }
    }

    output
}
