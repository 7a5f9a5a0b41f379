//! Well-known file names and separators.

/// Tool name, used in meta comments and the user agent.
pub const PROJECT_NAME: &str = "typings";

/// Tool version, used in meta comments and the user agent.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The system's own manifest.
pub const CONFIG_FILE: &str = "typings.json";

/// Separates a parent module name from a dependency alias (`root~dep`).
pub const DEPENDENCY_SEPARATOR: &str = "~";

pub const DTS_MAIN_FILE: &str = "main.d.ts";
pub const DTS_BROWSER_FILE: &str = "browser.d.ts";

pub const NPM_MANIFEST: &str = "package.json";
pub const NPM_MODULES_DIR: &str = "node_modules";

pub const BOWER_MANIFEST: &str = "bower.json";
pub const BOWER_RC_FILE: &str = ".bowerrc";
pub const BOWER_COMPONENTS_DIR: &str = "bower_components";

/// Commitish used by git hosted references when none is given.
pub const DEFAULT_COMMITISH: &str = "master";
