//! Common constants used throughout templeton.

/// Delimiters used when a descriptor does not declare its own pair.
pub const DEFAULT_DELIMITERS: (&str, &str) = ("{{", "}}");

/// Directory under `$HOME` that holds named project configurations.
pub const PROJECTS_DIR: &str = ".templeton";

/// Extension of configuration files; also stripped to locate the asset directory.
pub const CONFIG_EXTENSION: &str = ".yaml";

/// Mode of directories created under the output root.
pub const OUTPUT_DIR_MODE: u32 = 0o770;

/// Mode of directories created while replicating assets.
pub const ASSET_DIR_MODE: u32 = 0o755;

/// Date layouts accepted for user input, as reference layouts.
pub const DATE_LAYOUTS: [&str; 3] = ["2006-01-02", "01/02/2006", "02/01/2006"];
