/// Application name
pub const APP_NAME: &str = "Keystone";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Sub-key used when a component is registered without a custom one
pub const DEFAULT_COMPONENT_KEY: &str = "default";

/// Default settings directory, relative to the working directory
pub const DEFAULT_SETTINGS_DIR: &str = "settings";

/// Section of a config store that selects its active section
pub const ACTIVE_SECTION: &str = "active";

/// Key inside the active section naming the selected section
pub const ACTIVE_SECTION_SELECTOR: &str = "selected";

/// Separator between the segments of a hierarchical package name
pub const PACKAGE_NAME_SEPARATOR: char = '.';
