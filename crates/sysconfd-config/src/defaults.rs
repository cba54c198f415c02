//! Default values shared by the daemon configuration.

use std::env;
use std::path::Path;

use camino::Utf8PathBuf;

/// Default Unix socket path used when none is configured.
pub const DEFAULT_SOCKET_PATH: &str = "/var/run/system-confd/system-confd.sock";

/// Default log filter expression used by the daemon.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// System-wide plugin directory used as the final executable fallback.
pub const DEFAULT_PLUGIN_DIR: &str = "/usr/lib/system-confd/plugins";

/// System-wide configuration directory.
const SYSTEM_CONFIG_DIR: &str = "/etc/system-confd";

/// Name of the registry file looked up inside the configuration directory.
const REGISTRY_FILE_NAME: &str = "plugins.json";

/// Default socket path.
pub(crate) fn default_socket_path() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_SOCKET_PATH)
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub(crate) fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default plugin directory.
pub(crate) fn default_plugin_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_PLUGIN_DIR)
}

/// Default registry file path inside the configuration directory.
pub(crate) fn default_registry_file() -> Utf8PathBuf {
    config_directory().join(REGISTRY_FILE_NAME)
}

/// Resolves the configuration directory.
///
/// Prefers the system-wide `/etc/system-confd` when it exists, otherwise a
/// `config/` directory beside the running executable so a source-tree
/// checkout works without installation.
#[must_use]
pub fn config_directory() -> Utf8PathBuf {
    if Path::new(SYSTEM_CONFIG_DIR).is_dir() {
        return Utf8PathBuf::from(SYSTEM_CONFIG_DIR);
    }
    executable_adjacent_config().unwrap_or_else(|| Utf8PathBuf::from(SYSTEM_CONFIG_DIR))
}

fn executable_adjacent_config() -> Option<Utf8PathBuf> {
    let exe = env::current_exe().ok()?;
    let dir = exe.parent()?;
    let utf8 = Utf8PathBuf::from_path_buf(dir.to_path_buf()).ok()?;
    Some(utf8.join("config"))
}
