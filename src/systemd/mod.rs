//! systemd integration
//!
//! - Unit name escaping for per-resource targets and services
//! - The daemon control facade (reload, restart, stop, status)
//! - Autoload detection (path unit reloading on snippet change)

mod control;
mod errors;
mod escape;

pub use control::{
    CommandOutput, DaemonControl, ServiceManager, Systemctl, REACTOR_RELOAD_PATH, REACTOR_SERVICE,
};
pub use errors::{SystemdError, SystemdResult};
pub use escape::{escape_name, ocf_service, promote_service, services_target};
