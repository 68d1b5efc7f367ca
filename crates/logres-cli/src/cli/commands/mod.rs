//! CLI command handlers. Each command is in its own file for clarity.

mod checksum;
mod install;
mod list;
mod pending;
mod status;

pub use checksum::run_checksum;
pub use install::run_install;
pub use list::run_list;
pub use status::run_status;
