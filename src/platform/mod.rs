//! Platform-specific helpers.
//! Hides Unix/Windows differences behind one API so the settings store and the
//! logger stay platform-agnostic.

mod temp;
#[cfg(unix)]
mod unix;
#[cfg(not(unix))]
mod windows;

#[cfg(unix)]
pub use unix::{open_log_file_secure_append, write_settings_atomic};

#[cfg(not(unix))]
pub use windows::{open_log_file_secure_append, write_settings_atomic};
