pub mod data;
pub mod io;
pub mod printing;
pub mod settings;

pub use data::{path_display, Config};
pub use io::ConfigError;
pub use settings::SettingError;
