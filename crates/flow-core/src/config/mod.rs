mod dirs;
mod settings;
mod validation;

pub use dirs::Directories;
pub use settings::Config;
pub use validation::{drop_invalid_values, warn_unknown_keys};
