mod clear;
mod common;
mod dismiss;
mod history;
mod pause;
mod resume;
mod settings;
mod start;
mod stats;
mod status;
mod stop;

pub use clear::execute as clear;
pub use dismiss::execute as dismiss;
pub use history::execute as history;
pub use pause::execute as pause;
pub use resume::execute as resume;
pub use settings::{execute as settings, SettingsArgs};
pub use start::execute as start;
pub use stats::execute as stats;
pub use status::execute as status;
pub use stop::execute as stop;
