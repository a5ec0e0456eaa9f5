mod media_controller;

pub use media_controller::{parse_status, PlayerctlMediaController};
