pub mod hotkeys;
pub mod organiser;
