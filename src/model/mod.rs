pub mod app_map;
