pub mod app;
pub mod events;
pub mod frame_loop;
pub mod hud;
pub mod persisted;
pub mod registry;
pub mod settings;
pub mod storage;
pub mod tabs;
