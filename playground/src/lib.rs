pub mod core;
#[path = "runtime/experience.rs"]
pub mod experience;
pub mod input;
pub mod io;
pub mod prelude;
pub mod random;
#[path = "runtime/registration_macros.rs"]
mod registration_macros;
pub mod render;
pub mod runtime;

pub use core::logging::init_logger;
pub use runtime::app::{RunOptions, run};
