pub mod color;
pub mod ink;
pub mod surface;
pub mod theme;
