pub mod render;
pub mod wayland;
