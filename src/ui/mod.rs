pub mod camera;
pub mod panels;
pub mod plot;
