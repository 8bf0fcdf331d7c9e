pub mod hit;
pub mod shape;

pub use hit::{HANDLE_SIZE, Handle, hit_test_areas, hit_test_elements, hit_test_handles};
pub use shape::{ShapeLayer, ShapeVisual, resolve};
