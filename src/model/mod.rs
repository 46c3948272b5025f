pub mod color;
pub mod math;
pub mod value;

// Re-export commonly used types at the model level.
pub use color::Color;
pub use math::{Quat, Vec2, Vec3};
pub use value::{ObjectRef, ParamKind, ParamValue};
