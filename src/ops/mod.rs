pub mod move_ops;

pub use move_ops::*;
