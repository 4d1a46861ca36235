pub mod board;
pub mod collection;
pub mod ids;

pub use board::*;
pub use collection::*;
pub use ids::*;
