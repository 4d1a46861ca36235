pub mod coordinator;
pub mod directory;
pub mod notify;

pub use coordinator::*;
pub use directory::*;
pub use notify::*;
