pub mod gateway;
pub mod memory;
pub mod records;

pub use gateway::*;
pub use memory::*;
pub use records::*;
