pub mod date;
pub mod logger;
pub mod roll_forward;

pub use date::*;
pub use logger::*;
pub use roll_forward::*;
