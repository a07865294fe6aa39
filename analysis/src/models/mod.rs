pub mod calendar;
pub mod news;
pub mod price;
pub mod sentiment;

pub use calendar::*;
pub use news::*;
pub use price::*;
pub use sentiment::*;
