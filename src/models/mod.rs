pub mod field;
pub mod forecast;
pub mod irrigation_event;
pub mod recommendation;
pub mod soil;
pub mod time_format;

pub use field::*;
pub use forecast::*;
pub use irrigation_event::*;
pub use recommendation::*;
pub use soil::*;
