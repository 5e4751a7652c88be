mod interface;
mod sample;
mod search;
mod shared;

pub use interface::*;
pub use sample::*;
pub use search::*;
pub use shared::*;
