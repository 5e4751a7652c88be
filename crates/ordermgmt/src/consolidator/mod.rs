mod batching;
mod status;
#[cfg(test)]
mod tests;

pub use batching::*;
pub use status::*;
