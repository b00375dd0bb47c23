mod benchmark;
mod counters;
mod path;
mod runner;
mod stats;
mod template;
mod utils;

pub use benchmark::*;
pub use counters::*;
pub use path::*;
pub use runner::*;
pub use stats::*;
pub use template::*;
pub use utils::*;
