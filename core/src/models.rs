pub mod file;
pub mod result;
pub mod verification;

pub use file::*;
pub use result::*;
pub use verification::*;

/// Instants recorded in result files and compared against dependency timestamps.
pub type Timestamp = chrono::DateTime<chrono::FixedOffset>;
