pub mod case;
pub mod result;
pub mod status;

pub use case::TestCase;
pub use result::{RunReport, RunResult};
pub use status::Outcome;
