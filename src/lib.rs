pub mod check;
pub mod layout;
pub mod parser;
pub mod query;
pub mod step;
#[cfg(any(test, feature = "test-support"))]
pub mod test_helpers;

pub use check::{CheckResult, OrphanRef, check_all, check_cycles, check_orphans};
pub use layout::{Layout, LayoutColumn, LayoutEntry, layout_steps};
pub use parser::{ParseError, load_steps, save_steps};
pub use query::{available_steps, blocking_steps};
pub use step::{Step, StepGraph, StepId};
