//! Session orchestration module.

mod report;
mod session;

pub use report::SessionReport;
pub use session::{apply_replay_overrides, Session, SessionConfig};
