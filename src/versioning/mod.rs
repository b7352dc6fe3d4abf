// Version lifecycle transitions

pub mod result;
pub mod state_machine;

pub use result::{TransitionRecord, TransitionResult, VersionChange};
pub use state_machine::{TransitionError, TransitionInput, VersioningStateMachine};
