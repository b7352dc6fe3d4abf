// Publishing workflow orchestration
//
// The manager is the single entry point for transition requests. It owns no
// entity state; every request works on a fresh snapshot from the persistence
// collaborator and hands back a result the collaborator applies atomically.

pub mod errors;
pub mod manager;
pub mod retry;
pub mod traits;

pub use errors::{PersistenceError, PublishingError};
pub use manager::{PublishingManager, TransitionRequest};
pub use retry::{ConflictRetryHandler, RetryConfig};
pub use traits::{AuthorizationPolicy, PersistenceGateway};

#[cfg(any(test, feature = "testing"))]
pub use traits::{MockAuthorizationPolicy, MockPersistenceGateway};
