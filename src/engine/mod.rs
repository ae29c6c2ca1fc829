pub mod error;
pub mod identity;
pub mod session;

pub use error::{EngineError, EngineResult};
pub use identity::EngineIdentity;
pub use session::{CommandReport, Session, SessionComponents};
