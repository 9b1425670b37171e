// Application layer - use cases and orchestration.
// The service owns the ledgers; the dispatcher turns chat events into
// service calls and rendered replies.

mod dispatcher;
pub mod error;
mod render;
mod reporting;
mod service;

pub use dispatcher::*;
pub use error::*;
pub use render::*;
pub use reporting::*;
pub use service::*;
