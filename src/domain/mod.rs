mod amount;
mod command;
mod entry;
mod ledger;
mod money;
mod vocabulary;

pub use amount::*;
pub use command::*;
pub use entry::*;
pub use ledger::*;
pub use money::*;
pub use vocabulary::*;
