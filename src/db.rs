pub mod db;
pub mod chatdb;
pub mod interactiondb;
pub mod jobdb;
pub mod notificationdb;
pub mod reviewdb;
pub mod userdb;

#[cfg(test)]
pub mod memory;

use std::fmt::Debug;

use chatdb::ChatExt;
use interactiondb::InteractionExt;
use jobdb::JobExt;
use notificationdb::NotificationExt;
use reviewdb::ReviewExt;
use userdb::UserExt;

/// Everything the services need from persistence. `DBClient` is the
/// Postgres implementation; tests swap in an in-memory one.
pub trait MarketStore:
    JobExt + InteractionExt + ChatExt + ReviewExt + UserExt + NotificationExt + Debug + Send + Sync
{
}

impl<T> MarketStore for T where
    T: JobExt
        + InteractionExt
        + ChatExt
        + ReviewExt
        + UserExt
        + NotificationExt
        + Debug
        + Send
        + Sync
{
}
