//! Session ticket cache for cachet
//!
//! Keeps recently validated session tickets and the account they belong to
//! in memory, so repeated requests carrying the same ticket skip the
//! account lookup. Tickets are swept out on a timer once they are past
//! their expiry plus a grace window and clock skew allowance.

pub mod account;
pub mod cache;
pub mod config;
pub mod errors;
pub mod ticket;

pub use account::{Account, SecurityLevel};
pub use cache::SessionTicketCache;
pub use config::TicketCacheConfig;
pub use errors::{Result, SessionError};
pub use ticket::{SessionTicket, TicketAccountEntry};
