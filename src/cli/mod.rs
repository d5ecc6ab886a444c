//! Terminal front end over the quote store

pub mod quotes;
pub mod setup;
pub mod sync;
pub mod transfer;
pub mod ui;
pub mod watch;
