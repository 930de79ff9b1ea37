//! Client side of the xine-server-x HTTP API: request building, transport
//! and reply decoding.

pub mod command;
pub mod dispatcher;
pub mod reply;
pub mod transport;

pub use command::{Command, MatchQuery};
pub use dispatcher::{Completion, Dispatcher, Reply};
pub use transport::{HttpTransport, Transport};
