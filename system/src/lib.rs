mod client_sync_agent;
pub mod codec;
mod local_history;
pub mod materialize;
mod message;
mod presence_registry;
mod room;
pub mod shape;
mod shape_log;
mod traits;

pub use client_sync_agent::*;
pub use codec::*;
pub use local_history::*;
pub use materialize::*;
pub use message::*;
pub use presence_registry::*;
pub use room::*;
pub use shape::*;
pub use shape_log::*;
pub use traits::*;

pub extern crate bincode;
pub extern crate euclid;
pub extern crate serde;
pub extern crate serde_json;
