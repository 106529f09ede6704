pub extern crate serde;
pub extern crate serde_json;

mod action_log;
mod message;

pub use action_log::*;
pub use message::*;
