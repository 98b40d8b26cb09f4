//! Dispatch events and their subscribers

mod dispatcher;
mod event_types;

pub use dispatcher::{event_name_from_label, EventDispatcher, EventHandler};
pub use event_types::GatewayEventType;
