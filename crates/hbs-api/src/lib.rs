//! Protocol types for the Handlebars render service
//!
//! This crate defines the stable wire model between clients and the
//! rendering service:
//! - Render requests (template, context, optional layout)
//! - Render responses (success/failure, tagged by status)
//!
//! Template syntax, context schema, and layout semantics are opaque here;
//! they are interpreted only by the remote peer.

mod request;
mod response;

pub use request::*;
pub use response::*;

/// Event name carried in socket-framed request messages
pub const RENDER_EVENT: &str = "render";
