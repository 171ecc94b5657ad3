//! These models represent the objects exchanged with the host application
//!
//! The host speaks in generic chat messages (a role plus either plain text or a list of
//! typed content blocks). The provider immediately converts those into the Dust wire
//! format on the way out, and converts the streamed reply back into generic events on
//! the way in. The models here are the host side of that boundary.
pub mod content;
pub mod message;
pub mod role;
pub mod tool;
