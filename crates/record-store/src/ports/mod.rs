//! # Ports Layer
//!
//! - `inbound.rs` - Driving port (the store API exposed to callers)
//! - `outbound.rs` - Driven ports (world state and record serializer)

pub mod inbound;
pub mod outbound;
