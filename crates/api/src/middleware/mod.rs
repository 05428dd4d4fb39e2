//! Request extractors shared by the routes.

pub mod actor;

pub use actor::{ACTOR_ID_HEADER, CAPABILITIES_HEADER, CallerActor};
