//! Dealership inventory toolkit: vehicle search and filtering, the image
//! lightbox state machine, an inventory service client with session
//! handling, and an in-memory reference inventory service.

pub mod api;
pub mod collection;
pub mod config;
pub mod gallery;
pub mod inventory;
pub mod server;
pub mod session;
