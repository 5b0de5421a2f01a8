//! Talking-avatar video synthesis via the Simli text-to-video API.

pub mod client;
pub mod service;
pub mod types;

pub use client::{AvatarApi, SimliClient, VideoFetch};
pub use service::{AvatarService, AvatarVideo};
pub use types::*;
