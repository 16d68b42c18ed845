//! Emberforge Integration - generation service client and cache
//!
//! Provides the HTTP client for the generative stats service, response
//! validation and repair, the deterministic offline fallback, the keyed
//! generation cache with its reserve/complete protocol, and the item factory
//! that ties them together.

pub mod cache;
pub mod client;
pub mod convert;
pub mod error;
pub mod factory;
pub mod fallback;
pub mod types;

pub use cache::{GenerationCache, Reservation, ReservationGuard, WaitHandle};
pub use client::{GenerativeClient, ItemGenerator};
pub use error::ClientError;
pub use factory::ItemFactory;
pub use fallback::FallbackGenerator;
pub use types::{GenerationRequest, GenerationResponse, ResponseEffect, ResponseStats};
