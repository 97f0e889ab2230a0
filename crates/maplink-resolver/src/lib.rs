//! Map Link Resolver
//!
//! Expands shared map links (short links, pin views, list links) by following
//! their redirect chain with a browser-like client, then extracts coordinates
//! and a place title from the URL the chain ends on.
//!
//! Every call carries the client timeout and a caller-supplied cancellation
//! token. Failures are reported as data through [`ResolveOutcome`].

mod client;
mod error;
mod types;

pub use client::MapLinkResolver;
pub use error::{ResolveError, Result};
pub use maplink_parser::{CoordinateSource, Coordinates, ResolvedLocation};
pub use tokio_util::sync::CancellationToken;
pub use types::{Resolution, ResolveOutcome, ResolverConfig};
