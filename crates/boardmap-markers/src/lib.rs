//! Client for the boardmap marker store
//!
//! Approved gym markers and user proposals live in a Firebase Realtime
//! Database, used only through its REST interface.
//!
//! # Example
//!
//! ```no_run
//! use boardmap_markers::MarkerStoreClient;
//!
//! # async fn example() -> Result<(), boardmap_markers::MarkerStoreError> {
//! let client = MarkerStoreClient::default();
//!
//! for marker in client.list_markers().await? {
//!     println!("{} ({}, {})", marker.title, marker.coords.lat, marker.coords.lng);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Collections
//!
//! - `GET /markers.json` - approved markers (object keyed by push id, array, or null)
//! - `POST /markers.json` - add an approved marker
//! - `POST /proposedMarkers.json` - add a proposal (`status`, `submittedAt`, `submittedBy`)

mod client;
mod error;
mod feed;
mod normalize;
mod types;

pub use client::MarkerStoreClient;
pub use error::{MarkerStoreError, Result};
pub use feed::{MarkerFeed, MarkerSnapshot};
pub use normalize::normalize_markers;
pub use types::{Angle, Coords, Marker, NewMarker, ProposalStatus, ProposedMarker};
