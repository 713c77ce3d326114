//! Consistent hash ring implementation.
//!
//! - [`store`]: sorted virtual node positions and successor search
//! - [`registry`]: live nodes and the positions each one owns
//! - [`snapshot`]: immutable ring state that lookups run against
//! - [`mutation`]: add/remove as snapshot → snapshot functions
//! - [`ring`]: the concurrent handle publishing snapshots

pub mod mutation;
pub mod registry;
pub mod ring;
pub mod snapshot;
pub mod store;

pub use registry::NodeRegistry;
pub use ring::{HashRing, RingBuilder};
pub use snapshot::RingSnapshot;
pub use store::RingStore;

/// Alias for the main ring type (used by lib.rs).
pub type Ring = HashRing;
