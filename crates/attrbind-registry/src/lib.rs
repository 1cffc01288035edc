//! Registry of binding declarations.
//!
//! - [`SetterStore`]: the five declaration tables with round-scoped duplicate
//!   detection and owner-based invalidation
//! - [`RoundDeclarations`]: validation and registration of one round's scanner output
//! - [`snapshot`]: the versioned on-disk format and [`SnapshotLayout`]
//! - [`ModuleGraph`]: which modules' snapshots a compilation sees, and in which order

mod declaration;
mod keys;
mod module_graph;
pub mod snapshot;
mod store;

pub use declaration::{
    AdapterDeclaration, ConversionDeclaration, DeclaredMethod, RenamedSetterDeclaration,
    RoundDeclarations, UntaggableDeclaration,
};
pub use keys::{AccessorKey, MultiAttributeAdapterKey};
pub use module_graph::{ModuleEdge, ModuleGraph};
pub use snapshot::{
    DEFAULT_SNAPSHOT_SUFFIX, SNAPSHOT_MAGIC, SnapshotLayout, SnapshotV1, VersionedSnapshot,
};
pub use store::{SetterStore, StoreTables};
