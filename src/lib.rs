//! Browse the Awesome Public Datasets catalog from a local mirror.
//!
//! [`sync`] keeps the metadata checkout current, [`catalog`] parses its
//! `<category>/<file>` YAML descriptors, [`reachability`] probes dataset
//! homepages, and [`Explorer`] ties them together with per-session memos.

pub mod catalog;
pub mod config;
pub mod explorer;
pub mod reachability;
pub mod sync;

pub use catalog::{
    Catalog, DatasetDescriptor, LayoutViolation, LoadedCatalog, ParseFailure, load_catalog,
    load_descriptor, render_count_chart,
};
pub use config::ExplorerConfig;
pub use explorer::{Explorer, SyncReport};
pub use reachability::{
    HomepageStatus, ReachabilityCache, ReachabilityResult, StatusLevel, TtlCache, UrlChecker,
    normalize_homepage,
};
pub use sync::{SyncError, SyncOutcome, ensure_local_mirror, git_available, is_checkout};
