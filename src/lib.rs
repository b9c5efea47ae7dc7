// Atom Browser Core - Tab & Navigation State Engine
// This file exposes all modules so they can be imported by the host shell
// and tested independently.

// Core modules
pub mod error;
pub mod resolver;
pub mod state;
pub mod storage;
pub mod store;

// Pure logic modules (no store or I/O imports)
pub mod modules;

pub use error::StoreError;
pub use resolver::{FixedDelayResolver, InstantResolver, TitleResolver, RESOLUTION_DELAY};
pub use state::{
    Bookmark, HistoryEntry, NavigationEntry, NavigationHistory, QuickLink, Tab, Theme,
    NEW_TAB_TITLE, NEW_TAB_URL,
};
pub use storage::{JsonFileStorage, MemoryStorage, Snapshot, StorageBackend};
pub use store::{BrowserStore, QuickLinkPatch, HISTORY_LIMIT, QUICK_LINK_LIMIT};
