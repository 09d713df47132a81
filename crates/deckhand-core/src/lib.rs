//! Deckhand Core Library
//!
//! Domain logic for provisioning an Android device over adb: composing
//! debloat lists, resolving app-set manifests, fetching artifacts and
//! applying everything against a connected device.

pub mod apps;
pub mod commands;
pub mod config;
pub mod context;
pub mod debloat;
pub mod device;
pub mod exec;
pub mod fs;
pub mod list;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{ConfigStore, DataLayout, DeckhandConfig};
    pub use crate::context::{AppContext, RunOptions};

    // Lists
    pub use crate::list::{Directive, IncludeContext, ResolvedActionSet, load, load_list};

    // Debloat
    pub use crate::debloat::{DebloatComposer, InvalidTierError, Tier, canonical_vendor};

    // Apps
    pub use crate::apps::{
        Downloader, FetchError, HttpDownloader, ManifestEntry, ManifestError, ManifestResolver,
        SourceFetcher, SourceKind,
    };

    // Device
    pub use crate::device::{
        AdbBridge, BestEffort, BridgeError, DeviceBridge, DeviceInfo, DeviceProfile, DeviceSession,
        DeviceState, ShellOutput,
    };

    // Execution
    pub use crate::exec::{Executor, ItemFailure, RunSummary};
}
