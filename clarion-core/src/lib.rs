//! Clarion Preference Engine
//!
//! Platform-agnostic core of the Clarion accessibility toolkit: the toggle registry, the
//! state engine that keeps scope classes in step with preferences, dual-backend
//! persistence and the page-load bootstrapper. Browser bindings live in `clarion-web`.

pub mod bootstrap;
pub mod capability;
pub mod config;
pub mod cooperating;
pub mod dom;
pub mod engine;
pub mod error;
pub mod registry;
pub mod scope;
pub mod snapshot;
pub mod status;
pub mod store;
pub mod surface;
pub mod task;
pub mod value;

// Re-export commonly used types
pub use bootstrap::Bootstrapper;
pub use capability::{NoSpeech, SpeechSynthesisCapability};
pub use config::ToolkitConfig;
pub use cooperating::CooperatingFeature;
pub use dom::{MemoryDocument, MemoryElement};
pub use engine::{Capabilities, Origin, ResetOutcome, SetOutcome, StateEngine};
pub use error::A11yError;
pub use registry::{ClassTemplate, Domain, EffectRegistry, GroupId, ToggleId, ToggleSpec};
pub use scope::{ScopeResolution, ScopeResolver, ScopeSelectors, ScopeSource, ScopeTree};
pub use snapshot::{DecodedSnapshot, PreferenceSnapshot};
pub use status::{NullStatusSink, RecordingStatusSink, StatusMessage, StatusSink, Tone};
pub use store::{
    FetchResponse, KeySaveResult, LocalCache, MemoryCache, MemoryRemote, PendingWrite,
    PreferenceStore, ReadReport, ReadSource, RemoteMode, RemotePolicy, RemoteStatus,
    RemoteStore, SaveAllReport, SaveRequest, SaveResponse, WriteOptions, WriteOutcome,
};
pub use surface::ClassSurface;
pub use task::{Spawn, TaskQueue};
pub use value::{ColorblindMode, ModeSet, ToggleValue};
