//! Hostprint Engine
//!
//! Builds a fingerprint of a running host by reflectively instantiating and
//! exploring a catalog of host types:
//! - **Factory**: memoized instantiation with a recursion guard (`factory`)
//! - **Synthesizer**: fixed placeholder arguments (`synthesizer`)
//! - **Selector**: which members are worth harvesting (`selector`)
//! - **Explorer**: depth-bounded, cycle-safe object rendering (`explorer`)
//! - **Orchestration**: catalog scan, collaborators, merged report
//!   (`scan`, `fingerprint`)
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use hostprint_engine::{Collaborators, FingerprintExtractor, InstanceFactory, ScanConfig};
//!
//! let config = ScanConfig::default();
//! let factory = InstanceFactory::from_config(host.clone(), &config);
//! let extractor = FingerprintExtractor::new(config, Collaborators::default())?;
//! let report = extractor.extract(factory, vec!["pkg.Simple".to_string()]);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![allow(clippy::derivable_impls)]

// ============================================================================
// Core
// ============================================================================

/// Per-pass instance cache, in-flight set and visited set
pub mod context;

/// Instance factory
pub mod factory;

/// Placeholder argument synthesis
pub mod synthesizer;

/// Member selection heuristics
pub mod selector;

/// Object graph explorer
pub mod explorer;

// ============================================================================
// Orchestration
// ============================================================================

/// Catalog type scan
pub mod scan;

/// Fingerprint orchestrator
pub mod fingerprint;

/// Worker pool and affinity thread
pub mod scheduler;

/// External collaborator contracts and defaults
pub mod collab;

// ============================================================================
// Support
// ============================================================================

/// Type catalog loading
pub mod catalog;

/// Scan configuration
pub mod config;

/// Engine errors
pub mod error;

/// Report records and sentinels
pub mod report;

pub use collab::{
    CollaboratorError, CommandExecutor, ContentReader, ContentRow, DeveloperModeProbe,
    NoopProgress, ProgressSink, RootHeuristics, ShellCommandExecutor, StaticContentReader,
    StaticDeveloperMode, StaticTamperCheck, TamperCheck,
};
pub use config::{CommandSpec, ConfigError, DeniedMethods, ScanConfig};
pub use context::{ExplorationContext, VisitedSet};
pub use error::{ExplorationError, ExplorationResult, SourceError};
pub use explorer::ObjectExplorer;
pub use factory::InstanceFactory;
pub use fingerprint::{Collaborators, FingerprintExtractor};
pub use report::{Report, Sentinel};
pub use scan::{TypeScan, TypeScanner};
pub use scheduler::{AffinityThread, JobError, JobHandle, WorkerPool};
