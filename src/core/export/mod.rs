//! Export orchestration and archive assembly
//!
//! This module provides the core export logic for Keepsake, including:
//! - Batch planning under a per-archive size ceiling
//! - Entry name allocation and archive key derivation
//! - Archive assembly with embedded or sidecar metadata
//! - Export coordination, summary and reporting

pub mod allocator;
pub mod assembler;
pub mod coordinator;
pub mod naming;
pub mod planner;
pub mod summary;

pub use allocator::FilenameAllocator;
pub use assembler::{ArchiveAssembler, AssembledArchive};
pub use coordinator::ExportCoordinator;
pub use naming::{sanitize_project_name, ArchiveNaming};
pub use planner::{Batch, BatchPlanner};
pub use summary::{ExportError, ExportErrorType, ExportSummary};
