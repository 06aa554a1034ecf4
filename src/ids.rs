// ==============================================================================
// ids.rs - File Identifier Generation
// ==============================================================================
// Description: Source of unique tokens for interchange files and engine
//              output prefixes
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 0.1.0
// ==============================================================================

use uuid::Uuid;

/// Produces file-name tokens that are unique within a working directory.
///
/// Concurrent sessions sharing a directory rely on these tokens, not on
/// locking, to avoid collisions.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random UUID v4 tokens rendered as 32 lowercase hex digits
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}
