/// Maximum number of nested function, method and constructor calls
pub const MAX_CALL_DEPTH: usize = 512;

/// Remaining native stack below which evaluation grows onto a new segment
pub const STACK_RED_ZONE: usize = 128 * 1024;

/// Size of each new native stack segment
pub const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;
