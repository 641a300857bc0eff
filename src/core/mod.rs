//! Format-independent building blocks: the record contract, line sources,
//! header/body splitting, column binding, cursors and output buffers.

/// Record reader / writer contract shared by every format
pub mod record;

/// Forward-only text line sources
pub mod lines;

/// Header/body split over a single forward-only sequence
pub mod subsequencer;

/// Logical column names bound to header positions
pub mod column_map;

/// Typed per-column access to the current record
pub mod cursor;

/// Write-side row buffer with single-assignment columns
pub mod out_buffer;

/// Grouping of consecutive items by key
pub mod batch;
