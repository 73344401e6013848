//! Grid Loader and Merged-Cell Propagator.

pub mod cell;
pub mod loader;
pub mod merge;

pub use cell::{Cell, CellValue, MergeRegion, MergeSpan, SheetData, SpanId, SpanOverlap};
pub use loader::{GridLoader, RawGrid};
pub use merge::{ColumnLabel, CompositeLabel, HeaderLabels, MergePropagator, PropagatedRow};
