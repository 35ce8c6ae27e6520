//! Layout-independent record-stream engine.
//!
//! An EFD file is an ordered sequence of pipe-delimited records grouped into
//! lettered blocks, closed by per-block count records and a final control
//! block restating every record-type count and the total line count. This
//! module owns that mechanical layer; the layout modules only decide which
//! records each block carries.

pub mod fmt;
mod stream;

pub use stream::RecordStream;
