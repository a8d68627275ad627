//! Value model shared between the build pipeline and the backward-reference
//! index. The pipeline produces [`RawSymbol`] events per compiled file; the
//! index stores them as compact [`LightRef`] keys over interned IDs.

pub mod data;
pub mod refs;

pub use data::CompiledFileData;
pub use refs::{FileId, LightRef, NameId, RawSymbol, Visibility};
