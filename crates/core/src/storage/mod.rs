pub mod enumerator;
pub mod index;
pub mod model;
pub mod paths;
pub mod root;

pub use enumerator::NameTable;
pub use index::{IndexDelta, InvertedIndex};
pub use paths::PathTable;
pub use root::{FORMAT_VERSION, IndexRoot};
