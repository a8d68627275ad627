use serde::{Deserialize, Serialize};

/// ID assigned to an interned symbol name by the byte-string table.
/// Stable for the lifetime of the index; never reused or renumbered.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NameId(pub u32);

/// ID assigned to an interned file path. Same stability guarantees as
/// [`NameId`], but drawn from a separate table.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileId(pub u32);

/// Declared access level of a raw symbol, as reported by the front end.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Protected,
    PackageLocal,
    Private,
}

impl Visibility {
    /// Private symbols cannot be referenced outside their compilation
    /// unit's already-tracked scope, so they are never indexed.
    pub fn is_indexable(self) -> bool {
        self != Visibility::Private
    }
}

/// A resolved symbol occurrence as emitted by the compiler front end.
///
/// Closed set: the classifier matches exhaustively, so an unknown symbol
/// kind cannot reach the index at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawSymbol<'a> {
    Class {
        name: &'a [u8],
        visibility: Visibility,
        anonymous: bool,
    },
    Field {
        owner: &'a [u8],
        name: &'a [u8],
        visibility: Visibility,
    },
    Method {
        owner: &'a [u8],
        name: &'a [u8],
        visibility: Visibility,
        param_count: u8,
    },
}

impl<'a> RawSymbol<'a> {
    pub fn visibility(&self) -> Visibility {
        match self {
            RawSymbol::Class { visibility, .. }
            | RawSymbol::Field { visibility, .. }
            | RawSymbol::Method { visibility, .. } => *visibility,
        }
    }
}

/// Compact, ID-based encoding of a reference to a class, field, or method.
/// Used as the key of every inverted index.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LightRef {
    Class { name: NameId },
    Field { owner: NameId, name: NameId },
    Method { owner: NameId, name: NameId, param_count: u8 },
}

impl LightRef {
    /// The member (or class) name ID.
    pub fn name(&self) -> NameId {
        match self {
            LightRef::Class { name }
            | LightRef::Field { name, .. }
            | LightRef::Method { name, .. } => *name,
        }
    }

    /// The owning class ID, for member references.
    pub fn owner(&self) -> Option<NameId> {
        match self {
            LightRef::Class { .. } => None,
            LightRef::Field { owner, .. } | LightRef::Method { owner, .. } => Some(*owner),
        }
    }
}
