//! The contract every stored resource fulfils.

use serde::{Serialize, de::DeserializeOwned};

use wms_core::{DomainError, DomainResult, RecordId};

/// How `DELETE` behaves for a collection.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DeleteMode {
    /// Row is removed.
    Hard,
    /// Row is kept with `deleted_at` set and disappears from reads.
    Soft,
}

/// A foreign key held by a record body.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Body field holding the id (used in error messages).
    pub field: &'static str,
    /// Collection the id must exist in.
    pub collection: &'static str,
    pub id: RecordId,
}

impl Reference {
    pub fn new(field: &'static str, collection: &'static str, id: RecordId) -> Self {
        Self {
            field,
            collection,
            id,
        }
    }
}

/// A foreign-key column declared by a resource type.
///
/// Mirrors what [`Resource::references`] yields per record, so the storage
/// layer can find referrers of a record without knowing the concrete types.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub field: &'static str,
    /// Collection the column points at.
    pub target: &'static str,
    /// `true` when the column holds an array of ids.
    pub many: bool,
}

impl ForeignKey {
    pub const fn one(field: &'static str, target: &'static str) -> Self {
        Self {
            field,
            target,
            many: false,
        }
    }

    pub const fn many(field: &'static str, target: &'static str) -> Self {
        Self {
            field,
            target,
            many: true,
        }
    }
}

/// A CRUD resource.
///
/// The resource type itself is the create payload; `Update` is a partial
/// patch where absent fields leave the stored value untouched.
pub trait Resource: Clone + core::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Table / URL segment / permission prefix.
    const COLLECTION: &'static str;

    const DELETE_MODE: DeleteMode;

    /// Every column [`Resource::references`] may report.
    const FOREIGN_KEYS: &'static [ForeignKey] = &[];

    type Update: DeserializeOwned + Send + 'static;

    /// Equality filter accepted by `GET /api/<collection>`.
    type Filter: Serialize + DeserializeOwned + Default + Send + Sync + 'static;

    /// Check field-level invariants.
    fn validate(&self) -> DomainResult<()>;

    fn apply_update(&mut self, patch: Self::Update);

    /// Records this one points at; each must exist and not be soft-deleted.
    fn references(&self) -> Vec<Reference> {
        Vec::new()
    }
}

/// Copy every `Some` field of a patch onto the target.
///
/// Fields in the first list are plain; fields in the second are `Option`s on
/// the target (a patch can set them but not clear them).
macro_rules! apply_patch {
    ($target:expr, $patch:expr, [$($field:ident),* $(,)?] $(, [$($opt:ident),* $(,)?])?) => {{
        let patch = $patch;
        $(
            if let Some(value) = patch.$field {
                $target.$field = value;
            }
        )*
        $($(
            if let Some(value) = patch.$opt {
                $target.$opt = Some(value);
            }
        )*)?
    }};
}
pub(crate) use apply_patch;

const MAX_TEXT_LEN: usize = 255;

pub(crate) fn require_text(field: &str, value: &str) -> DomainResult<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} must not be blank")));
    }
    if trimmed.len() != value.len() {
        return Err(DomainError::validation(format!(
            "{field} must not have leading or trailing whitespace"
        )));
    }
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(DomainError::validation(format!(
            "{field} must be at most {MAX_TEXT_LEN} characters"
        )));
    }
    Ok(())
}

pub(crate) fn optional_text(field: &str, value: Option<&str>) -> DomainResult<()> {
    match value {
        Some(v) => require_text(field, v),
        None => Ok(()),
    }
}

pub(crate) fn require_non_negative(field: &str, value: i64) -> DomainResult<()> {
    if value < 0 {
        return Err(DomainError::validation(format!("{field} must not be negative")));
    }
    Ok(())
}

pub(crate) fn require_positive(field: &str, value: f64) -> DomainResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DomainError::validation(format!("{field} must be greater than zero")));
    }
    Ok(())
}

pub(crate) fn optional_positive(field: &str, value: Option<f64>) -> DomainResult<()> {
    match value {
        Some(v) => require_positive(field, v),
        None => Ok(()),
    }
}
