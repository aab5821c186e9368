//! Shared audit columns.
//!
//! Entity structs embed [`TimeModel`], [`AuditModel`], [`FullModel`] or
//! [`HardDeleteModel`] with `[flatten]`; the matching transport structs embed
//! [`TimeFields`], [`AuditFields`], [`FullFields`], [`CreateFields`] or
//! [`UpdateFields`].
//! Entity time fields pair with the transport strings through their copy
//! names, so a conversion formats and parses them with the time converters.

use reflect_core::{impl_reflect_struct, NullTime, Timestamp};

use crate::allowlist::{create_fields, update_fields};

/// Creation, update and soft-delete times.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeModel {
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: NullTime,
}

impl_reflect_struct!(TimeModel {
    created_at: Timestamp => "createTime" as "create_time",
    updated_at: Timestamp => "updateTime" as "update_time",
    deleted_at: NullTime => "-" as "delete_time",
});

/// Audit times plus the acting user of each change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditModel {
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: NullTime,
    pub create_id: i64,
    pub update_id: i64,
    pub delete_id: i64,
    pub create_by: String,
    pub update_by: String,
    pub delete_by: String,
}

impl_reflect_struct!(AuditModel {
    created_at: Timestamp => "createTime" as "create_time",
    updated_at: Timestamp => "updateTime" as "update_time",
    deleted_at: NullTime => "-" as "delete_time",
    create_id: i64 => "createId",
    update_id: i64 => "updateId",
    delete_id: i64 => "deleteId",
    create_by: String => "createBy",
    update_by: String => "updateBy",
    delete_by: String => "deleteBy",
});

/// [`AuditModel`] plus the columns a partial write may touch.
///
/// `allow_fields` is not a column; it travels with the entity from the
/// transport layer to the persistence layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FullModel {
    pub audit: AuditModel,
    pub allow_fields: Vec<String>,
}

impl_reflect_struct!(FullModel {
    audit: AuditModel [flatten],
    allow_fields: Vec<String> => "allowFields",
});

impl FullModel {
    /// Insert allowlist, see [`create_fields`].
    pub fn create_allowlist(&self) -> Vec<String> {
        create_fields(self.allow_fields.clone())
    }

    /// Update allowlist, see [`update_fields`].
    pub fn update_allowlist(&self) -> Vec<String> {
        update_fields(self.allow_fields.clone())
    }
}

/// Creation and update times for tables without soft delete.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HardDeleteModel {
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl_reflect_struct!(HardDeleteModel {
    created_at: Timestamp => "createTime" as "create_time",
    updated_at: Timestamp => "updateTime" as "update_time",
});

/// Transport form of [`TimeModel`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeFields {
    pub create_time: String,
    pub update_time: String,
    pub delete_time: String,
}

impl_reflect_struct!(TimeFields {
    create_time: String => "createTime",
    update_time: String => "updateTime",
    delete_time: String => "deleteTime",
});

/// Transport form of [`AuditModel`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditFields {
    pub create_id: i64,
    pub update_id: i64,
    pub delete_id: i64,
    pub create_by: String,
    pub update_by: String,
    pub delete_by: String,
    pub create_time: String,
    pub update_time: String,
    pub delete_time: String,
}

impl_reflect_struct!(AuditFields {
    create_id: i64 => "createId",
    update_id: i64 => "updateId",
    delete_id: i64 => "deleteId",
    create_by: String => "createBy",
    update_by: String => "updateBy",
    delete_by: String => "deleteBy",
    create_time: String => "createTime",
    update_time: String => "updateTime",
    delete_time: String => "deleteTime",
});

/// Transport form of [`FullModel`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FullFields {
    pub allow_fields: Vec<String>,
    pub audit: AuditFields,
}

impl_reflect_struct!(FullFields {
    allow_fields: Vec<String> => "allowFields",
    audit: AuditFields [flatten],
});

/// Transport fields of an insert request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateFields {
    pub allow_fields: Vec<String>,
    pub create_id: i64,
    pub create_by: String,
    pub create_time: String,
}

impl_reflect_struct!(CreateFields {
    allow_fields: Vec<String> => "allowFields",
    create_id: i64 => "createId",
    create_by: String => "createBy",
    create_time: String => "createTime",
});

impl CreateFields {
    pub fn allowlist(&self) -> Vec<String> {
        create_fields(self.allow_fields.clone())
    }
}

/// Transport fields of an update request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateFields {
    pub allow_fields: Vec<String>,
    pub update_id: i64,
    pub update_by: String,
    pub update_time: String,
}

impl_reflect_struct!(UpdateFields {
    allow_fields: Vec<String> => "allowFields",
    update_id: i64 => "updateId",
    update_by: String => "updateBy",
    update_time: String => "updateTime",
});

impl UpdateFields {
    pub fn allowlist(&self) -> Vec<String> {
        update_fields(self.allow_fields.clone())
    }
}
