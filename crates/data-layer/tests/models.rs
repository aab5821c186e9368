//! Entity ↔ transport conversion of structs embedding the audit columns.

use chrono::{NaiveDate, NaiveDateTime};
use copy_engine::{convert, CopyOptions};
use data_layer::{allowed_fields_of, update_fields, AuditFields, AuditModel, FieldOptions};
use data_layer::{FullFields, FullModel, TimeFields, TimeModel, UpdateFields};
use reflect_core::{impl_reflect_struct, NullTime, Timestamp};

#[derive(Debug, Clone, Default, PartialEq)]
struct UserEntity {
    id: i64,
    name: String,
    audit: AuditModel,
}

impl_reflect_struct!(UserEntity {
    id: i64,
    name: String,
    audit: AuditModel [flatten],
});

#[derive(Debug, Clone, Default, PartialEq)]
struct UserMessage {
    id: i64,
    name: String,
    audit: AuditFields,
}

impl_reflect_struct!(UserMessage {
    id: i64,
    name: String,
    audit: AuditFields [flatten],
});

#[derive(Debug, Clone, Default, PartialEq)]
struct NoteEntity {
    body: String,
    times: TimeModel,
}

impl_reflect_struct!(NoteEntity { body: String, times: TimeModel [flatten] });

#[derive(Debug, Clone, Default, PartialEq)]
struct NoteMessage {
    body: String,
    times: TimeFields,
}

impl_reflect_struct!(NoteMessage { body: String, times: TimeFields [flatten] });

fn at(day: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 12, day)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

fn user() -> UserEntity {
    UserEntity {
        id: 1,
        name: "Ada".into(),
        audit: AuditModel {
            created_at: Timestamp(at(1, 8)),
            updated_at: Timestamp(at(2, 9)),
            deleted_at: NullTime::null(),
            create_id: 7,
            update_id: 8,
            create_by: "root".into(),
            update_by: "ops".into(),
            ..Default::default()
        },
    }
}

#[test]
fn test_entity_to_message() {
    let mut message = UserMessage::default();
    convert(&mut message, &user(), &CopyOptions::entity()).unwrap();

    assert_eq!(message.id, 1);
    assert_eq!(message.name, "Ada");
    assert_eq!(message.audit.create_time, "2025-12-01 08:00:00");
    assert_eq!(message.audit.update_time, "2025-12-02 09:00:00");
    assert_eq!(message.audit.delete_time, "");
    assert_eq!(message.audit.create_id, 7);
    assert_eq!(message.audit.update_by, "ops");
}

#[test]
fn test_message_to_entity() {
    let mut message = UserMessage::default();
    convert(&mut message, &user(), &CopyOptions::entity()).unwrap();
    message.audit.delete_time = "2025-12-03".into();

    let mut entity = UserEntity::default();
    convert(&mut entity, &message, &CopyOptions::entity()).unwrap();

    let mut expected = user();
    expected.audit.deleted_at = NullTime::new(at(3, 0));
    assert_eq!(entity, expected);
}

#[test]
fn test_time_only_models() {
    let note = NoteEntity {
        body: "b".into(),
        times: TimeModel {
            created_at: Timestamp(at(1, 8)),
            deleted_at: NullTime::new(at(4, 0)),
            ..Default::default()
        },
    };
    let mut message = NoteMessage::default();
    convert(&mut message, &note, &CopyOptions::entity()).unwrap();
    assert_eq!(
        message.times,
        TimeFields {
            create_time: "2025-12-01 08:00:00".into(),
            update_time: String::new(),
            delete_time: "2025-12-04".into(),
        }
    );
}

#[test]
fn test_update_allowlist_for_entity() {
    let allow = allowed_fields_of::<UserEntity>(
        &FieldOptions::default()
            .filter("id")
            .filter("created_at")
            .filter("create_id")
            .filter("create_by"),
    );
    assert_eq!(
        update_fields(allow),
        vec![
            "name",
            "updated_at",
            "deleted_at",
            "update_id",
            "delete_id",
            "update_by",
            "delete_by",
            "update_id",
            "update_by",
        ]
    );
}

#[derive(Debug, Clone, Default, PartialEq)]
struct ProjectEntity {
    id: i64,
    title: String,
    full: FullModel,
}

impl_reflect_struct!(ProjectEntity {
    id: i64,
    title: String,
    full: FullModel [flatten],
});

#[derive(Debug, Clone, Default, PartialEq)]
struct ProjectMessage {
    id: i64,
    title: String,
    full: FullFields,
}

impl_reflect_struct!(ProjectMessage {
    id: i64,
    title: String,
    full: FullFields [flatten],
});

#[test]
fn test_full_models_carry_allowlist() {
    let message = ProjectMessage {
        id: 3,
        title: "renamed".into(),
        full: FullFields {
            allow_fields: vec!["title".into()],
            audit: AuditFields {
                update_id: 9,
                update_by: "ops".into(),
                update_time: "2025-12-02 09:00:00".into(),
                ..Default::default()
            },
        },
    };
    let mut entity = ProjectEntity::default();
    convert(&mut entity, &message, &CopyOptions::entity()).unwrap();

    assert_eq!(entity.title, "renamed");
    assert_eq!(entity.full.allow_fields, vec!["title"]);
    assert_eq!(entity.full.audit.update_id, 9);
    assert_eq!(entity.full.audit.updated_at, Timestamp(at(2, 9)));
    assert!(entity.full.audit.created_at.is_zero());

    assert_eq!(
        entity.full.update_allowlist(),
        vec!["title", "update_id", "update_by"]
    );
    assert_eq!(
        entity.full.create_allowlist(),
        vec!["title", "create_id", "create_by"]
    );
    assert!(FullModel::default().update_allowlist().is_empty());
}

#[test]
fn test_full_model_allowed_fields_skip_allowlist() {
    let options = FieldOptions::default().filter("allow_fields");
    let allow = allowed_fields_of::<ProjectEntity>(&options);
    assert_eq!(&allow[..2], ["id", "title"]);
    assert!(allow.contains(&"update_by".to_string()));
    assert!(!allow.contains(&"allow_fields".to_string()));
}

#[test]
fn test_update_fields_from_message() {
    let mut update = UpdateFields::default();
    let message = ProjectMessage {
        full: FullFields {
            allow_fields: vec!["title".into()],
            audit: AuditFields {
                update_id: 4,
                ..Default::default()
            },
        },
        ..Default::default()
    };
    convert(&mut update, &message, &CopyOptions::transport()).unwrap();
    assert_eq!(update.update_id, 4);
    assert_eq!(update.allowlist(), vec!["title", "update_id", "update_by"]);
}
