mod common;

use common::World;
use vellum_core::{DenyReason, ErrorKind, VellumError};
use vellum_types::models::{Role, TemplateStatus};

#[test]
fn editor_and_viewer_walkthrough() {
    let world = World::in_memory();
    let a = world.member("a@example.com", Role::Editor);
    let b = world.member("b@example.com", Role::Viewer);
    let t = world.template(&a);
    assert_eq!(t.status, TemplateStatus::Draft);

    let v1 = world
        .vellum
        .create_version(&t.id, Some("main"), "hello", &a, None)
        .unwrap();
    assert_eq!(v1.version.version_number, 1);
    let head = world.vellum.get_template(&t.id, &a).unwrap();
    assert_eq!(head.latest_version_id, Some(v1.version.id));

    let v2 = world
        .vellum
        .create_version(&t.id, Some("main"), "world", &a, None)
        .unwrap();
    assert_eq!(v2.version.version_number, 2);

    let listed: Vec<u64> = world
        .vellum
        .list_versions(&t.id, Some("main"), &a)
        .unwrap()
        .iter()
        .map(|v| v.version_number)
        .collect();
    assert_eq!(listed, vec![2, 1]);

    let err = world
        .vellum
        .create_version(&t.id, Some("main"), "nope", &b, None)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let read = world.vellum.get_version(&t.id, Some("main"), 1, &b).unwrap();
    assert_eq!(read.content, "hello");
}

#[test]
fn latest_tracks_main_and_branches_count_independently() {
    let world = World::in_memory();
    let editor = world.member("e@example.com", Role::Editor);
    let t = world.template(&editor);

    for i in 1..=5 {
        world
            .vellum
            .create_version(&t.id, None, &format!("draft {i}"), &editor, None)
            .unwrap();
    }
    let feature = world
        .vellum
        .create_version(&t.id, Some("feature/x"), "experiment", &editor, Some("try it"))
        .unwrap();
    assert_eq!(feature.version.version_number, 1);

    let latest = world.vellum.get_latest_version(&t.id, None, &editor).unwrap();
    assert_eq!(latest.version_number, 5);
    let head = world.vellum.get_template(&t.id, &editor).unwrap();
    assert_eq!(head.latest_version_id, Some(latest.id));

    let branches = world.vellum.list_branches(&t.id, &editor).unwrap();
    let names: Vec<&str> = branches.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["feature/x", "main"]);
    assert_eq!(world.vellum.list_all_versions(&t.id, &editor).unwrap().len(), 6);
}

#[test]
fn lifecycle_requires_admin() {
    let world = World::in_memory();
    let editor = world.member("e@example.com", Role::Editor);
    let t = world.template(&editor);
    world
        .vellum
        .create_version(&t.id, None, "body", &editor, None)
        .unwrap();

    let err = world.vellum.publish_template(&t.id, &editor).unwrap_err();
    assert!(matches!(
        err,
        VellumError::Forbidden(DenyReason::InsufficientRole { role: Role::Editor, .. })
    ));

    let published = world.vellum.publish_template(&t.id, &world.admin).unwrap();
    assert_eq!(published.status, TemplateStatus::Published);

    // Published templates still accept new versions.
    world
        .vellum
        .create_version(&t.id, None, "body v2", &editor, None)
        .unwrap();

    let archived = world.vellum.archive_template(&t.id, &world.admin).unwrap();
    let again = world.vellum.archive_template(&t.id, &world.admin).unwrap();
    assert!(archived.is_archived());
    assert_eq!(archived, again);

    let err = world
        .vellum
        .create_version(&t.id, None, "too late", &editor, None)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    // History stays readable after archival.
    let history = world.vellum.list_versions(&t.id, None, &editor).unwrap();
    assert_eq!(history.len(), 2);
}

#[test]
fn missing_things_are_not_found() {
    let world = World::in_memory();
    let editor = world.member("e@example.com", Role::Editor);
    let t = world.template(&editor);

    let err = world.vellum.get_latest_version(&t.id, None, &editor).unwrap_err();
    assert!(matches!(err, VellumError::NotFound("version")));
    let err = world
        .vellum
        .get_version(&t.id, Some("main"), 42, &editor)
        .unwrap_err();
    assert!(matches!(err, VellumError::NotFound("version")));
    let err = world
        .vellum
        .get_version(&t.id, None, u64::MAX, &editor)
        .unwrap_err();
    assert!(matches!(err, VellumError::NotFound("version")));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    let err = world
        .vellum
        .create_version(&vellum_types::models::TemplateId::new(), None, "x", &editor, None)
        .unwrap_err();
    assert!(matches!(err, VellumError::NotFound("template")));
}

#[test]
fn outsiders_see_nothing() {
    let world = World::in_memory();
    let editor = world.member("e@example.com", Role::Editor);
    world.template(&editor);
    let outsider = world
        .vellum
        .register_user("o@example.com", "$argon2id$fake", "Outsider")
        .unwrap()
        .id;

    assert_eq!(world.vellum.search_templates(None, Some("welcome"), &editor).unwrap().len(), 1);
    assert!(world.vellum.search_templates(None, None, &outsider).unwrap().is_empty());

    let err = world
        .vellum
        .create_template(&world.group, "Mine", None, &outsider)
        .unwrap_err();
    assert!(matches!(err, VellumError::Forbidden(DenyReason::NoMembership)));
}

#[test]
fn membership_admin_operations_are_gated() {
    let world = World::in_memory();
    let editor = world.member("e@example.com", Role::Editor);
    let viewer = world.member("v@example.com", Role::Viewer);

    let err = world
        .vellum
        .change_role(&world.group, &viewer, Role::Admin, &editor)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let promoted = world
        .vellum
        .change_role(&world.group, &viewer, Role::Editor, &world.admin)
        .unwrap();
    assert_eq!(promoted.role, Role::Editor);
    assert_eq!(world.vellum.list_members(&world.group, &viewer).unwrap().len(), 3);

    world
        .vellum
        .remove_member(&world.group, &viewer, &world.admin)
        .unwrap();
    let err = world.vellum.list_members(&world.group, &viewer).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
}
