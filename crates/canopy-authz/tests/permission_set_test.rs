//! Integration tests for stored permission sets using in-memory SurrealDB.

use std::collections::HashSet;

use canopy_authz::{Actor, AuthzConfig, StoredPermissionSet};
use canopy_core::error::{CanopyError, FailureCause};
use canopy_core::models::grouped_object::ObjectType;
use canopy_core::models::permission::{
    ObjectPermission, ObjectPermissionType, PermissionScope, SystemPermission,
};
use canopy_core::models::subject::GrantSubject;
use canopy_core::permission_set::PermissionSet;
use canopy_db::repository::SurrealGrantRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

const CONNECTIONS: PermissionScope = PermissionScope::Object(ObjectType::Connection);

/// Spin up in-memory DB, run migrations, and make `admin` a system
/// administrator.
async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    canopy_db::run_migrations(&db).await.unwrap();

    system_set(&db, Actor::Unrestricted, "admin")
        .add_permissions(HashSet::from([SystemPermission::Administer]))
        .await
        .unwrap();

    db
}

fn system_set(
    db: &Surreal<Db>,
    actor: Actor,
    user: &str,
) -> StoredPermissionSet<SurrealGrantRepository<Db>, SystemPermission> {
    StoredPermissionSet::new(
        SurrealGrantRepository::new(db.clone()),
        actor,
        GrantSubject::User(user.into()),
        PermissionScope::System,
        AuthzConfig::default(),
    )
    .unwrap()
}

fn connection_set(
    db: &Surreal<Db>,
    actor: Actor,
    subject: GrantSubject,
) -> StoredPermissionSet<SurrealGrantRepository<Db>, ObjectPermission> {
    StoredPermissionSet::new(
        SurrealGrantRepository::new(db.clone()),
        actor,
        subject,
        CONNECTIONS,
        AuthzConfig::default(),
    )
    .unwrap()
}

fn read(id: &str) -> ObjectPermission {
    ObjectPermission::new(ObjectPermissionType::Read, id)
}

fn admin() -> Actor {
    Actor::user("admin")
}

// ---------------------------------------------------------------------------
// Set semantics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fresh_subject_add_then_remove_absent() {
    let db = setup().await;
    let set = system_set(&db, admin(), "u1");

    assert!(set.get_permissions().await.unwrap().is_empty());

    set.add_permissions(HashSet::from([SystemPermission::CreateUser]))
        .await
        .unwrap();
    assert_eq!(
        set.get_permissions().await.unwrap(),
        HashSet::from([SystemPermission::CreateUser])
    );

    // Never granted: silently skipped.
    set.remove_permissions(HashSet::from([SystemPermission::CreateConnection]))
        .await
        .unwrap();
    assert_eq!(
        set.get_permissions().await.unwrap(),
        HashSet::from([SystemPermission::CreateUser])
    );
}

#[tokio::test]
async fn adding_twice_equals_adding_once() {
    let db = setup().await;
    let set = connection_set(&db, admin(), GrantSubject::User("u1".into()));
    let batch = HashSet::from([read("c1"), read("c2")]);

    set.add_permissions(batch.clone()).await.unwrap();
    let once = set.get_permissions().await.unwrap();

    set.add_permissions(batch.clone()).await.unwrap();
    let twice = set.get_permissions().await.unwrap();

    assert_eq!(once, batch);
    assert_eq!(once, twice);
}

#[tokio::test]
async fn successive_adds_yield_union() {
    let db = setup().await;
    let set = connection_set(&db, admin(), GrantSubject::User("u1".into()));

    set.add_permissions(HashSet::from([read("c0")])).await.unwrap();
    set.add_permissions(HashSet::from([read("c1"), read("c2")]))
        .await
        .unwrap();
    set.add_permissions(HashSet::from([
        read("c2"),
        ObjectPermission::new(ObjectPermissionType::Delete, "c2"),
    ]))
    .await
    .unwrap();

    let expected = HashSet::from([
        read("c0"),
        read("c1"),
        read("c2"),
        ObjectPermission::new(ObjectPermissionType::Delete, "c2"),
    ]);
    assert_eq!(set.get_permissions().await.unwrap(), expected);
}

#[tokio::test]
async fn remove_revokes_only_held_grants() {
    let db = setup().await;
    let set = connection_set(&db, admin(), GrantSubject::User("u1".into()));

    set.add_permissions(HashSet::from([read("c1"), read("c2")]))
        .await
        .unwrap();
    set.remove_permissions(HashSet::from([read("c1"), read("c9")]))
        .await
        .unwrap();
    set.remove_permissions(HashSet::from([read("c1")]))
        .await
        .unwrap();

    assert_eq!(
        set.get_permissions().await.unwrap(),
        HashSet::from([read("c2")])
    );
}

#[tokio::test]
async fn concurrent_disjoint_adds_lose_nothing() {
    let db = setup().await;
    let subject = GrantSubject::User("u1".into());
    let first = connection_set(&db, admin(), subject.clone());
    let second = connection_set(&db, admin(), subject);

    let g1 = HashSet::from([read("c1"), read("c2")]);
    let g2 = HashSet::from([read("c3"), read("c4")]);

    let (a, b) = tokio::join!(
        first.add_permissions(g1.clone()),
        second.add_permissions(g2.clone()),
    );
    a.unwrap();
    b.unwrap();

    let expected: HashSet<ObjectPermission> = g1.union(&g2).cloned().collect();
    assert_eq!(first.get_permissions().await.unwrap(), expected);
}

#[tokio::test]
async fn sets_do_not_share_state() {
    let db = setup().await;
    let writer = connection_set(&db, admin(), GrantSubject::User("u1".into()));
    let reader = connection_set(&db, admin(), GrantSubject::User("u1".into()));

    assert!(reader.get_permissions().await.unwrap().is_empty());
    writer
        .add_permissions(HashSet::from([read("c1")]))
        .await
        .unwrap();
    assert_eq!(
        reader.get_permissions().await.unwrap(),
        HashSet::from([read("c1")])
    );
}

// ---------------------------------------------------------------------------
// Access policy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn user_may_read_own_permissions_but_not_others() {
    let db = setup().await;
    system_set(&db, admin(), "bob")
        .add_permissions(HashSet::from([SystemPermission::CreateConnection]))
        .await
        .unwrap();

    let own = system_set(&db, Actor::user("bob"), "bob");
    assert_eq!(
        own.get_permissions().await.unwrap(),
        HashSet::from([SystemPermission::CreateConnection])
    );

    let other = system_set(&db, Actor::user("bob"), "admin");
    let err = other.get_permissions().await.unwrap_err();
    assert!(err.is_permission_denied());
    assert!(matches!(err, CanopyError::Retrieval { .. }));
}

#[tokio::test]
async fn non_admin_cannot_alter_system_permissions() {
    let db = setup().await;
    let set = system_set(&db, Actor::user("bob"), "bob");

    let err = set
        .add_permissions(HashSet::from([SystemPermission::Administer]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CanopyError::Mutation {
            cause: FailureCause::PermissionDenied(_)
        }
    ));

    assert!(set.get_permissions().await.unwrap().is_empty());
}

#[tokio::test]
async fn object_administrator_may_grant_only_on_administered_objects() {
    let db = setup().await;
    connection_set(&db, admin(), GrantSubject::User("bob".into()))
        .add_permissions(HashSet::from([ObjectPermission::new(
            ObjectPermissionType::Administer,
            "c1",
        )]))
        .await
        .unwrap();

    let carol = connection_set(&db, Actor::user("bob"), GrantSubject::User("carol".into()));

    carol
        .add_permissions(HashSet::from([read("c1")]))
        .await
        .unwrap();

    // A batch touching an object bob does not administer is rejected whole.
    let err = carol
        .add_permissions(HashSet::from([
            ObjectPermission::new(ObjectPermissionType::Update, "c1"),
            read("c2"),
        ]))
        .await
        .unwrap_err();
    assert!(err.is_permission_denied());

    let held = connection_set(&db, admin(), GrantSubject::User("carol".into()))
        .get_permissions()
        .await
        .unwrap();
    assert_eq!(held, HashSet::from([read("c1")]));
}

#[tokio::test]
async fn group_membership_confers_administration() {
    let db = setup().await;
    let admins = StoredPermissionSet::<_, SystemPermission>::new(
        SurrealGrantRepository::new(db.clone()),
        admin(),
        GrantSubject::UserGroup("admins".into()),
        PermissionScope::System,
        AuthzConfig::default(),
    )
    .unwrap();
    admins
        .add_permissions(HashSet::from([SystemPermission::Administer]))
        .await
        .unwrap();

    let actor = Actor::user("dave").with_groups(["admins"]);
    let set = system_set(&db, actor, "erin");
    set.add_permissions(HashSet::from([SystemPermission::CreateUserGroup]))
        .await
        .unwrap();
    assert_eq!(
        set.get_permissions().await.unwrap(),
        HashSet::from([SystemPermission::CreateUserGroup])
    );
}

#[tokio::test]
async fn empty_batch_is_noop_even_without_rights() {
    let db = setup().await;
    let set = system_set(&db, Actor::user("nobody"), "admin");

    set.add_permissions(HashSet::new()).await.unwrap();
    set.remove_permissions(HashSet::new()).await.unwrap();
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn oversized_batch_is_a_constraint_failure() {
    let db = setup().await;
    let set = StoredPermissionSet::<_, ObjectPermission>::new(
        SurrealGrantRepository::new(db.clone()),
        admin(),
        GrantSubject::User("u1".into()),
        CONNECTIONS,
        AuthzConfig {
            max_batch_size: 2,
            ..Default::default()
        },
    )
    .unwrap();

    let err = set
        .add_permissions(HashSet::from([read("c1"), read("c2"), read("c3")]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CanopyError::Mutation {
            cause: FailureCause::Constraint(_)
        }
    ));
    assert!(set.get_permissions().await.unwrap().is_empty());
}

#[tokio::test]
async fn permission_type_must_fit_scope() {
    let db = setup().await;

    let result = StoredPermissionSet::<_, SystemPermission>::new(
        SurrealGrantRepository::new(db.clone()),
        admin(),
        GrantSubject::User("u1".into()),
        CONNECTIONS,
        AuthzConfig::default(),
    );
    assert!(matches!(result, Err(CanopyError::Validation { .. })));

    let result = StoredPermissionSet::<_, ObjectPermission>::new(
        SurrealGrantRepository::new(db),
        admin(),
        GrantSubject::User("u1".into()),
        PermissionScope::System,
        AuthzConfig::default(),
    );
    assert!(matches!(result, Err(CanopyError::Validation { .. })));
}
