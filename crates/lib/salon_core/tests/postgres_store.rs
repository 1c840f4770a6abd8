//! `PgStore` against a live PostgreSQL.
//!
//! Runs only when `DATABASE_URL` is set. Each test migrates into its own
//! throwaway schema and drops it afterwards.

use std::future::Future;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use salon_core::models::admin_user::{
    NewAdminUser, Role, UserListQuery, UserPatch, UserSort, UserStatus,
};
use salon_core::models::audit::{AuditAction, NewAuditEntry, RequestContext};
use salon_core::models::service::{NewService, PricingTier};
use salon_core::store::{AdminUserStore, AuditLog, PgStore, ServiceCatalog, StoreError};

/// Run `test` against a freshly migrated schema, or skip without a database.
async fn with_store<F, Fut>(test: F)
where
    F: FnOnce(PgStore) -> Fut,
    Fut: Future<Output = ()>,
{
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    let schema = format!("test_{}", Uuid::new_v4().simple());
    let admin = PgPool::connect(&url).await.unwrap();
    sqlx::query(&format!("CREATE SCHEMA {schema}"))
        .execute(&admin)
        .await
        .unwrap();

    let search_path = format!("SET search_path TO {schema}");
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .after_connect(move |conn, _meta| {
            let sql = search_path.clone();
            Box::pin(async move {
                sqlx::query(&sql).execute(conn).await?;
                Ok(())
            })
        })
        .connect(&url)
        .await
        .unwrap();
    salon_core::migrate::migrate(&pool).await.unwrap();

    test(PgStore::new(pool.clone())).await;

    pool.close().await;
    sqlx::query(&format!("DROP SCHEMA {schema} CASCADE"))
        .execute(&admin)
        .await
        .unwrap();
}

fn user(name: &str, email: &str, role: Role) -> NewAdminUser {
    NewAdminUser {
        name: name.into(),
        email: email.into(),
        role,
        password_hash: "$2b$04$placeholderplaceholderplaceholderplaceholderpl".into(),
        created_by_admin_id: None,
    }
}

fn query(search: Option<&str>, sort: UserSort, offset: i64, limit: i64) -> UserListQuery {
    UserListQuery {
        search: search.map(str::to_string),
        sort,
        offset,
        limit,
    }
}

#[tokio::test]
async fn duplicate_email_is_reported_as_duplicate() {
    with_store(|store| async move {
        AdminUserStore::insert(&store, user("A", "dup@salon.test", Role::User))
            .await
            .unwrap();
        let err = AdminUserStore::insert(&store, user("B", "dup@salon.test", Role::Admin))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(ref f) if f == "email"), "{err:?}");
        assert_eq!(store.count().await.unwrap(), 1);
    })
    .await;
}

#[tokio::test]
async fn login_lookup_returns_hash_and_status() {
    with_store(|store| async move {
        let created = AdminUserStore::insert(&store, user("Ada", "ada@salon.test", Role::Manager))
            .await
            .unwrap();
        assert_eq!(created.status, UserStatus::Active);
        assert!(store.email_exists("ada@salon.test").await.unwrap());
        assert!(!store.email_exists("nobody@salon.test").await.unwrap());

        let found = store
            .find_by_email_with_password("ada@salon.test")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.user, created);
        assert!(found.password_hash.starts_with("$2b$"));
        assert_eq!(store.find_by_id(created.id).await.unwrap(), Some(created));
        assert_eq!(store.find_by_id(Uuid::now_v7()).await.unwrap(), None);
    })
    .await;
}

#[tokio::test]
async fn search_treats_like_wildcards_literally() {
    with_store(|store| async move {
        for (name, email) in [
            ("Half 50% Off", "percent@salon.test"),
            ("Plain Name", "plain@salon.test"),
            ("snake_case", "under@salon.test"),
            ("snakeXcase", "nounder@salon.test"),
        ] {
            AdminUserStore::insert(&store, user(name, email, Role::User))
                .await
                .unwrap();
        }

        let page = AdminUserStore::list(&store, &query(Some("%"), UserSort::Newest, 0, 20))
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.users[0].email, "percent@salon.test");

        let page = AdminUserStore::list(&store, &query(Some("_"), UserSort::Newest, 0, 20))
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.users[0].name, "snake_case");

        let page = AdminUserStore::list(&store, &query(Some("PLAIN@"), UserSort::Newest, 0, 20))
            .await
            .unwrap();
        assert_eq!(page.total, 1);
    })
    .await;
}

#[tokio::test]
async fn partial_update_leaves_absent_fields_untouched() {
    with_store(|store| async move {
        let created = AdminUserStore::insert(&store, user("Kim", "kim@salon.test", Role::User))
            .await
            .unwrap();

        let patch = UserPatch {
            status: Some(UserStatus::Inactive),
            ..UserPatch::default()
        };
        let updated = store.update(created.id, &patch).await.unwrap().unwrap();
        assert_eq!(updated.name, "Kim");
        assert_eq!(updated.role, Role::User);
        assert_eq!(updated.status, UserStatus::Inactive);
        assert_eq!(updated.email, created.email);
        assert!(updated.updated_at >= created.updated_at);

        let patch = UserPatch {
            name: Some("Kimberly".into()),
            role: Some(Role::Support),
            status: None,
        };
        let updated = store.update(created.id, &patch).await.unwrap().unwrap();
        assert_eq!(updated.name, "Kimberly");
        assert_eq!(updated.role, Role::Support);
        assert_eq!(updated.status, UserStatus::Inactive);

        assert!(store.update(Uuid::now_v7(), &patch).await.unwrap().is_none());
    })
    .await;
}

#[tokio::test]
async fn listing_orders_and_pages_by_creation_time() {
    with_store(|store| async move {
        for i in 1..=5 {
            AdminUserStore::insert(&store, user(&format!("User {i}"), &format!("u{i}@salon.test"), Role::User))
                .await
                .unwrap();
        }

        let newest = AdminUserStore::list(&store, &query(None, UserSort::Newest, 0, 2))
            .await
            .unwrap();
        assert_eq!(newest.total, 5);
        let emails: Vec<_> = newest.users.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails, ["u5@salon.test", "u4@salon.test"]);

        let oldest_page_two = AdminUserStore::list(&store, &query(None, UserSort::Oldest, 2, 2))
            .await
            .unwrap();
        let emails: Vec<_> = oldest_page_two.users.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails, ["u3@salon.test", "u4@salon.test"]);

        let past_end = AdminUserStore::list(&store, &query(None, UserSort::Newest, 10, 2))
            .await
            .unwrap();
        assert_eq!(past_end.total, 5);
        assert!(past_end.users.is_empty());
    })
    .await;
}

#[tokio::test]
async fn audit_entries_come_back_newest_first() {
    with_store(|store| async move {
        let actor = Uuid::now_v7();
        for action in [AuditAction::AdminCreatedUser, AuditAction::AdminUpdatedUser] {
            store
                .append(NewAuditEntry {
                    action,
                    actor_admin_id: actor,
                    target_id: None,
                    metadata: serde_json::json!({ "step": action.as_str() }),
                    context: RequestContext {
                        ip_address: Some("192.0.2.1".into()),
                        user_agent: None,
                    },
                })
                .await
                .unwrap();
        }

        let recent = store.recent(10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].action, AuditAction::AdminUpdatedUser);
        assert_eq!(recent[1].metadata["step"], AuditAction::AdminCreatedUser.as_str());
        assert_eq!(recent[0].ip_address.as_deref(), Some("192.0.2.1"));
        assert_eq!(store.recent(1).await.unwrap().len(), 1);
    })
    .await;
}

#[tokio::test]
async fn services_round_trip_pricing_and_images() {
    with_store(|store| async move {
        let created = ServiceCatalog::insert(
            &store,
            NewService {
                name: "Balayage".into(),
                category: "Color".into(),
                description: "Hand-painted highlights".into(),
                duration: "120 min".into(),
                pricing: vec![PricingTier {
                    title: "Long".into(),
                    price: 140.0,
                }],
                images: vec!["uploads/a.png".into()],
            },
        )
        .await
        .unwrap();
        assert_eq!(created.pricing[0].price, 140.0);
        assert_eq!(created.images, ["uploads/a.png"]);

        assert_eq!(ServiceCatalog::list(&store, Some("Color")).await.unwrap().len(), 1);
        assert!(ServiceCatalog::list(&store, Some("Nails")).await.unwrap().is_empty());
        assert_eq!(store.get(created.id).await.unwrap(), Some(created.clone()));

        let removed = store.delete(created.id).await.unwrap();
        assert_eq!(removed.map(|s| s.id), Some(created.id));
        assert!(store.get(created.id).await.unwrap().is_none());
        assert!(store.delete(created.id).await.unwrap().is_none());
    })
    .await;
}
