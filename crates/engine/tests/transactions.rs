use sea_orm::Database;

use engine::{
    Currency, Engine, EngineError, MoneyCents, ShareEntry, SharingDescription, SharingMethod,
    TransactionKind,
};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build()
}

fn equally(owner_ids: &[i64]) -> SharingDescription {
    SharingDescription {
        method: SharingMethod::Equally,
        entries: owner_ids
            .iter()
            .map(|&owner_id| ShareEntry {
                owner_id,
                take: None,
            })
            .collect(),
    }
}

fn amounts(takes: &[(i64, i64)]) -> SharingDescription {
    SharingDescription {
        method: SharingMethod::Amounts,
        entries: takes
            .iter()
            .map(|&(owner_id, take)| ShareEntry {
                owner_id,
                take: Some(take),
            })
            .collect(),
    }
}

#[tokio::test]
async fn account_and_owner_lifecycle() {
    let engine = engine_with_db().await;

    let account = engine
        .new_account("Trip to Banff", Some(Currency::Cad))
        .await
        .unwrap();

    let alice = engine.new_owner(&account.uuid, "Alice").await.unwrap();
    let bob = engine.new_owner(&account.uuid, "Bob").await.unwrap();
    assert_ne!(alice.id, bob.id);

    // Duplicate name within the same account is rejected.
    assert_eq!(
        engine.new_owner(&account.uuid, "Alice").await,
        Err(EngineError::ExistingKey("Alice".to_string()))
    );

    let owners = engine.account_owners(&account.uuid).await.unwrap();
    assert_eq!(owners.len(), 2);
    assert_eq!(owners[0].name, "Alice");

    let renamed = engine
        .update_owner(bob.id, &account.uuid, "Robert")
        .await
        .unwrap();
    assert_eq!(renamed.name, "Robert");

    engine.delete_owner(alice.id, &account.uuid).await.unwrap();
    let ids = engine.fetch_owner_ids(&account.uuid).await.unwrap();
    assert!(!ids.contains(&alice.id));
    assert!(ids.contains(&bob.id));
}

#[tokio::test]
async fn fetch_owner_ids_requires_existing_account() {
    let engine = engine_with_db().await;
    assert!(matches!(
        engine.fetch_owner_ids("missing-account").await,
        Err(EngineError::AccountNotFound(_))
    ));
}

#[tokio::test]
async fn transaction_create_validates_sharing_against_roster() {
    let engine = engine_with_db().await;
    let account = engine.new_account("Household", None).await.unwrap();
    let alice = engine.new_owner(&account.uuid, "Alice").await.unwrap();
    let bob = engine.new_owner(&account.uuid, "Bob").await.unwrap();

    let tx = engine
        .new_transaction(
            &account.uuid,
            "Groceries",
            TransactionKind::Expense,
            MoneyCents::new(100),
            Currency::Cad,
            amounts(&[(alice.id, 40), (bob.id, 60)]),
        )
        .await
        .unwrap();
    assert_eq!(tx.amount, MoneyCents::new(100));

    // Unknown owner id is rejected, and nothing is persisted.
    let err = engine
        .new_transaction(
            &account.uuid,
            "Phantom",
            TransactionKind::Expense,
            MoneyCents::new(100),
            Currency::Cad,
            equally(&[alice.id, 9999]),
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::UnknownOwner(9999));

    let txs = engine.account_transactions(&account.uuid).await.unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].name, "Groceries");
}

#[tokio::test]
async fn transaction_create_rejects_amount_mismatch() {
    let engine = engine_with_db().await;
    let account = engine.new_account("Household", None).await.unwrap();
    let alice = engine.new_owner(&account.uuid, "Alice").await.unwrap();
    let bob = engine.new_owner(&account.uuid, "Bob").await.unwrap();

    let err = engine
        .new_transaction(
            &account.uuid,
            "Groceries",
            TransactionKind::Expense,
            MoneyCents::new(100),
            Currency::Cad,
            amounts(&[(alice.id, 40), (bob.id, 59)]),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::AmountMismatch {
            computed: 99,
            expected: 100,
        }
    );
}

#[tokio::test]
async fn transaction_round_trips_sharing_description() {
    let engine = engine_with_db().await;
    let account = engine.new_account("Household", None).await.unwrap();
    let alice = engine.new_owner(&account.uuid, "Alice").await.unwrap();
    let bob = engine.new_owner(&account.uuid, "Bob").await.unwrap();

    let sharing = SharingDescription {
        method: SharingMethod::Shares,
        entries: vec![
            ShareEntry {
                owner_id: alice.id,
                take: Some(2),
            },
            ShareEntry {
                owner_id: bob.id,
                take: Some(1),
            },
        ],
    };
    let created = engine
        .new_transaction(
            &account.uuid,
            "Rent",
            TransactionKind::Expense,
            MoneyCents::new(90_000),
            Currency::Cad,
            sharing.clone(),
        )
        .await
        .unwrap();

    let fetched = engine
        .transaction(created.id, &account.uuid)
        .await
        .unwrap();
    assert_eq!(fetched.sharing, sharing);

    let shares = fetched.sharing.allocate(fetched.amount).unwrap();
    assert_eq!(shares[0].amount, MoneyCents::new(60_000));
    assert_eq!(shares[1].amount, MoneyCents::new(30_000));
}

#[tokio::test]
async fn transaction_update_replaces_sharing_and_revalidates() {
    let engine = engine_with_db().await;
    let account = engine.new_account("Household", None).await.unwrap();
    let alice = engine.new_owner(&account.uuid, "Alice").await.unwrap();
    let bob = engine.new_owner(&account.uuid, "Bob").await.unwrap();

    let tx = engine
        .new_transaction(
            &account.uuid,
            "Dinner",
            TransactionKind::Expense,
            MoneyCents::new(6000),
            Currency::Cad,
            equally(&[alice.id, bob.id]),
        )
        .await
        .unwrap();

    // Update against the current roster succeeds and replaces the split.
    let updated = engine
        .update_transaction(
            tx.id,
            &account.uuid,
            "Dinner",
            TransactionKind::Expense,
            MoneyCents::new(6000),
            Currency::Cad,
            amounts(&[(alice.id, 4500), (bob.id, 1500)]),
        )
        .await
        .unwrap();
    assert_eq!(updated.sharing.method, SharingMethod::Amounts);

    // After removing Bob the same description no longer validates.
    engine.delete_owner(bob.id, &account.uuid).await.unwrap();
    let err = engine
        .update_transaction(
            tx.id,
            &account.uuid,
            "Dinner",
            TransactionKind::Expense,
            MoneyCents::new(6000),
            Currency::Cad,
            amounts(&[(alice.id, 4500), (bob.id, 1500)]),
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::UnknownOwner(bob.id));

    // The stored transaction is untouched by the failed update.
    let stored = engine.transaction(tx.id, &account.uuid).await.unwrap();
    assert_eq!(stored.sharing, updated.sharing);
}

#[tokio::test]
async fn transaction_delete_removes_the_row() {
    let engine = engine_with_db().await;
    let account = engine.new_account("Household", None).await.unwrap();
    let alice = engine.new_owner(&account.uuid, "Alice").await.unwrap();

    let tx = engine
        .new_transaction(
            &account.uuid,
            "Coffee",
            TransactionKind::Expense,
            MoneyCents::new(450),
            Currency::Cad,
            equally(&[alice.id]),
        )
        .await
        .unwrap();

    engine.delete_transaction(tx.id, &account.uuid).await.unwrap();
    assert_eq!(
        engine.transaction(tx.id, &account.uuid).await,
        Err(EngineError::KeyNotFound("transaction not exists".to_string()))
    );
}

#[tokio::test]
async fn account_delete_cascades() {
    let engine = engine_with_db().await;
    let account = engine.new_account("Household", None).await.unwrap();
    let alice = engine.new_owner(&account.uuid, "Alice").await.unwrap();
    engine
        .new_transaction(
            &account.uuid,
            "Coffee",
            TransactionKind::Expense,
            MoneyCents::new(450),
            Currency::Cad,
            equally(&[alice.id]),
        )
        .await
        .unwrap();

    engine.delete_account(&account.uuid).await.unwrap();
    assert!(matches!(
        engine.account(&account.uuid).await,
        Err(EngineError::AccountNotFound(_))
    ));
    assert!(matches!(
        engine.fetch_owner_ids(&account.uuid).await,
        Err(EngineError::AccountNotFound(_))
    ));
}
