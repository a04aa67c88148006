#![allow(clippy::disallowed_methods)]

mod common;

use std::error::Error;

use db::{DbError, ItemRepository};
use list_core::{ItemStore, MAX_ITEM_LEN, StoreError, ValidationError};

#[tokio::test]
async fn test_item_repository() -> Result<(), Box<dyn Error>> {
    let db_conn = common::setup_db().await?;
    let repo = ItemRepository::new(db_conn);

    // create: trims and stores
    let milk = repo.create("  milk ").await?;
    assert_eq!(milk.text, "milk");
    assert_eq!(repo.count().await?, 1);

    // create: validation happens before the database is touched
    let empty = repo.create("   ").await;
    assert!(matches!(empty, Err(DbError::Validation(ValidationError::Empty))));

    let too_long = repo.create(&"x".repeat(MAX_ITEM_LEN + 1)).await;
    assert!(matches!(
        too_long,
        Err(DbError::Validation(ValidationError::TooLong { .. }))
    ));
    assert_eq!(repo.count().await?, 1);

    // list_recent: newest `limit`, returned oldest first
    repo.create("eggs").await?;
    repo.create("bread").await?;
    repo.create("butter").await?;

    let all = repo.list_recent(10).await?;
    let texts: Vec<&str> = all.iter().map(|i| i.text.as_str()).collect();
    assert_eq!(texts, ["milk", "eggs", "bread", "butter"]);

    let latest_two = repo.list_recent(2).await?;
    let texts: Vec<&str> = latest_two.iter().map(|i| i.text.as_str()).collect();
    assert_eq!(texts, ["bread", "butter"]);

    assert!(repo.list_recent(0).await?.is_empty());

    // ids and timestamps never go backwards
    for pair in all.windows(2) {
        assert!(pair[0].id < pair[1].id);
        assert!(pair[0].created_at <= pair[1].created_at);
    }

    Ok(())
}

#[tokio::test]
async fn test_store_trait_maps_errors() -> Result<(), Box<dyn Error>> {
    let db_conn = common::setup_db().await?;
    let store: Box<dyn ItemStore> = Box::new(ItemRepository::new(db_conn));

    let item = store.append("coffee").await?;
    assert_eq!(item.text, "coffee");

    let rejected = store.append("").await;
    assert!(matches!(
        rejected,
        Err(StoreError::Validation(ValidationError::Empty))
    ));

    let listed = store.list_recent(5).await?;
    assert_eq!(listed, vec![item]);

    Ok(())
}

#[tokio::test]
async fn test_created_text_is_persisted() -> Result<(), Box<dyn Error>> {
    let db_conn = common::setup_db().await?;
    let repo = ItemRepository::new(db_conn);

    let created = {
        let raw = format!("  {}  ", "oat milk");
        repo.create(&raw).await?
    };
    assert_eq!(created.text, "oat milk");

    let listed = repo.list_recent(1).await?;
    assert_eq!(listed, vec![created]);
    assert_eq!(repo.count().await?, 1);

    Ok(())
}
