//! `PostgreSQL` tests for user persistence.

use rstest::rstest;
use taskboard::user::{
    domain::EmailAddress,
    ports::{UserRepository, UserRepositoryError},
};

use crate::postgres::helpers::{BoxError, PostgresContext, context};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_user_is_found_by_email_and_id(
    #[future] context: Result<PostgresContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context.await?;
    let stored = ctx.owner("grace@example.com").await?;

    let by_email = ctx
        .users
        .find_by_email(&EmailAddress::new("Grace@Example.com")?)
        .await?
        .ok_or("user missing by email")?;
    let by_id = ctx
        .users
        .find_by_id(stored.id())
        .await?
        .ok_or("user missing by id")?;

    assert_eq!(by_email.id(), stored.id());
    assert_eq!(by_id.email(), stored.email());
    assert_eq!(by_id.password_hash(), stored.password_hash());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_duplicate_email_is_rejected(
    #[future] context: Result<PostgresContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context.await?;
    ctx.owner("grace@example.com").await?;

    let second = ctx.owner("grace@example.com").await;

    let error = second.err().ok_or("second registration should fail")?;
    assert!(matches!(
        error.downcast_ref::<UserRepositoryError>(),
        Some(UserRepositoryError::DuplicateEmail(email)) if email.as_str() == "grace@example.com"
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_list_returns_every_user(
    #[future] context: Result<PostgresContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context.await?;
    let first = ctx.owner("grace@example.com").await?;
    let second = ctx.owner("ada@example.com").await?;

    let mut ids: Vec<_> = ctx.users.list().await?.iter().map(|user| user.id()).collect();
    ids.sort();
    let mut expected = vec![first.id(), second.id()];
    expected.sort();

    assert_eq!(ids, expected);
    Ok(())
}
