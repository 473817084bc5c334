//! Page walker behavior over scripted and in-memory backends.

use account_client_app::{AccountError, AccountService};
use account_client_domain::{PaginationOptions, UserField, UserFilter};
use account_client_shared::FieldBag;
use account_client_testkit::fixtures::sample_users;
use account_client_testkit::{InMemoryAccountBackend, ScriptedTransport};
use futures_util::StreamExt;
use proptest::prelude::*;
use serde_json::{Value, json};
use std::sync::Arc;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn page(ids: &[&str], page: u32, pages: u32) -> Value {
    json!({ "result": {
        "docs": ids.iter().map(|id| json!({ "_id": id })).collect::<Vec<_>>(),
        "total": 25,
        "limit": 10,
        "page": page,
        "pages": pages,
        "offset": 0
    }})
}

#[tokio::test]
async fn walks_every_page_with_one_request_each() -> TestResult {
    let backend = Arc::new(InMemoryAccountBackend::with_users(sample_users(25)));
    let service = AccountService::new(backend.clone());

    let mut search = service.search(
        UserFilter::all(),
        [UserField::Id, UserField::Email],
        PaginationOptions::new().with_limit(10),
    )?;
    assert!(backend.requests().is_empty());

    let mut sizes = Vec::new();
    while let Some(page) = search.next_page().await? {
        sizes.push(page.docs().len());
    }
    assert_eq!(sizes, vec![10, 10, 5]);
    assert!(!search.has_next());

    let requests = backend.requests();
    assert_eq!(requests.len(), 3);
    let pages: Vec<_> = requests
        .iter()
        .map(|request| request.variables["pagination"]["page"].clone())
        .collect();
    assert_eq!(pages, vec![json!(1), json!(2), json!(3)]);
    Ok(())
}

#[tokio::test]
async fn offset_and_limit_carry_to_every_page() -> TestResult {
    let backend = Arc::new(InMemoryAccountBackend::with_users(sample_users(25)));
    let mut search = AccountService::new(backend.clone()).search(
        UserFilter::all(),
        [UserField::Id],
        PaginationOptions::new().with_offset(3).with_limit(10),
    )?;

    let mut sizes = Vec::new();
    while let Some(page) = search.next_page().await? {
        sizes.push(page.docs().len());
    }
    assert_eq!(sizes, vec![10, 10, 2]);

    let paginations: Vec<_> = backend
        .requests()
        .iter()
        .map(|request| request.variables["pagination"].clone())
        .collect();
    assert_eq!(
        paginations,
        vec![
            json!({ "page": 1, "offset": 3, "limit": 10 }),
            json!({ "page": 2, "offset": 3, "limit": 10 }),
            json!({ "page": 3, "offset": 3, "limit": 10 }),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn filter_and_projection_stay_fixed() -> TestResult {
    let backend = Arc::new(InMemoryAccountBackend::with_users(sample_users(40)));
    let users = AccountService::new(backend.clone())
        .search(
            FieldBag::from_value(json!({ "deleted": false, "createdAt": { "gte": "2018-06-25" } }))
                .unwrap_or_default(),
            [UserField::Email],
            PaginationOptions::new().with_limit(10),
        )?
        .collect_users()
        .await?;

    let expected = sample_users(40)
        .into_iter()
        .enumerate()
        .filter(|(index, user)| *index >= 5 && user.deleted == Some(false))
        .count();
    assert_eq!(users.len(), expected);
    assert!(users.iter().all(|user| user.id.is_none() && user.email.is_some()));

    let requests = backend.requests();
    let first = requests.first().ok_or("no request recorded")?;
    assert!(requests.iter().all(|request| {
        request.query == first.query && request.variables["filters"] == first.variables["filters"]
    }));
    assert_eq!(
        first.variables["filters"]["createdAt"],
        json!({ "gte": "2018-06-25T00:00:00.000Z" })
    );
    Ok(())
}

#[tokio::test]
async fn empty_result_yields_nothing() -> TestResult {
    let backend = Arc::new(InMemoryAccountBackend::new());
    let mut search = AccountService::new(backend.clone()).search(
        UserFilter::all(),
        [UserField::Id],
        PaginationOptions::new(),
    )?;

    assert!(search.has_next());
    assert!(search.next_page().await?.is_none());
    assert!(!search.has_next());
    assert!(search.next_page().await?.is_none());
    assert_eq!(backend.request_count(), 1);
    Ok(())
}

#[tokio::test]
async fn arguments_are_validated_before_the_first_pull() {
    let transport = Arc::new(ScriptedTransport::new());
    let error = AccountService::new(transport.clone())
        .search(UserFilter::all(), [UserField::Id], PaginationOptions::new().with_limit(7))
        .err();

    assert!(error.is_some_and(|error| error.has_constraint("limit", "isIn")));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn an_error_ends_the_walk() -> TestResult {
    let transport = Arc::new(
        ScriptedTransport::new()
            .with_data(page(&["5b2a4f6e8d1c3e0012345678"], 1, 3))
            .with_graphql_errors(500, &["Internal"])
            .with_data(page(&["5b2a4f6e8d1c3e0012345679"], 3, 3)),
    );
    let mut search = AccountService::new(transport.clone()).search(
        UserFilter::all(),
        [UserField::Id],
        PaginationOptions::new().with_limit(10),
    )?;

    assert!(search.next_page().await?.is_some());
    let error = search.next_page().await.err();
    assert!(error.is_some_and(|error| error.has_remote_error("Internal")));
    assert!(!search.has_next());
    assert!(search.next_page().await?.is_none());
    assert_eq!(transport.requests().len(), 2);
    assert_eq!(transport.remaining(), 1);
    Ok(())
}

#[tokio::test]
async fn empty_terminal_page_is_not_produced() -> TestResult {
    let transport = Arc::new(
        ScriptedTransport::new()
            .with_data(page(&["5b2a4f6e8d1c3e0012345678"], 1, 2))
            .with_data(page(&[], 2, 2)),
    );
    let users = AccountService::new(transport.clone())
        .search(UserFilter::all(), [UserField::Id], PaginationOptions::new())?
        .collect_users()
        .await?;

    assert_eq!(users.len(), 1);
    assert_eq!(transport.requests().len(), 2);
    Ok(())
}

#[tokio::test]
async fn stream_matches_manual_walk() -> TestResult {
    let backend = Arc::new(InMemoryAccountBackend::with_users(sample_users(23)));
    let pages: Vec<_> = AccountService::new(backend)
        .search(UserFilter::all(), [UserField::Id], PaginationOptions::new().with_limit(10))?
        .into_stream()
        .collect()
        .await;

    let sizes = pages
        .into_iter()
        .map(|page| page.map(|page| page.docs().len()))
        .collect::<Result<Vec<_>, AccountError>>()?;
    assert_eq!(sizes, vec![10, 10, 3]);
    Ok(())
}

#[tokio::test]
async fn stream_ends_after_error() -> TestResult {
    let transport = Arc::new(ScriptedTransport::new().with_graphql_errors(400, &["Bad"]));
    let items: Vec<_> = AccountService::new(transport)
        .search(UserFilter::all(), [UserField::Id], PaginationOptions::new())?
        .into_stream()
        .collect()
        .await;

    assert_eq!(items.len(), 1);
    assert!(items.first().is_some_and(Result::is_err));
    Ok(())
}

proptest! {
    #[test]
    fn walk_terminates_after_ceil_pages(
        count in 1usize..120,
        limit in prop::sample::select(vec![10u32, 25, 50, 100, 150]),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .map_err(|error| TestCaseError::fail(error.to_string()))?;
        let backend = Arc::new(InMemoryAccountBackend::with_users(sample_users(count)));
        let service = AccountService::new(backend.clone());

        let sizes = runtime
            .block_on(async {
                let mut search = service.search(
                    UserFilter::all(),
                    [UserField::Id],
                    PaginationOptions::new().with_limit(limit),
                )?;
                let mut sizes = Vec::new();
                while let Some(page) = search.next_page().await? {
                    sizes.push(page.docs().len());
                }
                Ok::<_, AccountError>(sizes)
            })
            .map_err(|error| TestCaseError::fail(error.to_string()))?;

        let per_page = limit as usize;
        let expected_pages = count.div_ceil(per_page);
        let last = match count % per_page {
            0 => per_page,
            rest => rest,
        };
        prop_assert_eq!(sizes.len(), expected_pages);
        prop_assert_eq!(sizes.last().copied(), Some(last));
        prop_assert_eq!(sizes.iter().sum::<usize>(), count);
        prop_assert_eq!(backend.request_count(), expected_pages);
    }
}
