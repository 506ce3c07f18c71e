use mockito::Server;
use refetch::{FetchError, ReqwestTransport, get_string_with_retries};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_fetches_body_on_first_try() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/data")
        .with_status(200)
        .with_body("payload")
        .create_async()
        .await;

    let transport = ReqwestTransport::default();
    let body = get_string_with_retries(
        &transport,
        &format!("{}/data", server.url()),
        3,
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    mock.assert_async().await;
    assert_eq!(body, "payload");
}

#[tokio::test]
async fn test_exhausted_budget_reports_final_status() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/flaky")
        .with_status(503)
        .expect(3)
        .create_async()
        .await;

    let transport = ReqwestTransport::default();
    let err = get_string_with_retries(
        &transport,
        &format!("{}/flaky", server.url()),
        2,
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    mock.assert_async().await;
    match err.downcast_ref::<FetchError>() {
        Some(FetchError::Status(status)) => assert_eq!(status.as_u16(), 503),
        other => panic!("Expected Status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_max_tries_never_hits_the_server() {
    let mut server = Server::new_async().await;
    let mock = server.mock("GET", "/data").expect(0).create_async().await;

    let transport = ReqwestTransport::default();
    let err = get_string_with_retries(
        &transport,
        &format!("{}/data", server.url()),
        1,
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    mock.assert_async().await;
    assert!(matches!(
        err.downcast_ref::<FetchError>(),
        Some(FetchError::InvalidMaxTries(1))
    ));
}

#[tokio::test]
async fn test_cancelled_token_aborts_before_any_request() {
    let mut server = Server::new_async().await;
    let mock = server.mock("GET", "/data").expect(0).create_async().await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let transport = ReqwestTransport::default();
    let err = get_string_with_retries(
        &transport,
        &format!("{}/data", server.url()),
        3,
        &cancel,
    )
    .await
    .unwrap_err();

    mock.assert_async().await;
    assert!(matches!(
        err.downcast_ref::<FetchError>(),
        Some(FetchError::Cancelled)
    ));
}
