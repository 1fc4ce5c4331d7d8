use command_framework::{
    CommandAttributes, CommandHandler, CommandRequest, CommandService, DispatchConfig, ErrorKind,
    HandlerError, HandlerRegistry, ResponseEnvelope,
};
use command_sample::model::{PersonalizedInfo, PersonalizedInfoChange, PersonalizedInfoPatch};
use command_sample::personalized_infos::{PersonalizedInfosHandler, RESOURCE_NAME};
use command_sample::store::mock::{create_mock_store, expect_apply, expect_get};
use command_sample::store::{StoreClient, StoreError};
use std::time::Duration;

fn service_over(store: StoreClient<PersonalizedInfo>, timeout: Duration) -> CommandService {
    let mut registry = HandlerRegistry::new();
    registry
        .register_handler(RESOURCE_NAME, move |ctx| {
            PersonalizedInfosHandler::for_request(store.clone(), ctx)
        })
        .unwrap();
    let config = DispatchConfig {
        default_timeout: timeout,
        ..DispatchConfig::default()
    };
    CommandService::new(registry, config)
}

#[tokio::test]
async fn test_patch_sends_only_present_fields() {
    let (client, mut requests) = create_mock_store::<PersonalizedInfo>(4);
    let handler = PersonalizedInfosHandler::new(client, "weave");

    let call = tokio::spawn(async move {
        handler
            .patch(
                CommandAttributes::new()
                    .with("id", "kitchen")
                    .with("location", "Kitchen"),
            )
            .await
    });

    let (id, change, respond_to) = expect_apply(&mut requests)
        .await
        .expect("Expected Apply request");
    assert_eq!(id, "kitchen");
    assert_eq!(
        change,
        PersonalizedInfoChange::Patch(PersonalizedInfoPatch {
            location: Some("Kitchen".to_string()),
            ..Default::default()
        })
    );
    respond_to
        .send(Ok(PersonalizedInfo {
            location: "Kitchen".to_string(),
            ..PersonalizedInfo::new("kitchen")
        }))
        .unwrap();

    let resource = call.await.unwrap().unwrap();
    assert_eq!(resource.id(), Some("kitchen"));
    assert_eq!(resource.kind(), Some("weave#personalizedInfo"));
}

#[tokio::test]
async fn test_invalid_attributes_never_reach_store() {
    let (client, mut requests) = create_mock_store::<PersonalizedInfo>(4);
    let handler = PersonalizedInfosHandler::new(client, "weave");

    let err = handler
        .update(CommandAttributes::new().with("name", 3))
        .await
        .unwrap_err();
    assert!(err.is_business());

    drop(handler);
    assert!(requests.recv().await.is_none());
}

#[tokio::test]
async fn test_store_not_found_is_business() {
    let (client, mut requests) = create_mock_store::<PersonalizedInfo>(4);
    let handler = PersonalizedInfosHandler::new(client, "weave");

    let call = tokio::spawn(async move {
        handler
            .update(CommandAttributes::new().with("id", "attic"))
            .await
    });
    let (_, _, respond_to) = expect_apply(&mut requests).await.unwrap();
    respond_to
        .send(Err(StoreError::NotFound("attic".to_string())))
        .unwrap();

    let err = call.await.unwrap().unwrap_err();
    assert!(matches!(err, HandlerError::Business { ref code, .. } if code == "notFound"));
}

#[tokio::test]
async fn test_dropped_store_reply_is_generic_internal_error() {
    let (client, mut requests) = create_mock_store::<PersonalizedInfo>(4);
    let service = service_over(client, Duration::from_secs(5));

    let store = tokio::spawn(async move {
        let (_, respond_to) = expect_get(&mut requests).await.unwrap();
        drop(respond_to);
        requests
    });

    let envelope = service
        .execute(CommandRequest::new("PersonalizedInfos", "Get"))
        .await;
    assert_eq!(envelope, ResponseEnvelope::internal());
    assert!(!envelope.message().unwrap().contains("Dropped"));
    drop(store.await.unwrap());
}

#[tokio::test]
async fn test_stalled_store_times_out() {
    let (client, mut requests) = create_mock_store::<PersonalizedInfo>(4);
    let service = service_over(client, Duration::from_millis(30));

    let envelope = service
        .execute(CommandRequest::new("PersonalizedInfos", "Get"))
        .await;
    assert_eq!(envelope.error_kind(), Some(ErrorKind::Timeout));

    // The request reached the store, but the aborted handler no longer waits on it.
    let (_, mut respond_to) = expect_get(&mut requests).await.unwrap();
    tokio::time::timeout(Duration::from_secs(1), respond_to.closed())
        .await
        .expect("aborted handler still holds the reply channel");
}
