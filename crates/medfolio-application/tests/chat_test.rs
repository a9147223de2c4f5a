mod support;

use medfolio_application::views::{CHAT_FALLBACK_REPLY, ChatPane};
use medfolio_core::api::ApiError;
use medfolio_core::chat::ChatRole;
use medfolio_core::MedfolioError;
use support::MockBackend;

const TOKEN: &str = "tok";

#[tokio::test]
async fn test_exchange_appends_user_then_assistant() {
    let backend = MockBackend::with_user("asha@example.com", "s3cret", TOKEN);
    let pane = ChatPane::new();

    let reply = pane.send(backend.as_ref(), TOKEN, "Hello").await.unwrap();
    assert_eq!(reply.content, "Hi there");

    let messages = pane.messages().await;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, ChatRole::User);
    assert_eq!(messages[0].content, "Hello");
    assert_eq!(messages[1].role, ChatRole::Assistant);
    assert_eq!(messages[1].content, "Hi there");
    assert!(!pane.is_sending());
}

#[tokio::test]
async fn test_failure_appends_a_single_fallback_reply() {
    let backend = MockBackend::with_user("asha@example.com", "s3cret", TOKEN);
    backend.fail_chat(ApiError::transport("Could not reach the server"));
    let pane = ChatPane::new();

    let reply = pane.send(backend.as_ref(), TOKEN, "Hello").await.unwrap();
    assert_eq!(reply.content, CHAT_FALLBACK_REPLY);

    let messages = pane.messages().await;
    assert_eq!(messages.len(), 2);
    let assistant: Vec<_> = messages
        .iter()
        .filter(|message| message.role == ChatRole::Assistant)
        .collect();
    assert_eq!(assistant.len(), 1);
    assert_eq!(assistant[0].content, CHAT_FALLBACK_REPLY);
}

#[tokio::test]
async fn test_blank_message_is_not_sent() {
    let backend = MockBackend::with_user("asha@example.com", "s3cret", TOKEN);
    let pane = ChatPane::new();

    let err = pane.send(backend.as_ref(), TOKEN, "  ").await.unwrap_err();
    assert!(matches!(err, MedfolioError::InvalidInput(_)));
    assert!(backend.calls().is_empty());
    assert!(pane.messages().await.is_empty());
}

#[tokio::test]
async fn test_transcript_accumulates_across_exchanges() {
    let backend = MockBackend::with_user("asha@example.com", "s3cret", TOKEN);
    let pane = ChatPane::new();

    pane.send(backend.as_ref(), TOKEN, "Hello").await.unwrap();
    backend.set_chat_reply("You take **Metformin** twice daily.");
    pane.send(backend.as_ref(), TOKEN, "What do I take?").await.unwrap();

    let contents: Vec<String> = pane
        .messages()
        .await
        .into_iter()
        .map(|message| message.content)
        .collect();
    assert_eq!(
        contents,
        vec![
            "Hello".to_string(),
            "Hi there".to_string(),
            "What do I take?".to_string(),
            "You take **Metformin** twice daily.".to_string(),
        ]
    );
}
