mod support;

use std::sync::Arc;

use tokio::sync::Barrier;

use checkin_core::conversation::ConversationTable;
use checkin_core::router::{IgnoreReason, Outcome, ReplyRouter};
use checkin_core::store::{InMemoryResponseStore, ResponseStore};
use checkin_model::{ChatId, UserId, UserProfile};

use support::{FailingStore, RecordingTransport, profile};

struct Harness {
    conversations: Arc<ConversationTable>,
    store: Arc<InMemoryResponseStore>,
    transport: Arc<RecordingTransport>,
    router: Arc<ReplyRouter>,
}

fn harness() -> Harness {
    let conversations = Arc::new(ConversationTable::new());
    let store = Arc::new(InMemoryResponseStore::new());
    let transport = Arc::new(RecordingTransport::new());
    let router = Arc::new(ReplyRouter::new(
        Arc::clone(&conversations),
        store.clone(),
        transport.clone(),
    ));
    Harness {
        conversations,
        store,
        transport,
        router,
    }
}

fn chat() -> ChatId {
    ChatId::from(42i64)
}

#[tokio::test]
async fn round_trip_records_the_reply() {
    let h = harness();
    h.conversations.open_checkin("Q1");

    let jo = UserProfile {
        id: UserId(42),
        username: Some("abc".to_string()),
        first_name: "Jo".to_string(),
        last_name: None,
    };
    let outcome = h.router.handle_text(&chat(), &jo, "42 pages").await;
    assert_eq!(outcome, Outcome::Recorded);

    let rows = h.store.list_by_user(UserId(42)).await.unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.username, "abc");
    assert_eq!(row.first_name, "Jo");
    assert_eq!(row.last_name, "");
    assert_eq!(row.question, "Q1");
    assert_eq!(row.answer, "42 pages");

    let stats = h.store.stats().await.unwrap();
    assert!(stats.total_responses >= 1);
    assert!(stats.unique_users >= 1);

    let acks = h.transport.attempted_texts();
    assert_eq!(acks.len(), 1);
    assert!(acks[0].contains("recorded"));
}

#[tokio::test]
async fn missing_username_is_recorded_as_unknown() {
    let h = harness();
    h.conversations.open_checkin("Q1");

    let outcome = h
        .router
        .handle_text(&chat(), &profile(7, None, "Sam"), "still reading")
        .await;
    assert_eq!(outcome, Outcome::Recorded);

    let rows = h.store.list_all().await.unwrap();
    assert_eq!(rows[0].username, "unknown");
}

#[tokio::test]
async fn whitespace_reply_is_ignored_and_state_kept() {
    let h = harness();
    h.conversations.open_checkin("Q1");

    let outcome = h
        .router
        .handle_text(&chat(), &profile(7, None, "Sam"), "   ")
        .await;

    assert_eq!(outcome, Outcome::Ignored(IgnoreReason::Empty));
    assert!(h.store.list_all().await.unwrap().is_empty());
    assert!(h.conversations.is_awaiting(UserId(7)));
    assert!(h.transport.attempts().is_empty());
}

#[tokio::test]
async fn reply_without_broadcast_is_not_awaiting() {
    let h = harness();

    let outcome = h
        .router
        .handle_text(&chat(), &profile(8, None, "Ada"), "hello")
        .await;

    assert_eq!(outcome, Outcome::Ignored(IgnoreReason::NotAwaiting));
    assert!(h.store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn second_reply_to_same_checkin_is_ignored() {
    let h = harness();
    h.conversations.open_checkin("Q1");
    let sam = profile(7, None, "Sam");

    assert_eq!(
        h.router.handle_text(&chat(), &sam, "first").await,
        Outcome::Recorded
    );
    assert_eq!(
        h.router.handle_text(&chat(), &sam, "second").await,
        Outcome::Ignored(IgnoreReason::NotAwaiting)
    );
    assert_eq!(h.store.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn store_failure_keeps_the_user_awaiting() {
    let conversations = Arc::new(ConversationTable::new());
    let transport = Arc::new(RecordingTransport::new());
    let failing = ReplyRouter::new(
        Arc::clone(&conversations),
        Arc::new(FailingStore),
        transport.clone(),
    );
    conversations.open_checkin("Q1");
    let sam = profile(7, None, "Sam");

    let outcome = failing.handle_text(&chat(), &sam, "lost reply?").await;
    assert_eq!(outcome, Outcome::Ignored(IgnoreReason::StoreFailed));
    assert!(conversations.is_awaiting(UserId(7)));
    // The user gets the failure notice rather than the acknowledgement.
    assert!(transport.attempted_texts()[0].contains("error saving"));

    // Resending against a healthy store now succeeds.
    let store = Arc::new(InMemoryResponseStore::new());
    let healthy = ReplyRouter::new(Arc::clone(&conversations), store.clone(), transport);
    let outcome = healthy.handle_text(&chat(), &sam, "lost reply?").await;
    assert_eq!(outcome, Outcome::Recorded);
    assert_eq!(store.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_replies_from_one_user_record_exactly_once() {
    let h = harness();
    h.conversations.open_checkin("Q1");

    let barrier = Arc::new(Barrier::new(2));
    let mut tasks = Vec::new();
    for answer in ["first", "second"] {
        let router = Arc::clone(&h.router);
        let barrier = Arc::clone(&barrier);
        tasks.push(tokio::spawn(async move {
            barrier.wait().await;
            router
                .handle_text(&chat(), &profile(7, None, "Sam"), answer)
                .await
        }));
    }

    let mut outcomes = Vec::new();
    for task in tasks {
        outcomes.push(task.await.unwrap());
    }

    let recorded = outcomes
        .iter()
        .filter(|outcome| **outcome == Outcome::Recorded)
        .count();
    assert_eq!(recorded, 1, "exactly one reply wins: {outcomes:?}");
    assert!(outcomes.contains(&Outcome::Ignored(IgnoreReason::NotAwaiting)));
    assert_eq!(h.store.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn stats_always_match_the_log_length() {
    let h = harness();

    for (user, answer) in [(1, "a"), (2, "b"), (1, "c"), (3, "d"), (2, "e")] {
        h.conversations.open_checkin("Q");
        let outcome = h
            .router
            .handle_text(&chat(), &profile(user, None, "Reader"), answer)
            .await;
        assert_eq!(outcome, Outcome::Recorded);

        let stats = h.store.stats().await.unwrap();
        let listed = h.store.list_all().await.unwrap();
        assert_eq!(stats.total_responses as usize, listed.len());
    }

    let stats = h.store.stats().await.unwrap();
    assert_eq!(stats.total_responses, 5);
    assert_eq!(stats.unique_users, 3);
}
