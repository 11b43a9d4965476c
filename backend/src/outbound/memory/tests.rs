//! Behavioural tests for the in-memory store.

use chrono::{TimeDelta, TimeZone};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::{
    EmailAddress, ImageRef, MessageText, PasswordHash, PostcardDraft, StampDraft, StampOrigin,
    StampPrompt,
};

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 6, hour, minute, 0)
        .single()
        .expect("valid instant")
}

#[fixture]
fn store() -> InMemoryStore {
    InMemoryStore::new()
}

fn account_with(username: &str, email: &str) -> UserAccount {
    UserAccount {
        user: User::new(
            UserId::random(),
            Username::new(username).expect("username"),
            EmailAddress::new(email).expect("email"),
            false,
            at(9, 0),
        ),
        password_hash: PasswordHash::from_encoded(String::from("$argon2id$stub")),
    }
}

fn account(username: &str) -> UserAccount {
    account_with(username, &format!("{username}@example.com"))
}

fn postcard(sender: UserId, recipient: UserId, now: DateTime<Utc>) -> Postcard {
    PostcardDraft::try_new(
        sender,
        recipient,
        MessageText::new("Hello").expect("message"),
        Vec::new(),
    )
    .expect("draft")
    .schedule(PostcardId::random(), now)
}

async fn send(store: &InMemoryStore, postcard: &Postcard) {
    store
        .insert_with_contacts(postcard, &ContactEdge::pair_for(postcard))
        .await
        .expect("send");
}

fn stamp(name: &str, created_at: DateTime<Utc>) -> Stamp {
    StampDraft::try_new(
        name,
        "",
        ImageRef::new("https://cdn.example.com/stamp.png").expect("image"),
    )
    .expect("draft")
    .into_direct(StampId::random(), created_at)
}

fn pending(now: DateTime<Utc>) -> StampRequest {
    StampRequest::submit(
        StampRequestId::random(),
        StampPrompt::new("a heron at dusk").expect("prompt"),
        UserId::random(),
        now,
    )
}

#[rstest]
#[tokio::test]
async fn usernames_are_unique_ignoring_case(store: InMemoryStore) {
    UserRepository::insert(&store, &account("Alice"))
        .await
        .expect("first");
    let clash = account_with("alice", "other@example.com");

    let error = UserRepository::insert(&store, &clash)
        .await
        .expect_err("duplicate");

    assert_eq!(error, UserRepositoryError::duplicate_username("alice"));
}

#[rstest]
#[tokio::test]
async fn emails_are_unique(store: InMemoryStore) {
    let first = account("alice");
    UserRepository::insert(&store, &first)
        .await
        .expect("first");
    let second = account_with("alicia", first.user.email().as_ref());

    let error = UserRepository::insert(&store, &second)
        .await
        .expect_err("duplicate");

    assert_eq!(error, UserRepositoryError::duplicate_email());
}

#[rstest]
#[tokio::test]
async fn lookup_by_username_ignores_case(store: InMemoryStore) {
    let alice = account("Alice");
    UserRepository::insert(&store, &alice)
        .await
        .expect("insert");

    let found = store
        .find_by_username(&Username::new("ALICE").expect("username"))
        .await
        .expect("lookup");

    assert_eq!(found.map(|a| *a.user.id()), Some(*alice.user.id()));
}

#[rstest]
#[tokio::test]
async fn search_is_sorted_capped_and_excludes_caller(store: InMemoryStore) {
    let caller = account("bob");
    UserRepository::insert(&store, &caller)
        .await
        .expect("caller");
    for name in ["bobby", "Bobcat", "robert", "alice"] {
        UserRepository::insert(&store, &account(name))
            .await
            .expect("insert");
    }

    let hits = store
        .search("BOB", caller.user.id(), 10)
        .await
        .expect("search");
    let names: Vec<&str> = hits.iter().map(|hit| hit.username.as_ref()).collect();
    assert_eq!(names, ["Bobcat", "bobby"]);

    let capped = store
        .search("b", caller.user.id(), 1)
        .await
        .expect("search");
    assert_eq!(capped.len(), 1);
}

#[rstest]
#[tokio::test]
async fn send_records_both_contact_directions(store: InMemoryStore) {
    let alice = UserId::random();
    let bob = UserId::random();
    let first = postcard(alice, bob, at(10, 0));
    let reply = postcard(bob, alice, at(11, 0));

    send(&store, &first).await;
    send(&store, &reply).await;

    let alice_view = store.list_for_owner(&alice).await.expect("alice");
    let bob_view = store.list_for_owner(&bob).await.expect("bob");
    assert_eq!(alice_view.len(), 1);
    assert_eq!(bob_view.len(), 1);
    assert_eq!(alice_view[0].counterpart, bob);
    assert_eq!(bob_view[0].counterpart, alice);
    assert_eq!(alice_view[0].last_postcard_at, at(11, 0));
    assert_eq!(bob_view[0].last_postcard_at, at(11, 0));
    assert_eq!(alice_view[0].postcard_ids, vec![first.id, reply.id]);
    assert_eq!(bob_view[0].postcard_ids, alice_view[0].postcard_ids);
}

#[rstest]
#[tokio::test]
async fn contacts_are_newest_first(store: InMemoryStore) {
    let alice = UserId::random();
    let bob = UserId::random();
    let carol = UserId::random();
    send(&store, &postcard(alice, bob, at(8, 0))).await;
    send(&store, &postcard(alice, carol, at(9, 0))).await;

    let contacts = store.list_for_owner(&alice).await.expect("contacts");

    let counterparts: Vec<UserId> = contacts.iter().map(|c| c.counterpart).collect();
    assert_eq!(counterparts, vec![carol, bob]);
}

#[rstest]
#[tokio::test]
async fn sweep_delivers_due_postcards_once(store: InMemoryStore) {
    let alice = UserId::random();
    let bob = UserId::random();
    let card = postcard(alice, bob, at(10, 0));
    send(&store, &card).await;

    assert_eq!(store.deliver_due(at(18, 29)).await.expect("early"), 0);
    assert!(store.list_delivered_to(&bob).await.expect("inbox").is_empty());

    assert_eq!(store.deliver_due(at(19, 0)).await.expect("sweep"), 1);
    assert_eq!(store.deliver_due(at(19, 5)).await.expect("again"), 0);

    let inbox = store.list_delivered_to(&bob).await.expect("inbox");
    assert_eq!(inbox.len(), 1);
    assert!(inbox[0].delivered);
    assert_eq!(inbox[0].delivered_at, Some(at(19, 0)));
    assert!(store.list_delivered_to(&alice).await.expect("outbox").is_empty());
}

#[rstest]
#[tokio::test]
async fn sweep_delivers_past_and_exactly_due_postcards_only(store: InMemoryStore) {
    let alice = UserId::random();
    let bob = UserId::random();
    let past = postcard(alice, bob, at(10, 0) - TimeDelta::days(1));
    let exactly_now = postcard(alice, bob, at(10, 0));
    let future = postcard(alice, bob, at(19, 0));
    for card in [&past, &exactly_now, &future] {
        send(&store, card).await;
    }
    let now = exactly_now.delivery_date;
    assert!(past.delivery_date < now);
    assert!(future.delivery_date > now);

    assert_eq!(store.deliver_due(now).await.expect("sweep"), 2);

    let mut delivered: Vec<PostcardId> = store
        .list_delivered_to(&bob)
        .await
        .expect("inbox")
        .into_iter()
        .map(|card| card.id)
        .collect();
    delivered.sort_by_key(|id| *id.as_uuid());
    let mut expected = vec![past.id, exactly_now.id];
    expected.sort_by_key(|id| *id.as_uuid());
    assert_eq!(delivered, expected);
}

#[rstest]
#[tokio::test]
async fn contact_timestamp_follows_the_latest_write(store: InMemoryStore) {
    let alice = UserId::random();
    let bob = UserId::random();
    send(&store, &postcard(alice, bob, at(10, 5))).await;
    send(&store, &postcard(alice, bob, at(10, 0))).await;

    let contacts = store.list_for_owner(&bob).await.expect("contacts");
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].last_postcard_at, at(10, 0));
    assert_eq!(contacts[0].postcard_ids.len(), 2);
}

#[rstest]
#[tokio::test]
async fn inbox_orders_by_delivery_then_creation(store: InMemoryStore) {
    let alice = UserId::random();
    let bob = UserId::random();
    let morning = postcard(alice, bob, at(9, 0));
    let noon = postcard(alice, bob, at(12, 0));
    let next_day = postcard(alice, bob, at(19, 0));
    for card in [&morning, &noon, &next_day] {
        send(&store, card).await;
    }

    store
        .deliver_due(at(19, 0) + TimeDelta::days(1))
        .await
        .expect("sweep");

    let ids: Vec<PostcardId> = store
        .list_delivered_to(&bob)
        .await
        .expect("inbox")
        .into_iter()
        .map(|card| card.id)
        .collect();
    assert_eq!(ids, vec![next_day.id, noon.id, morning.id]);
}

#[rstest]
#[tokio::test]
async fn shop_lists_only_approved_stamps(store: InMemoryStore) {
    let request = pending(at(8, 0));
    StampRequestRepository::insert(&store, &request)
        .await
        .expect("request");
    StampRepository::insert(&store, &stamp("direct", at(9, 0)))
        .await
        .expect("direct");
    let promoted = StampDraft::try_new(
        "heron",
        "",
        ImageRef::new("https://cdn.example.com/heron.png").expect("image"),
    )
    .expect("draft")
    .into_promoted(
        StampId::random(),
        StampOrigin {
            request_id: request.id,
            prompt: String::from("a heron at dusk"),
            submitted_by: request.submitted_by,
        },
        at(10, 0),
    );
    store
        .insert_promoted(&promoted, &request.id)
        .await
        .expect("promote");

    let shop = store.list_approved().await.expect("shop");
    let all = store.list_all().await.expect("all");

    assert_eq!(shop, vec![promoted.clone()]);
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, promoted.id);
    let stored = StampRequestRepository::find_by_id(&store, &request.id)
        .await
        .expect("lookup")
        .expect("present");
    assert_eq!(stored.status, StampRequestStatus::Approved);
    assert_eq!(stored.stamp_id, Some(promoted.id));
}

#[rstest]
#[tokio::test]
async fn promotion_of_decided_request_writes_nothing(store: InMemoryStore) {
    let request = pending(at(8, 0));
    StampRequestRepository::insert(&store, &request)
        .await
        .expect("request");
    store
        .decide(&request.id, StampRequestStatus::Rejected)
        .await
        .expect("reject")
        .expect("was pending");
    let candidate = stamp("late", at(9, 0));

    let error = store
        .insert_promoted(&candidate, &request.id)
        .await
        .expect_err("not pending");

    assert!(matches!(error, StampRepositoryError::RequestNotPending { .. }));
    assert!(store.list_all().await.expect("all").is_empty());
}

#[rstest]
#[tokio::test]
async fn decide_only_moves_pending_requests(store: InMemoryStore) {
    let request = pending(at(8, 0));
    StampRequestRepository::insert(&store, &request)
        .await
        .expect("request");

    let approved = store
        .decide(&request.id, StampRequestStatus::Approved)
        .await
        .expect("decide");
    let again = store
        .decide(&request.id, StampRequestStatus::Rejected)
        .await
        .expect("decide");

    assert_eq!(approved.map(|r| r.status), Some(StampRequestStatus::Approved));
    assert!(again.is_none());
    assert!(store.list_pending().await.expect("pending").is_empty());
}

#[rstest]
#[tokio::test]
async fn concurrent_collects_insert_exactly_once(store: InMemoryStore) {
    let user = UserId::random();
    let owl = stamp("owl", at(8, 0));
    StampRepository::insert(&store, &owl).await.expect("stamp");
    let entry = CollectionEntry {
        user_id: user,
        stamp_id: owl.id,
        collected_at: at(9, 0),
    };

    let attempts = (0..16).map(|_| {
        let store = store.clone();
        tokio::spawn(async move { store.insert_if_absent(&entry).await })
    });
    let outcomes = futures::future::join_all(attempts).await;

    let inserted = outcomes
        .into_iter()
        .map(|joined| joined.expect("task").expect("insert"))
        .filter(|outcome| *outcome == CollectOutcome::Inserted)
        .count();
    assert_eq!(inserted, 1);
    let collected = store.list_for_user(&user).await.expect("collected");
    assert_eq!(collected.len(), 1);
    assert_eq!(collected[0].stamp.id, owl.id);
}
