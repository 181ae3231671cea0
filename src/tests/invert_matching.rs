//! One publisher, two subscribers with disjoint prefixes, first with normal
//! matching and then with invert matching enabled on all three sockets.

use std::time::Duration;

use crate::socket::{PubSocket, SubSocket};
use crate::transport::inproc;

const SILENCE: Duration = Duration::from_millis(100);
const PATIENCE: Duration = Duration::from_secs(1);

async fn expect_message(sub: &mut SubSocket, topic: &[u8], payload: &[u8]) {
    let msg = sub
        .recv_timeout(PATIENCE)
        .await
        .expect("subscriber should have received a message");
    assert_eq!(msg.topic.as_ref(), topic);
    assert_eq!(msg.payload.as_ref(), payload);
}

async fn expect_silence(sub: &mut SubSocket) {
    assert_eq!(sub.recv_timeout(SILENCE).await, None);
}

#[tokio::test]
async fn test_prefix_isolation_then_invert() {
    let mut publisher = PubSocket::default();
    let mut sub1 = SubSocket::default();
    let mut sub2 = SubSocket::default();
    inproc::connect(&mut publisher, &mut sub1);
    inproc::connect(&mut publisher, &mut sub2);

    sub1.subscribe("prefix1");
    sub2.subscribe("p2");

    let report = publisher.publish("prefix1", "test1");
    assert_eq!(report.delivered, 1);
    expect_message(&mut sub1, b"prefix1", b"test1").await;
    expect_silence(&mut sub2).await;

    let report = publisher.publish("p2", "test2");
    assert_eq!(report.delivered, 1);
    expect_message(&mut sub2, b"p2", b"test2").await;
    expect_silence(&mut sub1).await;

    publisher.set_invert_matching(true);
    sub1.set_invert_matching(true);
    sub2.set_invert_matching(true);

    let report = publisher.publish("prefix1", "test1");
    assert_eq!(report.delivered, 1);
    expect_message(&mut sub2, b"prefix1", b"test1").await;
    expect_silence(&mut sub1).await;

    let report = publisher.publish("p2", "test2");
    assert_eq!(report.delivered, 1);
    expect_message(&mut sub1, b"p2", b"test2").await;
    expect_silence(&mut sub2).await;

    let stats = publisher.stats();
    assert_eq!(stats.published, 4);
    assert_eq!(stats.delivered, 4);
    assert_eq!(stats.zero_match_publishes, 0);
}

#[tokio::test]
async fn test_subscribe_before_connect_is_replayed() {
    let mut publisher = PubSocket::default();
    let mut sub1 = SubSocket::default();
    let mut sub2 = SubSocket::default();
    sub1.subscribe("prefix1");
    sub2.subscribe("p2");
    inproc::connect(&mut publisher, &mut sub1);
    inproc::connect(&mut publisher, &mut sub2);

    publisher.publish("prefix1.more", "x");
    expect_message(&mut sub1, b"prefix1.more", b"x").await;
    expect_silence(&mut sub2).await;
}

#[tokio::test]
async fn test_invert_on_publisher_only_reaches_nobody() {
    let mut publisher = PubSocket::default();
    let mut sub1 = SubSocket::default();
    let mut sub2 = SubSocket::default();
    inproc::connect(&mut publisher, &mut sub1);
    inproc::connect(&mut publisher, &mut sub2);
    sub1.subscribe("prefix1");
    sub2.subscribe("p2");

    publisher.set_invert_matching(true);
    let report = publisher.publish("prefix1", "test1");
    assert_eq!(report.delivered, 1);

    // sub2 got it on the wire but its non-inverted filter rejects it.
    expect_silence(&mut sub1).await;
    expect_silence(&mut sub2).await;
    assert_eq!(sub2.filtered(), 1);
}
