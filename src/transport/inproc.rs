//! In-process binding: a publisher and a subscriber in the same process,
//! joined by queues instead of a socket.

use std::sync::Arc;

use crate::broker::ChannelId;
use crate::client::Upstream;
use crate::socket::{PubSocket, SubSocket};

/// Connect `subscriber` to `publisher`. The subscriber's current
/// subscriptions are replayed to the new channel and applied on the
/// publisher's next publish.
pub fn connect(publisher: &mut PubSocket, subscriber: &mut SubSocket) -> ChannelId {
    let (upstream, inbox) = Upstream::channel();
    let id = publisher.attach(subscriber.inbound(), inbox);
    subscriber.attach(Arc::new(upstream));
    id
}
