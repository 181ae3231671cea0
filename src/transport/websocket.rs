use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::spawn;
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, connect_async};
use tracing::{debug, info, warn};
use tungstenite::protocol::Message as WsMessage;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::client::{Connection, Frame, Upstream, pipe};
use crate::socket::{PubSocket, SubSocket};
use crate::transport::message::{decode_message, encode_message};
use crate::utils::error::Result;

fn lock(publisher: &Mutex<PubSocket>) -> MutexGuard<'_, PubSocket> {
    publisher.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Bind `addr` and serve subscribers of `publisher` until the listener fails.
pub async fn start_websocket_server(
    addr: &str,
    publisher: Arc<Mutex<PubSocket>>,
    send_capacity: usize,
) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "WebSocket publisher listening");
    serve(listener, publisher, send_capacity).await
}

/// Accept subscribers on an already bound listener. Each connection becomes
/// one channel of `publisher`: binary WebSocket messages from the peer are
/// control frames, and matched messages go back as encoded data frames.
pub async fn serve(
    listener: TcpListener,
    publisher: Arc<Mutex<PubSocket>>,
    send_capacity: usize,
) -> Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        let publisher = publisher.clone();
        spawn(async move {
            if let Err(e) = handle_subscriber(stream, publisher, send_capacity).await {
                warn!(%peer, error = %e, "subscriber connection failed");
            }
        });
    }
}

async fn handle_subscriber(
    stream: TcpStream,
    publisher: Arc<Mutex<PubSocket>>,
    send_capacity: usize,
) -> Result<()> {
    let ws_stream = accept_async(stream).await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let (client, mut rx) = pipe(send_capacity);
    let (control_tx, control_rx) = mpsc::unbounded_channel::<Frame>();
    let channel_id = lock(&publisher).attach(Arc::new(client), control_rx);

    let send_id = channel_id.clone();
    let send_task = spawn(async move {
        while let Some(frame) = rx.recv().await {
            let Frame::Message(msg) = frame else {
                continue;
            };
            if let Err(e) = ws_sender.send(WsMessage::binary(encode_message(&msg))).await {
                warn!(channel = %send_id, error = %e, "failed to send message");
                return;
            }
        }
        // The channel is gone, either detached by the publisher or after the
        // peer hung up.
        let _ = ws_sender.close().await;
        debug!(channel = %send_id, "send loop closed");
    });

    loop {
        tokio::select! {
            msg = ws_receiver.next() => {
                let Some(Ok(msg)) = msg else {
                    break;
                };
                match msg {
                    WsMessage::Binary(frame) => {
                        if control_tx.send(Frame::Control(frame)).is_err() {
                            break;
                        }
                    }
                    WsMessage::Close(_) => break,
                    WsMessage::Ping(_) | WsMessage::Pong(_) => {}
                    other => {
                        warn!(channel = %channel_id, kind = ?other, "non-binary message ignored");
                    }
                }
            }
            // The publisher drops the inbox when it terminates the peer.
            _ = control_tx.closed() => {
                info!(channel = %channel_id, "channel terminated by publisher, closing connection");
                break;
            }
        }
    }

    lock(&publisher).detach(&channel_id);
    let _ = send_task.await;
    info!(channel = %channel_id, "subscriber disconnected");
    Ok(())
}

/// Connect `subscriber` to the WebSocket publisher at `url`. Current
/// subscriptions are replayed; later ones are forwarded as they happen.
pub async fn connect_subscriber(url: &str, subscriber: &mut SubSocket) -> Result<()> {
    let (ws_stream, _) = connect_async(url).await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (upstream, mut control_rx) = Upstream::channel();
    let inbound = subscriber.inbound();
    let upstream_id = upstream.id.clone();

    let control_task = spawn(async move {
        while let Some(frame) = control_rx.recv().await {
            let Frame::Control(frame) = frame else {
                continue;
            };
            if let Err(e) = ws_sender.send(WsMessage::binary(frame)).await {
                warn!(upstream = %upstream_id, error = %e, "failed to send control frame");
                break;
            }
        }
        let _ = ws_sender.close().await;
    });

    spawn(async move {
        while let Some(Ok(msg)) = ws_receiver.next().await {
            match msg {
                WsMessage::Binary(frame) => match decode_message(frame) {
                    Ok(msg) => {
                        inbound.send(Frame::Message(msg));
                    }
                    Err(e) => {
                        warn!(error = %e, "malformed data frame, closing");
                        break;
                    }
                },
                WsMessage::Close(_) => break,
                _ => {}
            }
        }
        // Dropping the control queue closes the upstream and the inbound
        // sender goes with this task.
        control_task.abort();
        debug!("receive loop closed");
    });

    subscriber.attach(Arc::new(upstream));
    info!(url, "connected to publisher");
    Ok(())
}
