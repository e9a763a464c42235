use std::time::Duration;

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};
use tokio_tungstenite::tungstenite::{self, Message as WsMessage};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::error::{Result, TransportError};
use crate::traits::Duplex;

/// Name of the authorization request header.
pub const AUTHORIZATION: &str = "Authorization";

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A WebSocket connection carrying binary messages.
pub struct WsTransport {
    stream: WsStream,
    endpoint: String,
    closed: bool,
}

impl WsTransport {
    /// Open a WebSocket to `endpoint`, sending `headers` with the upgrade
    /// request. Fails with [`TransportError::ConnectTimeout`] if the upgrade
    /// does not complete within `timeout`.
    pub async fn connect(
        endpoint: &str,
        headers: &[(String, String)],
        timeout: Duration,
    ) -> Result<Self> {
        let mut request = endpoint
            .into_client_request()
            .map_err(|err| TransportError::InvalidRequest(format!("{endpoint}: {err}")))?;

        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|err| TransportError::InvalidRequest(format!("header {name}: {err}")))?;
            let value = HeaderValue::from_str(value).map_err(|err| {
                TransportError::InvalidRequest(format!("header {name} value: {err}"))
            })?;
            request.headers_mut().insert(name, value);
        }

        tracing::debug!(endpoint, headers = headers.len(), "opening websocket");
        let (stream, response) = match tokio::time::timeout(timeout, connect_async(request)).await
        {
            Ok(Ok(connected)) => connected,
            Ok(Err(err)) => {
                return Err(TransportError::Connect {
                    endpoint: endpoint.to_string(),
                    source: Box::new(err),
                })
            }
            Err(_) => {
                return Err(TransportError::ConnectTimeout {
                    endpoint: endpoint.to_string(),
                    timeout,
                })
            }
        };
        tracing::debug!(endpoint, status = %response.status(), "websocket upgraded");

        Ok(Self {
            stream,
            endpoint: endpoint.to_string(),
            closed: false,
        })
    }

    /// The endpoint this transport is connected to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Duplex for WsTransport {
    async fn send(&mut self, message: Bytes) -> Result<()> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.stream.send(WsMessage::Binary(message)).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<Bytes>> {
        if self.closed {
            return Ok(None);
        }
        loop {
            match self.stream.next().await {
                None => return Ok(None),
                Some(Ok(WsMessage::Binary(data))) => return Ok(Some(data)),
                Some(Ok(WsMessage::Text(text))) => {
                    return Ok(Some(Bytes::copy_from_slice(text.as_bytes())))
                }
                Some(Ok(WsMessage::Close(frame))) => {
                    tracing::debug!(endpoint = %self.endpoint, ?frame, "websocket close received");
                    return Ok(None);
                }
                // Ping/pong are answered by tungstenite itself.
                Some(Ok(_)) => continue,
                Some(Err(
                    tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed,
                )) => return Ok(None),
                Some(Err(err)) => return Err(err.into()),
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        match self.stream.close(None).await {
            Ok(())
            | Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                tracing::debug!(endpoint = %self.endpoint, "websocket closed");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl std::fmt::Debug for WsTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsTransport")
            .field("endpoint", &self.endpoint)
            .field("closed", &self.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_async;

    use super::*;

    async fn echo_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(socket).await.unwrap();
            while let Some(Ok(message)) = ws.next().await {
                if message.is_binary() {
                    ws.send(message).await.unwrap();
                } else if message.is_close() {
                    break;
                }
            }
        });
        format!("ws://{addr}")
    }

    #[tokio::test]
    async fn binary_roundtrip_and_close() {
        let endpoint = echo_server().await;
        let mut transport = WsTransport::connect(&endpoint, &[], Duration::from_secs(5))
            .await
            .unwrap();

        transport.send(Bytes::from_static(b"\x11\x10\x10\x00")).await.unwrap();
        let echoed = transport.recv().await.unwrap().unwrap();
        assert_eq!(echoed.as_ref(), b"\x11\x10\x10\x00");

        transport.close().await.unwrap();
        transport.close().await.unwrap();
        assert!(transport.recv().await.unwrap().is_none());
        assert!(matches!(
            transport.send(Bytes::new()).await,
            Err(TransportError::Closed)
        ));
    }

    #[tokio::test]
    async fn connect_refused_is_connect_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = WsTransport::connect(&format!("ws://{addr}"), &[], Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Connect { .. }));
    }

    #[tokio::test]
    async fn connect_times_out_when_upgrade_stalls() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _hold = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let err = WsTransport::connect(&format!("ws://{addr}"), &[], Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::ConnectTimeout { .. }));
    }

    #[tokio::test]
    async fn rejects_invalid_header_value() {
        let headers = vec![(AUTHORIZATION.to_string(), "bad\nvalue".to_string())];
        let err = WsTransport::connect("ws://127.0.0.1:1", &headers, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn rejects_malformed_endpoint() {
        let err = WsTransport::connect("not a url", &[], Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidRequest(_)));
    }
}
