pub mod failover;
pub mod mailgun;
pub mod mandrill;
pub mod registry;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{DeliveryOutcome, MessagePayload};

pub use failover::{deliver, deliver_with_report, FailoverReport, FailoverState};
pub use mailgun::MailgunProvider;
pub use mandrill::MandrillProvider;
pub use registry::ProviderRegistry;

/// A delivery backend that can carry one message per call
#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Deliver `payload` and report what the provider answered.
    ///
    /// `payload` has already passed [`MessagePayload::from_value`]. Non-2xx
    /// answers are outcomes, not errors. `Err` is reserved for a malformed body
    /// and for failing to reach the provider.
    async fn send(&self, payload: &MessagePayload) -> Result<DeliveryOutcome>;

    /// Configured provider name
    fn name(&self) -> &str;
}

/// Status and raw body of a provider response; headers are not inspected.
pub(crate) async fn read_outcome(response: reqwest::Response) -> Result<DeliveryOutcome> {
    let status = response.status().as_u16();
    let body = response.text().await?;
    Ok(DeliveryOutcome::new(status, body))
}

/// In-process provider endpoints for tests
#[cfg(test)]
pub(crate) mod stub {
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use axum::body::Bytes;
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use tokio::net::TcpListener;

    /// A request as seen by the stub
    #[derive(Debug, Clone)]
    pub struct Received {
        pub headers: HeaderMap,
        pub body: String,
    }

    #[derive(Clone)]
    struct StubState {
        status: u16,
        reply: String,
        received: Arc<Mutex<Vec<Received>>>,
    }

    /// Answers every POST to `/send` with a fixed status and body
    pub struct StubProvider {
        pub url: String,
        received: Arc<Mutex<Vec<Received>>>,
    }

    impl StubProvider {
        pub async fn start(status: u16, reply: &str) -> Self {
            let received = Arc::new(Mutex::new(Vec::new()));
            let state = StubState {
                status,
                reply: reply.to_string(),
                received: received.clone(),
            };

            let app = Router::new()
                .route("/send", post(handle))
                .with_state(state);

            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr: SocketAddr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            Self {
                url: format!("http://{}/send", addr),
                received,
            }
        }

        pub fn hits(&self) -> usize {
            self.received.lock().unwrap().len()
        }

        pub fn received(&self) -> Vec<Received> {
            self.received.lock().unwrap().clone()
        }
    }

    async fn handle(
        State(state): State<StubState>,
        headers: HeaderMap,
        body: Bytes,
    ) -> (StatusCode, String) {
        state.received.lock().unwrap().push(Received {
            headers,
            body: String::from_utf8_lossy(&body).into_owned(),
        });
        (
            StatusCode::from_u16(state.status).unwrap(),
            state.reply.clone(),
        )
    }

    /// A URL on a port nothing listens on
    pub async fn unreachable_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}/send", addr)
    }
}
