use http::StatusCode;
use http::header::AUTHORIZATION;
use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder;
use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub path: String,
    pub authorization: Option<String>,
}

/// In-process stand-in for the Discord API.
///
/// Every request is recorded, then answered by `respond` which receives the
/// request path.
pub struct FakeUpstream {
    port: u16,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeUpstream {
    pub async fn spawn<F>(respond: F) -> Self
    where
        F: Fn(&str) -> (StatusCode, String) + Send + Sync + 'static,
    {
        Self::spawn_with_delay(Duration::ZERO, respond).await
    }

    pub async fn spawn_with_delay<F>(delay: Duration, respond: F) -> Self
    where
        F: Fn(&str) -> (StatusCode, String) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let port = listener.local_addr().unwrap().port();

        let respond = Arc::new(respond);
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = requests.clone();

        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let io = TokioIo::new(stream);
                let respond = respond.clone();
                let recorded = recorded.clone();

                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<Incoming>| {
                        let respond = respond.clone();
                        let recorded = recorded.clone();
                        async move {
                            let path = req.uri().path().to_string();
                            let authorization = req
                                .headers()
                                .get(AUTHORIZATION)
                                .and_then(|v| v.to_str().ok())
                                .map(String::from);
                            recorded.lock().unwrap().push(RecordedRequest {
                                path: path.clone(),
                                authorization,
                            });

                            let (status, body) = respond(&path);
                            if !delay.is_zero() {
                                tokio::time::sleep(delay).await;
                            }

                            let mut response = Response::new(Full::new(Bytes::from(body)));
                            *response.status_mut() = status;
                            Ok::<_, Infallible>(response)
                        }
                    });

                    let _ = Builder::new(TokioExecutor::new())
                        .serve_connection(io, service)
                        .await;
                });
            }
        });

        FakeUpstream { port, requests }
    }

    /// Base URL shaped like the real API, requests land on `/api/v10/users/<id>`.
    pub fn api_url(&self) -> String {
        format!("http://127.0.0.1:{}/api/v10", self.port)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}
