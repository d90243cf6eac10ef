use std::sync::{Arc, Mutex};
use std::time::Duration;

use coretava_core::RouterChannels;
use coretava_http_manager::{
    get, post, HttpCall, HttpError, HttpFuture, HttpManager, HttpResponse, HttpTransport,
};
use tokio::runtime::Builder;

/// Answers from a fixed script and records what it was asked.
struct ScriptedTransport {
    calls: Mutex<Vec<HttpCall>>,
    fail: bool,
}

impl HttpTransport for ScriptedTransport {
    fn execute(&self, call: HttpCall) -> HttpFuture {
        let url = call.url.clone();
        self.calls.lock().unwrap().push(call);
        let fail = self.fail;
        Box::pin(async move {
            if fail {
                return Err(HttpError::new(format!("unreachable: {url}")));
            }
            Ok(HttpResponse {
                status: 200,
                headers: vec![],
                body: url.into_bytes(),
            })
        })
    }
}

#[test]
fn results_are_routed_back_as_messages() {
    let rt = Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("runtime");

    rt.block_on(async {
        let RouterChannels { router, mut app_rx } = RouterChannels::<String>::new();
        let transport = Arc::new(ScriptedTransport {
            calls: Mutex::new(Vec::new()),
            fail: false,
        });
        let manager = HttpManager::new(transport.clone());

        manager.on_effects(
            &router,
            vec![
                get("/a", |r| String::from_utf8(r.unwrap().body).unwrap()),
                post("/b", b"{}".to_vec(), |r| format!("posted {}", r.unwrap().status))
                    .with_header("gamix-app-id", "app-1"),
            ],
        );

        let mut got = Vec::new();
        for _ in 0..2 {
            let msg = tokio::time::timeout(Duration::from_secs(1), app_rx.recv())
                .await
                .expect("delivered in time")
                .expect("channel open");
            got.push(msg);
        }
        got.sort();
        assert_eq!(got, vec!["/a".to_string(), "posted 200".to_string()]);

        let calls = transport.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].body.as_deref(), Some(&b"{}"[..]));
        assert_eq!(
            calls[1].headers,
            vec![("gamix-app-id".to_string(), "app-1".to_string())]
        );
    });
}

#[test]
fn transport_failure_becomes_an_error_result() {
    let rt = Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("runtime");

    rt.block_on(async {
        let RouterChannels { router, mut app_rx } =
            RouterChannels::<Result<u16, String>>::new();
        let manager = HttpManager::new(Arc::new(ScriptedTransport {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }));

        manager.on_effects(
            &router,
            vec![get("/down", |r| r.map(|resp| resp.status).map_err(|e| e.message))],
        );

        let msg = app_rx.recv().await.expect("failure still reported");
        assert_eq!(msg, Err("unreachable: /down".to_string()));
    });
}

/// Messages need not be `Clone` to travel through the manager.
#[derive(Debug, PartialEq)]
struct Fetched(u16);

#[test]
fn non_clone_messages_are_delivered() {
    let rt = Builder::new_current_thread().build().expect("runtime");

    rt.block_on(async {
        let RouterChannels { router, mut app_rx } = RouterChannels::<Fetched>::new();
        let manager = HttpManager::new(Arc::new(ScriptedTransport {
            calls: Mutex::new(Vec::new()),
            fail: false,
        }));

        manager.on_effects(&router, vec![get("/x", |r| Fetched(r.map_or(0, |resp| resp.status)))]);
        drop(router);

        assert_eq!(app_rx.recv().await, Some(Fetched(200)));
    });
}

#[test]
fn configured_manager_reports_refused_connections() {
    let rt = Builder::new_current_thread().enable_all().build().expect("runtime");

    rt.block_on(async {
        let config = coretava_core::CoretavaConfig {
            request_timeout_ms: 2_000,
            ..Default::default()
        };
        let manager = HttpManager::from_config(&config).expect("client");
        let RouterChannels { router, mut app_rx } = RouterChannels::<bool>::new();

        // Nothing listens on the discard port.
        manager.on_effects(&router, vec![get("http://127.0.0.1:9/", |r| r.is_err())]);

        let failed = tokio::time::timeout(Duration::from_secs(5), app_rx.recv())
            .await
            .expect("answered before the deadline");
        assert_eq!(failed, Some(true));
    });
}
