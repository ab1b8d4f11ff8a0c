//! Programmatic invocation against a live adapter.

use std::sync::{Arc, Mutex};

use rest_adapter::config::{AdapterConfig, RestConfig};
use rest_adapter::error::RemoteError;
use rest_adapter::registry::hook_fn;
use rest_adapter::{ClientError, RemoteClient};
use serde_json::{json, Value};

mod common;

use common::{spawn, widget_registry};

fn http() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

async fn connected(addr: std::net::SocketAddr, config: RestConfig) -> RemoteClient {
    // The client describes the same classes; its handlers are never called.
    let mut client = RemoteClient::new(widget_registry(), config).with_http_client(http());
    client.connect(&format!("http://{addr}")).unwrap();
    client
}

#[tokio::test]
async fn test_invoke_static_and_prototype_methods() {
    let (addr, shutdown) = spawn(AdapterConfig::default(), widget_registry()).await;
    let client = connected(addr, RestConfig::default()).await;

    let created = client
        .invoke("Widget.create", vec![], vec![json!({ "name": "gear" })])
        .await
        .unwrap();
    assert_eq!(created, vec![json!({ "name": "gear", "id": 1 }), json!(201)]);

    let updated = client
        .invoke(
            "Widget.prototype.updateAttributes",
            vec![json!(1)],
            vec![json!({ "name": "cog" })],
        )
        .await
        .unwrap();
    assert_eq!(updated, vec![json!({ "name": "cog", "id": 1 })]);

    let count = client.invoke("Widget.count", vec![], vec![]).await.unwrap();
    assert_eq!(count, vec![json!(1)]);

    let found = client
        .invoke("Widget.find", vec![], vec![json!({ "limit": 5 }), Value::Null])
        .await
        .unwrap();
    assert_eq!(found, vec![json!([{ "name": "cog", "id": 1 }])]);

    let err = client
        .invoke("Widget.findById", vec![], vec![json!(99)])
        .await
        .unwrap_err();
    match err {
        ClientError::Remote(err) => {
            assert_eq!(err.status_code, 404);
            assert_eq!(err.code.as_deref(), Some("MODEL_NOT_FOUND"));
        }
        other => panic!("unexpected error: {other}"),
    }

    shutdown.trigger();
}

#[tokio::test]
async fn test_credential_resolution() {
    let seen = Arc::new(Mutex::new(Vec::<Option<String>>::new()));
    let objects = widget_registry();
    let recorder = seen.clone();
    objects.before(
        "Widget.find",
        hook_fn(move |ctx| {
            let auth = ctx
                .request()
                .and_then(|r| r.header("authorization"))
                .map(str::to_string);
            recorder.lock().unwrap().push(auth);
            Ok(())
        }),
    );
    let (addr, shutdown) = spawn(AdapterConfig::default(), objects).await;
    let options = json!({ "accessToken": "per-call" });

    // Pass-through off: the per-call token is ignored.
    let client = connected(addr, RestConfig::default()).await;
    client
        .invoke("Widget.find", vec![], vec![Value::Null, options.clone()])
        .await
        .unwrap();

    // Pass-through on: the per-call token is sent.
    let config = RestConfig {
        pass_access_token: true,
        ..Default::default()
    };
    let mut client = connected(addr, config).await;
    client
        .invoke("Widget.find", vec![], vec![Value::Null, options.clone()])
        .await
        .unwrap();

    // A global credential always wins.
    client.set_auth(Some("global".into()));
    client
        .invoke("Widget.find", vec![], vec![Value::Null, options])
        .await
        .unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![None, Some("per-call".to_string()), Some("global".to_string())]
    );
    shutdown.trigger();
}

#[tokio::test]
async fn test_client_side_hooks_run() {
    let (addr, shutdown) = spawn(AdapterConfig::default(), widget_registry()).await;
    let client_objects = widget_registry();
    client_objects.before(
        "Widget.*",
        hook_fn(|_ctx| Err(RemoteError::unauthorized("blocked locally"))),
    );
    let mut client =
        RemoteClient::new(client_objects, RestConfig::default()).with_http_client(http());
    client.connect(&format!("http://{addr}")).unwrap();

    let err = client.invoke("Widget.count", vec![], vec![]).await.unwrap_err();
    assert!(matches!(err, ClientError::Remote(e) if e.status_code == 401));
    shutdown.trigger();
}
