use axum::{
    Router,
    routing::{get, post},
};

use std::sync::Arc;

use crate::{accounts, owners, transactions};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/accounts", post(accounts::create))
        .route(
            "/accounts/{account_uuid}",
            get(accounts::get)
                .patch(accounts::update)
                .delete(accounts::delete),
        )
        .route(
            "/accounts/{account_uuid}/owners",
            get(owners::list).post(owners::create),
        )
        .route(
            "/accounts/{account_uuid}/owners/{id}",
            get(owners::get).patch(owners::update).delete(owners::delete),
        )
        .route(
            "/accounts/{account_uuid}/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route(
            "/accounts/{account_uuid}/transactions/{id}",
            get(transactions::get)
                .patch(transactions::update)
                .delete(transactions::delete),
        )
        .with_state(state)
}

pub async fn run(engine: Engine) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use http_body_util::BodyExt;
    use migration::MigratorTrait;
    use sea_orm::Database;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn test_router() -> Router {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let engine = Engine::builder().database(db).build();
        router(ServerState {
            engine: Arc::new(engine),
        })
    }

    async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        let request = match body {
            Some(body) => request.body(Body::from(body.to_string())).unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn transaction_flow_over_http() {
        let router = test_router().await;

        let (status, account) = send(
            &router,
            "POST",
            "/accounts",
            Some(json!({"name": "Trip", "default_currency": "CAD"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let uuid = account["account_uuid"].as_str().unwrap().to_string();

        let (_, alice) = send(
            &router,
            "POST",
            &format!("/accounts/{uuid}/owners"),
            Some(json!({"name": "Alice"})),
        )
        .await;
        let (_, bob) = send(
            &router,
            "POST",
            &format!("/accounts/{uuid}/owners"),
            Some(json!({"name": "Bob"})),
        )
        .await;
        let (alice_id, bob_id) = (alice["id"].as_i64().unwrap(), bob["id"].as_i64().unwrap());

        let (status, tx) = send(
            &router,
            "POST",
            &format!("/accounts/{uuid}/transactions"),
            Some(json!({
                "name": "Groceries",
                "kind": "expense",
                "amount_minor": 100,
                "currency": "CAD",
                "sharing_info": {
                    "method": "equally",
                    "shared_with": [{"id": alice_id}, {"id": bob_id}],
                },
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            tx["allocation"],
            json!([
                {"owner_id": alice_id, "amount_minor": 50},
                {"owner_id": bob_id, "amount_minor": 50},
            ])
        );

        let (status, listing) = send(
            &router,
            "GET",
            &format!("/accounts/{uuid}/transactions"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listing["transactions"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_sharing_maps_to_422() {
        let router = test_router().await;

        let (_, account) = send(
            &router,
            "POST",
            "/accounts",
            Some(json!({"name": "Trip", "default_currency": null})),
        )
        .await;
        let uuid = account["account_uuid"].as_str().unwrap().to_string();

        let (_, alice) = send(
            &router,
            "POST",
            &format!("/accounts/{uuid}/owners"),
            Some(json!({"name": "Alice"})),
        )
        .await;
        let alice_id = alice["id"].as_i64().unwrap();

        // Take provided for an equally split.
        let (status, body) = send(
            &router,
            "POST",
            &format!("/accounts/{uuid}/transactions"),
            Some(json!({
                "name": "Bad",
                "amount_minor": 100,
                "currency": "CAD",
                "sharing_info": {
                    "method": "equally",
                    "shared_with": [{"id": alice_id, "take": 5}],
                },
            })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("take"));

        // Unknown owner id.
        let (status, _) = send(
            &router,
            "POST",
            &format!("/accounts/{uuid}/transactions"),
            Some(json!({
                "name": "Bad",
                "amount_minor": 100,
                "currency": "CAD",
                "sharing_info": {
                    "method": "equally",
                    "shared_with": [{"id": 9999}],
                },
            })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn missing_account_maps_to_404() {
        let router = test_router().await;
        let (status, _) = send(&router, "GET", "/accounts/nope/owners", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
