//! HTTP request handlers for the flipstock API

use bytes::Bytes;
use flipstock_core::inventory::MAX_IMAGE_BYTES;
use flipstock_core::*;
use http_body_util::{BodyExt, Full, Limited};
use hyper::header::{self, HeaderMap, HeaderValue};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::convert::Infallible;
use tracing::{debug, error, info};

use crate::state::{AppState, Store};

pub type BoxBody = Full<Bytes>;

/// Bodies above this are refused before they reach a handler
pub const MAX_BODY_BYTES: usize = MAX_IMAGE_BYTES + 1;

#[derive(Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

#[derive(Deserialize)]
struct SellRequest {
    sold_price: f64,
}

/// Main request handler
pub async fn handle_request<B, S>(
    req: Request<B>,
    state: AppState<S>,
) -> std::result::Result<Response<BoxBody>, Infallible>
where
    B: hyper::body::Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    S: Store,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    debug!(%method, %path, "handling request");

    let response = if method == Method::OPTIONS {
        empty_response(StatusCode::NO_CONTENT)
    } else {
        let (parts, body) = req.into_parts();
        match route(parts, body, &state).await {
            Ok(response) => response,
            Err(e) => error_response(&e),
        }
    };

    info!(%method, %path, status = response.status().as_u16(), "request served");
    Ok(with_cors(response))
}

async fn route<B, S>(parts: Parts, body: B, state: &AppState<S>) -> Result<Response<BoxBody>>
where
    B: hyper::body::Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    S: Store,
{
    let path = parts.uri.path().to_string();
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

    match (&parts.method, segments.as_slice()) {
        (&Method::GET, ["health"]) => Ok(json_response(StatusCode::OK, json!({"status": "ok"}))),

        (&Method::POST, ["api", "public", "auth", "signup"]) => {
            let credentials: Credentials = read_json(body).await?;
            handle_signup(state, credentials).await
        }
        (&Method::POST, ["api", "public", "auth", "signin"]) => {
            let credentials: Credentials = read_json(body).await?;
            handle_signin(state, credentials).await
        }

        // Everything else under /api needs a live session
        (_, ["api", rest @ ..]) => {
            let identity = state.resolver.resolve(bearer_token(&parts.headers)?)?;
            private_route(&parts, body, state, &identity, rest).await
        }

        _ => Err(FlipstockError::NotFound),
    }
}

async fn private_route<B, S>(
    parts: &Parts,
    body: B,
    state: &AppState<S>,
    identity: &Identity,
    rest: &[&str],
) -> Result<Response<BoxBody>>
where
    B: hyper::body::Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    S: Store,
{
    let inventory = &state.inventory;

    match (&parts.method, rest) {
        (&Method::GET, ["profile"]) => Ok(json_response(
            StatusCode::OK,
            json!({
                "id": identity.id.to_string(),
                "username": identity.handle.as_str(),
            }),
        )),

        (&Method::GET, ["products"]) => {
            let products = inventory.list(identity)?;
            Ok(json_response(
                StatusCode::OK,
                Value::Array(products.iter().map(product_view).collect()),
            ))
        }
        (&Method::POST, ["products"]) => {
            let new: NewProduct = read_json(body).await?;
            let product = inventory.create(identity, new)?;
            Ok(json_response(StatusCode::CREATED, product_view(&product)))
        }

        (&Method::GET, ["products", id]) => {
            let product = inventory.get(identity, &id.parse()?)?;
            Ok(json_response(StatusCode::OK, product_view(&product)))
        }
        (&Method::PUT, ["products", id]) => {
            let update: ProductUpdate = read_json(body).await?;
            let product = inventory.update(identity, &id.parse()?, update)?;
            Ok(json_response(StatusCode::OK, product_view(&product)))
        }
        (&Method::DELETE, ["products", id]) => {
            inventory.delete(identity, &id.parse()?)?;
            Ok(json_response(
                StatusCode::OK,
                json!({"message": "Product deleted successfully"}),
            ))
        }

        (&Method::POST, ["products", id, "sell"]) => {
            let sale: SellRequest = read_json(body).await?;
            let product = inventory.sell(identity, &id.parse()?, sale.sold_price)?;
            Ok(json_response(StatusCode::OK, product_view(&product)))
        }
        (&Method::POST, ["products", id, "sales_meta"]) => {
            let meta: SalesMeta = read_json(body).await?;
            let product = inventory.set_sales_meta(identity, &id.parse()?, meta)?;
            Ok(json_response(StatusCode::OK, product_view(&product)))
        }

        (&Method::POST, ["products", id, "images"]) => {
            let product_id: ProductId = id.parse()?;
            let filename = query_param(parts, "filename").ok_or_else(|| {
                FlipstockError::InvalidInput("filename query parameter is required".to_string())
            })?;
            let content_type = parts
                .headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = read_body(body).await?;

            let image = inventory.add_image(
                identity,
                &product_id,
                NewImage {
                    filename,
                    content_type,
                    data: data.to_vec(),
                },
            )?;
            Ok(json_response(StatusCode::CREATED, image_view(&image)))
        }
        (&Method::GET, ["products", id, "images", image_id]) => {
            let (image, data) = inventory.get_image(identity, &id.parse()?, &image_id.parse()?)?;
            Ok(image_response(&image, data))
        }
        (&Method::DELETE, ["products", id, "images", image_id]) => {
            inventory.remove_image(identity, &id.parse()?, &image_id.parse()?)?;
            Ok(json_response(
                StatusCode::OK,
                json!({"message": "Image deleted successfully"}),
            ))
        }

        _ => Err(FlipstockError::NotFound),
    }
}

/// Signup hashes a credential; keep it off the reactor threads
async fn handle_signup<S: Store>(
    state: &AppState<S>,
    credentials: Credentials,
) -> Result<Response<BoxBody>> {
    let auth = state.auth.clone();
    tokio::task::spawn_blocking(move || auth.signup(&credentials.username, &credentials.password))
        .await
        .map_err(|e| FlipstockError::Internal(format!("signup task failed: {}", e)))??;

    Ok(json_response(
        StatusCode::CREATED,
        json!({"message": "User created successfully"}),
    ))
}

async fn handle_signin<S: Store>(
    state: &AppState<S>,
    credentials: Credentials,
) -> Result<Response<BoxBody>> {
    let auth = state.auth.clone();
    let token =
        tokio::task::spawn_blocking(move || auth.signin(&credentials.username, &credentials.password))
            .await
            .map_err(|e| FlipstockError::Internal(format!("signin task failed: {}", e)))??;

    Ok(json_response(
        StatusCode::OK,
        json!({"token": token.into_string()}),
    ))
}

/// Accepts `Bearer <token>` or a bare token
fn bearer_token(headers: &HeaderMap) -> Result<&str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(FlipstockError::Unauthenticated)?
        .trim_start();

    // Scheme is "bearer" in any case, followed by whitespace or nothing
    let token = match (value.get(..6), value.get(6..)) {
        (Some(scheme), Some(rest))
            if scheme.eq_ignore_ascii_case("bearer")
                && rest.chars().next().map_or(true, char::is_whitespace) =>
        {
            rest.trim()
        }
        _ => value.trim(),
    };

    if token.is_empty() {
        return Err(FlipstockError::Unauthenticated);
    }
    Ok(token)
}

fn query_param(parts: &Parts, name: &str) -> Option<String> {
    let query = parts.uri.query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

async fn read_body<B>(body: B) -> Result<Bytes>
where
    B: hyper::body::Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let collected = Limited::new(body, MAX_BODY_BYTES)
        .collect()
        .await
        .map_err(|e| FlipstockError::InvalidInput(format!("unreadable request body: {}", e)))?;
    Ok(collected.to_bytes())
}

async fn read_json<T, B>(body: B) -> Result<T>
where
    T: DeserializeOwned,
    B: hyper::body::Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let bytes = read_body(body).await?;
    serde_json::from_slice(&bytes)
        .map_err(|e| FlipstockError::InvalidInput(format!("malformed JSON body: {}", e)))
}

fn product_view(product: &Product) -> Value {
    let created_at = chrono::DateTime::from_timestamp_millis(product.created_at_ms() as i64)
        .map(|t| t.to_rfc3339());

    json!({
        "id": product.id.to_string(),
        "owner_id": product.owner_id().to_string(),
        "title": product.title,
        "description": product.description,
        "bought_price": product.bought_price,
        "target_price": product.target_price,
        "sold_price": product.sold_price,
        "sales_meta": product.sales_meta,
        "note": product.note,
        "images": product.images.iter().map(image_view).collect::<Vec<_>>(),
        "created_at": created_at,
    })
}

fn image_view(image: &ProductImage) -> Value {
    json!({
        "id": image.id.to_string(),
        "filename": image.filename,
        "content_type": image.content_type,
        "size": image.size,
        "content_hash": image.content_hash.to_hex(),
    })
}

/// HTTP status for a failed operation
pub fn status_for(err: &FlipstockError) -> StatusCode {
    match err {
        FlipstockError::InvalidInput(_) | FlipstockError::DuplicateHandle => {
            StatusCode::BAD_REQUEST
        }
        FlipstockError::InvalidCredentials
        | FlipstockError::InvalidToken
        | FlipstockError::Unauthenticated => StatusCode::UNAUTHORIZED,
        FlipstockError::NotFound => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: &FlipstockError) -> Response<BoxBody> {
    let message = if err.is_client_error() {
        err.to_string()
    } else {
        error!(error = %err, "request failed");
        "Internal server error".to_string()
    };
    json_response(status_for(err), json!({ "error": message }))
}

fn json_response(status: StatusCode, body: Value) -> Response<BoxBody> {
    let mut response = Response::new(Full::new(Bytes::from(body.to_string())));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}

fn image_response(image: &ProductImage, data: Vec<u8>) -> Response<BoxBody> {
    let content_type = HeaderValue::from_str(&image.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let length = data.len();

    let mut response = Response::new(Full::new(Bytes::from(data)));
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, content_type);
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    response
}

fn empty_response(status: StatusCode) -> Response<BoxBody> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}

fn with_cors(mut response: Response<BoxBody>) -> Response<BoxBody> {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("authorization, content-type"),
    );
    headers.insert(header::SERVER, HeaderValue::from_static("flipstock"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use flipstock_core::store::MemoryStore;
    use std::sync::Arc;

    fn state() -> AppState<MemoryStore> {
        AppState::new(&AuthConfig::for_testing(), Arc::new(MemoryStore::new())).unwrap()
    }

    async fn call(
        state: &AppState<MemoryStore>,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let req = builder
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap();

        let response = handle_request(req, state.clone()).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn signed_in(state: &AppState<MemoryStore>, username: &str) -> String {
        let creds = json!({"username": username, "password": "pw"});
        let (status, _) = call(state, Method::POST, "/api/public/auth/signup", None, creds.clone()).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = call(state, Method::POST, "/api/public/auth/signin", None, creds).await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&FlipstockError::DuplicateHandle), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&FlipstockError::InvalidInput("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_for(&FlipstockError::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(&FlipstockError::Unauthenticated), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(&FlipstockError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(&FlipstockError::Storage("disk".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        // Only service faults become 500s
        for err in [
            FlipstockError::InvalidToken,
            FlipstockError::NotFound,
            FlipstockError::Internal("bug".into()),
            FlipstockError::Config("bad".into()),
        ] {
            assert_eq!(
                err.is_client_error(),
                status_for(&err) != StatusCode::INTERNAL_SERVER_ERROR
            );
        }
    }

    #[test]
    fn test_bearer_token_forms() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_err());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("abc.def.ghi"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("bearer abc.def.ghi "));
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");

        // Scheme alone carries no token
        for scheme_only in ["Bearer   ", "Bearer", "  BEARER "] {
            headers.insert(header::AUTHORIZATION, HeaderValue::from_static(scheme_only));
            assert!(matches!(
                bearer_token(&headers),
                Err(FlipstockError::Unauthenticated)
            ));
        }
    }

    #[tokio::test]
    async fn test_internal_errors_are_generic() {
        let response = error_response(&FlipstockError::Storage("disk on fire".into()));
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Internal server error");

        let response = error_response(&FlipstockError::NotFound);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Not found");
    }

    #[tokio::test]
    async fn test_health_and_cors() {
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/products")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let response = handle_request(req, state()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            HeaderValue::from_static("*")
        );

        let (status, body) = call(&state(), Method::GET, "/health", None, Value::Null).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_signup_and_signin_statuses() {
        let state = state();
        let creds = json!({"username": "alice", "password": "pw1"});

        let (status, body) =
            call(&state, Method::POST, "/api/public/auth/signup", None, creds.clone()).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "User created successfully");

        let (status, _) = call(&state, Method::POST, "/api/public/auth/signup", None, creds).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let wrong = json!({"username": "alice", "password": "nope"});
        let (status, _) = call(&state, Method::POST, "/api/public/auth/signin", None, wrong).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let unknown = json!({"username": "nobody", "password": "pw1"});
        let (status, _) = call(&state, Method::POST, "/api/public/auth/signin", None, unknown).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let malformed = json!({"username": "alice"});
        let (status, _) = call(&state, Method::POST, "/api/public/auth/signin", None, malformed).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_private_routes_require_token() {
        let state = state();
        let (status, _) = call(&state, Method::GET, "/api/profile", None, Value::Null).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) =
            call(&state, Method::GET, "/api/products", Some("not.a.token"), Value::Null).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_profile() {
        let state = state();
        let token = signed_in(&state, "alice").await;

        let (status, body) = call(&state, Method::GET, "/api/profile", Some(&token), Value::Null).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "alice");
        assert!(body["id"].as_str().unwrap().parse::<IdentityId>().is_ok());
    }

    #[tokio::test]
    async fn test_product_lifecycle() {
        let state = state();
        let token = signed_in(&state, "alice").await;

        let new = json!({"title": "Lamp", "price": 5.0, "target_price": 25.0});
        let (status, product) =
            call(&state, Method::POST, "/api/products", Some(&token), new).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(product["bought_price"], 5.0);
        let uri = format!("/api/products/{}", product["id"].as_str().unwrap());

        let (status, updated) =
            call(&state, Method::PUT, &uri, Some(&token), json!({"note": "chipped"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["note"], "chipped");
        assert_eq!(updated["title"], "Lamp");

        let (status, sold) = call(
            &state,
            Method::POST,
            &format!("{}/sell", uri),
            Some(&token),
            json!({"sold_price": 30.0}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(sold["sold_price"], 30.0);

        let (status, meta) = call(
            &state,
            Method::POST,
            &format!("{}/sales_meta", uri),
            Some(&token),
            json!({"vinted_link": "https://vinted.example/1"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(meta["sales_meta"]["vinted_link"], "https://vinted.example/1");

        let (status, list) = call(&state, Method::GET, "/api/products", Some(&token), Value::Null).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);

        let (status, _) = call(&state, Method::DELETE, &uri, Some(&token), Value::Null).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = call(&state, Method::GET, &uri, Some(&token), Value::Null).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_foreign_product_looks_missing() {
        let state = state();
        let alice = signed_in(&state, "alice").await;
        let bob = signed_in(&state, "bob").await;

        let (_, product) = call(
            &state,
            Method::POST,
            "/api/products",
            Some(&alice),
            json!({"title": "Lamp", "price": 5.0}),
        )
        .await;
        let uri = format!("/api/products/{}", product["id"].as_str().unwrap());
        let absent = format!("/api/products/{}", ProductId::new());

        let (foreign_status, foreign_body) = call(&state, Method::GET, &uri, Some(&bob), Value::Null).await;
        let (absent_status, absent_body) = call(&state, Method::GET, &absent, Some(&bob), Value::Null).await;
        assert_eq!(foreign_status, StatusCode::NOT_FOUND);
        assert_eq!(foreign_status, absent_status);
        assert_eq!(foreign_body, absent_body);

        let (status, _) = call(&state, Method::DELETE, &uri, Some(&bob), Value::Null).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = call(&state, Method::GET, &uri, Some(&alice), Value::Null).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_image_upload_and_download() {
        let state = state();
        let token = signed_in(&state, "alice").await;
        let (_, product) = call(
            &state,
            Method::POST,
            "/api/products",
            Some(&token),
            json!({"title": "Camera", "price": 40.0}),
        )
        .await;
        let product_uri = format!("/api/products/{}", product["id"].as_str().unwrap());

        let upload = Request::builder()
            .method(Method::POST)
            .uri(format!("{}/images?filename=front%20view.png", product_uri))
            .header("authorization", format!("Bearer {}", token))
            .header("content-type", "image/png")
            .body(Full::new(Bytes::from_static(b"\x89PNG fake")))
            .unwrap();
        let response = handle_request(upload, state.clone()).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let image: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(image["filename"], "front view.png");
        assert_eq!(image["size"], 9);

        let image_uri = format!("{}/images/{}", product_uri, image["id"].as_str().unwrap());
        let download = Request::builder()
            .uri(&image_uri)
            .header("authorization", token.clone())
            .body(Full::new(Bytes::new()))
            .unwrap();
        let response = handle_request(download, state.clone()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"\x89PNG fake");

        let (status, _) = call(&state, Method::DELETE, &image_uri, Some(&token), Value::Null).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = call(&state, Method::GET, &image_uri, Some(&token), Value::Null).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_bad_product_input() {
        let state = state();
        let token = signed_in(&state, "alice").await;

        let (status, _) = call(
            &state,
            Method::POST,
            "/api/products",
            Some(&token),
            json!({"title": "  ", "price": 1.0}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            &state,
            Method::POST,
            "/api/products",
            Some(&token),
            json!({"title": "Lamp", "price": -1.0}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) =
            call(&state, Method::GET, "/api/products/not-an-id", Some(&token), Value::Null).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
