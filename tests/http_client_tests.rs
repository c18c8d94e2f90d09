use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::IntoResponse,
};
use reqwest::StatusCode as ReqwestStatus;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use url::Url;
use vertexbatch::BatchError;
use vertexbatch::gcs::{GcsClient, GcsUri, ObjectStore, find_predictions};
use vertexbatch::google_oauth::{StaticToken, TokenSource};
use vertexbatch::vertex::{BatchJobService, VertexBatchClient};
use vertexbatch_schema::{CreateBatchPredictionJob, JobState};

type Responder = Arc<dyn Fn(&Captured) -> (StatusCode, Vec<u8>) + Send + Sync>;

#[derive(Clone)]
struct CaptureState {
    reqs: Arc<Mutex<Vec<Captured>>>,
    respond: Responder,
}

#[derive(Debug, Clone)]
struct Captured {
    method: Method,
    path: String,
    query: String,
    headers: HeaderMap,
    body: Vec<u8>,
}

async fn capture(
    State(state): State<CaptureState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let captured = Captured {
        method,
        path: uri.path().to_string(),
        query: uri.query().unwrap_or("").to_string(),
        headers,
        body: body.to_vec(),
    };
    let (status, body) = (state.respond)(&captured);
    state.reqs.lock().unwrap().push(captured);
    (status, [(header::CONTENT_TYPE, "application/json")], body)
}

async fn spawn_test_server<F>(respond: F) -> (Url, Arc<Mutex<Vec<Captured>>>)
where
    F: Fn(&Captured) -> (StatusCode, Vec<u8>) + Send + Sync + 'static,
{
    let reqs = Arc::new(Mutex::new(Vec::new()));
    let state = CaptureState {
        reqs: reqs.clone(),
        respond: Arc::new(respond),
    };
    let app = Router::new().fallback(capture).with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let base = Url::parse(&format!("http://{addr}")).expect("valid base url");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });

    (base, reqs)
}

fn ok_json(value: &Value) -> (StatusCode, Vec<u8>) {
    (StatusCode::OK, serde_json::to_vec(value).unwrap())
}

fn tokens() -> Arc<dyn TokenSource> {
    Arc::new(StaticToken::new("test-token"))
}

fn bearer(req: &Captured) -> &str {
    req.headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

#[tokio::test]
async fn gcs_upload_posts_media_with_encoded_name() {
    let (base, reqs) = spawn_test_server(|_| ok_json(&json!({ "name": "ignored" }))).await;
    let store = GcsClient::new(reqwest::Client::new(), tokens(), base);

    let dest: GcsUri = "gs://b/batch-prediction-input/prompts.jsonl".parse().unwrap();
    store
        .upload(&dest, b"{\"request\":{}}\n".to_vec())
        .await
        .expect("upload");

    let reqs = reqs.lock().unwrap();
    assert_eq!(reqs.len(), 1);
    let req = &reqs[0];
    assert_eq!(req.method, Method::POST);
    assert_eq!(req.path, "/upload/storage/v1/b/b/o");
    assert_eq!(
        req.query,
        "uploadType=media&name=batch-prediction-input%2Fprompts.jsonl"
    );
    assert_eq!(bearer(req), "Bearer test-token");
    assert_eq!(req.body, b"{\"request\":{}}\n");
}

#[tokio::test]
async fn gcs_list_follows_page_tokens() {
    let (base, reqs) = spawn_test_server(|req| {
        if req.query.contains("pageToken=t2") {
            ok_json(&json!({
                "items": [{ "name": "out/dir/000002/predictions.jsonl", "bucket": "b" }]
            }))
        } else {
            ok_json(&json!({
                "items": [
                    { "name": "out/dir/000001/predictions.jsonl", "bucket": "b" },
                    { "name": "out/dir/000001/errors.jsonl", "bucket": "b" }
                ],
                "nextPageToken": "t2"
            }))
        }
    })
    .await;
    let store = GcsClient::new(reqwest::Client::new(), tokens(), base);

    let output_dir: GcsUri = "gs://b/out/dir".parse().unwrap();
    let found = find_predictions(&store, &output_dir)
        .await
        .expect("list");

    let names: Vec<String> = found.iter().map(ToString::to_string).collect();
    assert_eq!(
        names,
        vec![
            "gs://b/out/dir/000001/predictions.jsonl",
            "gs://b/out/dir/000002/predictions.jsonl",
        ]
    );

    let reqs = reqs.lock().unwrap();
    assert_eq!(reqs.len(), 2);
    assert_eq!(reqs[0].method, Method::GET);
    assert_eq!(reqs[0].path, "/storage/v1/b/b/o");
    assert!(reqs[0].query.starts_with("prefix=out%2Fdir%2F&"));
    assert!(!reqs[0].query.contains("pageToken"));
    assert!(reqs[1].query.ends_with("pageToken=t2"));
}

#[tokio::test]
async fn gcs_download_uses_alt_media_and_encoded_object() {
    let (base, reqs) =
        spawn_test_server(|_| (StatusCode::OK, b"line one\nline two\n".to_vec())).await;
    let store = GcsClient::new(reqwest::Client::new(), tokens(), base);

    let src: GcsUri = "gs://b/out/dir/000001/predictions.jsonl".parse().unwrap();
    let bytes = store.download(&src).await.expect("download");

    assert_eq!(bytes, b"line one\nline two\n");
    let reqs = reqs.lock().unwrap();
    assert_eq!(
        reqs[0].path,
        "/storage/v1/b/b/o/out%2Fdir%2F000001%2Fpredictions.jsonl"
    );
    assert_eq!(reqs[0].query, "alt=media");
}

#[tokio::test]
async fn gcs_errors_map_to_upstream_variants() {
    let (base, _reqs) = spawn_test_server(|req| {
        if req.method == Method::POST {
            (
                StatusCode::FORBIDDEN,
                serde_json::to_vec(&json!({
                    "error": { "code": 403, "message": "no access to bucket b" }
                }))
                .unwrap(),
            )
        } else {
            (StatusCode::INTERNAL_SERVER_ERROR, b"oops".to_vec())
        }
    })
    .await;
    let store = GcsClient::new(reqwest::Client::new(), tokens(), base);
    let uri: GcsUri = "gs://b/x".parse().unwrap();

    match store.upload(&uri, Vec::new()).await {
        Err(BatchError::UpstreamMapped { status, body }) => {
            assert_eq!(status, ReqwestStatus::FORBIDDEN);
            assert_eq!(body.code, 403);
            assert_eq!(body.message, "no access to bucket b");
        }
        other => panic!("unexpected result: {other:?}"),
    }

    match store.download(&uri).await {
        Err(BatchError::UpstreamFallback { status, body }) => {
            assert_eq!(status, ReqwestStatus::INTERNAL_SERVER_ERROR);
            assert_eq!(body, "oops");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn vertex_create_and_get_hit_regional_resource_paths() {
    let (base, reqs) = spawn_test_server(|req| {
        let state = if req.method == Method::POST {
            "JOB_STATE_PENDING"
        } else {
            "JOB_STATE_SUCCEEDED"
        };
        ok_json(&json!({
            "name": "projects/p/locations/us-central1/batchPredictionJobs/42",
            "displayName": "batch-prediction-x",
            "state": state,
            "outputInfo": { "gcsOutputDirectory": "gs://b/batch-prediction-output/prediction-1" }
        }))
    })
    .await;
    let jobs = VertexBatchClient::new(reqwest::Client::new(), tokens(), base, "p", "us-central1");

    let request = CreateBatchPredictionJob::jsonl(
        "batch-prediction-x",
        "publishers/google/models/gemini-2.5-pro",
        "gs://b/batch-prediction-input/prompts.jsonl",
        "gs://b/batch-prediction-output/",
    );
    let created = jobs.create(&request).await.expect("create");
    assert_eq!(created.state, JobState::Pending);
    assert_eq!(created.job_id(), "42");

    let fetched = jobs.get(&created.name).await.expect("get");
    assert_eq!(fetched.state, JobState::Succeeded);
    assert_eq!(
        fetched.output_directory(),
        Some("gs://b/batch-prediction-output/prediction-1")
    );

    let reqs = reqs.lock().unwrap();
    assert_eq!(reqs.len(), 2);
    assert_eq!(reqs[0].method, Method::POST);
    assert_eq!(
        reqs[0].path,
        "/v1/projects/p/locations/us-central1/batchPredictionJobs"
    );
    assert_eq!(bearer(&reqs[0]), "Bearer test-token");
    let sent: Value = serde_json::from_slice(&reqs[0].body).unwrap();
    assert_eq!(sent["displayName"], "batch-prediction-x");
    assert_eq!(sent["inputConfig"]["instancesFormat"], "jsonl");
    assert_eq!(sent["outputConfig"]["predictionsFormat"], "jsonl");

    assert_eq!(reqs[1].method, Method::GET);
    assert_eq!(
        reqs[1].path,
        "/v1/projects/p/locations/us-central1/batchPredictionJobs/42"
    );
}

#[tokio::test]
async fn vertex_error_envelope_is_mapped() {
    let (base, _reqs) = spawn_test_server(|_| {
        (
            StatusCode::BAD_REQUEST,
            serde_json::to_vec(&json!({
                "error": {
                    "code": 400,
                    "message": "Model publishers/google/models/nope is not found.",
                    "status": "INVALID_ARGUMENT"
                }
            }))
            .unwrap(),
        )
    })
    .await;
    let jobs = VertexBatchClient::new(reqwest::Client::new(), tokens(), base, "p", "us-central1");
    let request = CreateBatchPredictionJob::jsonl("n", "publishers/google/models/nope", "gs://b/i", "gs://b/o/");

    match jobs.create(&request).await {
        Err(BatchError::UpstreamMapped { status, body }) => {
            assert_eq!(status, ReqwestStatus::BAD_REQUEST);
            assert_eq!(body.status, "INVALID_ARGUMENT");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}
