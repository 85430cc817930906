use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use video_transcriber::pipeline::{AudioSettings, Orchestrator};
use video_transcriber::server::{build_router, AppState};
use video_transcriber::transcribe::{
    RecognitionAlternative, RecognitionConfig, RecognitionSegment, SpeechRecognizer,
};
use video_transcriber::{Config, MediaSource, ObjectStore, Result, TranscriberError, WordTiming};

const SRT: &str = "1\n00:00:01,000 --> 00:00:02,000\nHello <b>world</b>\n\n2\n00:00:03,000 --> 00:00:04,000\nFoo  bar\n";

#[derive(Default)]
struct FakeSource {
    subtitles: Option<&'static str>,
    subtitle_calls: AtomicUsize,
    download_calls: AtomicUsize,
}

#[async_trait::async_trait]
impl MediaSource for FakeSource {
    async fn fetch_subtitles(&self, _url: &str, lang: &str, work_dir: &Path) -> Result<Option<PathBuf>> {
        self.subtitle_calls.fetch_add(1, Ordering::SeqCst);
        match self.subtitles {
            Some(content) => {
                let path = work_dir.join(format!("subs_fake.{}.srt", lang));
                fs_err::write(&path, content)?;
                Ok(Some(path))
            }
            None => Ok(None),
        }
    }

    async fn download_audio(&self, _url: &str, work_dir: &Path) -> Result<PathBuf> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        let path = work_dir.join("audio_fake.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec)?;
        for _ in 0..(20 * 16000) {
            writer.write_sample(0i16)?;
        }
        writer.finalize()?;
        Ok(path)
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

#[derive(Default)]
struct FakeStore {
    fail_put: bool,
    objects: Mutex<HashSet<String>>,
    put_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

#[async_trait::async_trait]
impl ObjectStore for FakeStore {
    async fn put(&self, key: &str, _local_file: &Path) -> Result<String> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_put {
            return Err(TranscriberError::Upload("bucket unreachable".to_string()).into());
        }
        self.objects.lock().unwrap().insert(key.to_string());
        Ok(format!("s3://fake/{}", key))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.objects.lock().unwrap().contains(key))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }
}

#[derive(Default)]
struct FakeRecognizer {
    time_out: bool,
}

#[async_trait::async_trait]
impl SpeechRecognizer for FakeRecognizer {
    async fn submit(&self, _locator: &str, _config: &RecognitionConfig) -> Result<String> {
        Ok("job-1".to_string())
    }

    async fn await_result(&self, _job_id: &str, timeout: Duration) -> Result<Vec<RecognitionSegment>> {
        if self.time_out {
            return Err(TranscriberError::Timeout(timeout.as_secs()).into());
        }
        Ok(vec![RecognitionSegment {
            alternatives: vec![RecognitionAlternative {
                transcript: "Hola a todos.".to_string(),
                confidence: Some(0.9),
                words: vec![
                    WordTiming::new("Hola", 0.0, 0.3),
                    WordTiming::new("a", 0.3, 0.4),
                    WordTiming::new("todos.", 0.4, 0.8),
                ],
            }],
        }])
    }
}

struct Harness {
    app: Router,
    source: Arc<FakeSource>,
    store: Arc<FakeStore>,
    work_dir: tempfile::TempDir,
    _frontend: tempfile::TempDir,
}

fn harness(source: FakeSource, store: FakeStore, recognizer: FakeRecognizer) -> Harness {
    let work_dir = tempfile::tempdir().unwrap();
    let frontend = tempfile::tempdir().unwrap();
    fs_err::write(frontend.path().join("index.html"), "<h1>Video Transcriber</h1>").unwrap();

    let source = Arc::new(source);
    let store = Arc::new(store);

    let settings = AudioSettings {
        work_dir: work_dir.path().to_path_buf(),
        trim_offset_secs: 18.0,
        key_prefix: None,
        recognition: RecognitionConfig::from_config(&Config::default().cloud.transcription),
        max_wait: Duration::from_secs(900),
    };
    let orchestrator = Orchestrator::new(
        source.clone() as Arc<dyn MediaSource>,
        store.clone() as Arc<dyn ObjectStore>,
        Arc::new(recognizer),
        settings,
    );

    let state = AppState::new(Arc::new(orchestrator), "es", frontend.path().to_path_buf());

    Harness {
        app: build_router(state),
        source,
        store,
        work_dir,
        _frontend: frontend,
    }
}

fn bundled_frontend_app() -> Router {
    let work_dir = std::env::temp_dir();
    let settings = AudioSettings {
        work_dir,
        trim_offset_secs: 18.0,
        key_prefix: None,
        recognition: RecognitionConfig::from_config(&Config::default().cloud.transcription),
        max_wait: Duration::from_secs(900),
    };
    let orchestrator = Orchestrator::new(
        Arc::new(FakeSource::default()),
        Arc::new(FakeStore::default()),
        Arc::new(FakeRecognizer::default()),
        settings,
    );
    let frontend = Path::new(env!("CARGO_MANIFEST_DIR")).join("frontend");
    build_router(AppState::new(Arc::new(orchestrator), "es", frontend))
}

async fn get_text(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8_lossy(&body).into_owned())
}

async fn post_transcribe(app: Router, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/transcribir")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn leftover_files(dir: &Path) -> Vec<PathBuf> {
    fs_err::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect()
}

#[tokio::test]
async fn test_healthz() {
    let h = harness(FakeSource::default(), FakeStore::default(), FakeRecognizer::default());

    let response = h
        .app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, serde_json::json!({"ok": true}));
}

#[tokio::test]
async fn test_index_serves_front_end() {
    let h = harness(FakeSource::default(), FakeStore::default(), FakeRecognizer::default());

    let response = h
        .app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(String::from_utf8_lossy(&body).contains("Video Transcriber"));
}

#[tokio::test]
async fn test_missing_url_is_rejected_without_work() {
    let h = harness(FakeSource::default(), FakeStore::default(), FakeRecognizer::default());

    let (status, json) = post_transcribe(h.app.clone(), r#"{"lang": "es"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().is_some_and(|e| !e.is_empty()));

    let (status, _) = post_transcribe(h.app, "this is not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(h.source.subtitle_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.source.download_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.store.put_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_subtitles_are_returned_when_available() {
    let source = FakeSource {
        subtitles: Some(SRT),
        ..Default::default()
    };
    let h = harness(source, FakeStore::default(), FakeRecognizer::default());

    let (status, json) = post_transcribe(h.app, r#"{"url": "https://youtu.be/abc", "lang": "en"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["transcription"], "Hello world\nFoo bar");
    assert_eq!(json["timestamps"], serde_json::json!([]));
    assert_eq!(json["language"], "en");
    assert_eq!(json["source"], "subtitles");
    assert_eq!(h.source.download_calls.load(Ordering::SeqCst), 0);
    assert!(leftover_files(h.work_dir.path()).is_empty());
}

#[tokio::test]
async fn test_audio_fallback_runs_once() {
    let h = harness(FakeSource::default(), FakeStore::default(), FakeRecognizer::default());

    let (status, json) = post_transcribe(h.app, r#"{"url": "https://youtu.be/abc"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["source"], "audio");
    assert_eq!(json["language"], "auto");
    assert_eq!(json["transcription"], "Hola a todos.");
    assert_eq!(json["timestamps"].as_array().map(Vec::len), Some(3));
    assert_eq!(json["timestamps"][2]["word"], "todos.");

    assert_eq!(h.source.subtitle_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.source.download_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.store.delete_calls.load(Ordering::SeqCst), 1);
    assert!(h.store.objects.lock().unwrap().is_empty());
    assert!(leftover_files(h.work_dir.path()).is_empty());
}

#[tokio::test]
async fn test_transcription_timeout_cleans_up_remote_object() {
    let recognizer = FakeRecognizer { time_out: true };
    let h = harness(FakeSource::default(), FakeStore::default(), recognizer);

    let (status, json) = post_transcribe(h.app, r#"{"url": "https://youtu.be/abc"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Transcription timed out after 900 seconds");
    assert_eq!(h.store.delete_calls.load(Ordering::SeqCst), 1);
    assert!(h.store.objects.lock().unwrap().is_empty());
    assert!(leftover_files(h.work_dir.path()).is_empty());
}

#[tokio::test]
async fn test_upload_failure_removes_local_files_only() {
    let store = FakeStore {
        fail_put: true,
        ..Default::default()
    };
    let h = harness(FakeSource::default(), store, FakeRecognizer::default());

    let (status, json) = post_transcribe(h.app, r#"{"url": "https://youtu.be/abc"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Upload failed: bucket unreachable");
    assert_eq!(h.store.put_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.store.delete_calls.load(Ordering::SeqCst), 0);
    assert!(leftover_files(h.work_dir.path()).is_empty());
}

#[tokio::test]
async fn test_non_string_lang_keeps_url() {
    let source = FakeSource {
        subtitles: Some(SRT),
        ..Default::default()
    };
    let h = harness(source, FakeStore::default(), FakeRecognizer::default());

    let (status, json) = post_transcribe(h.app, r#"{"url": "https://youtu.be/abc", "lang": 5}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["source"], "subtitles");
    assert_eq!(json["language"], "es");
    assert_eq!(h.source.subtitle_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_bundled_page_offers_srt_copy_and_timestamped_view() {
    let app = bundled_frontend_app();

    let (status, page) = get_text(app.clone(), "/").await;
    assert_eq!(status, StatusCode::OK);
    for id in ["downloadSrt", "copyText", "viewTimestamped", "viewScript"] {
        assert!(page.contains(&format!("id=\"{}\"", id)), "missing {}", id);
    }

    let (status, script) = get_text(app, "/script.js").await;
    assert_eq!(status, StatusCode::OK);
    assert!(script.contains("/transcribir"));
    assert!(script.contains("function buildSrt"));
    assert!(script.contains("function buildBlocks"));
}
