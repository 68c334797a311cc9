//! Fallback-chain integration tests with scripted dispatchers.
//!
//! No completion endpoint required. Backoff timing runs on tokio's paused
//! clock, so waits are asserted exactly without slowing the suite.

use std::sync::Mutex;
use std::time::Duration;

use aura_advisor::{
    AdvisorConfig, ClassifiedError, CompletionDispatcher, ErrorKind, FallbackOrchestrator,
    Message,
};
use tokio::time::Instant;

// ── Helpers ──────────────────────────────────────────────────────────────────

const KEY: &str = "sk-or-v1-test-0123456789abcdef";

fn config(models: &[&str], max_retries: u32) -> AdvisorConfig {
    let mut cfg = AdvisorConfig::with_credentials(
        KEY,
        models.iter().map(|m| m.to_string()).collect(),
    );
    cfg.max_retries = max_retries;
    cfg.backoff_base_ms = 2_000;
    cfg.total_timeout_secs = None;
    cfg
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("aura_advisor=debug")
        .try_init();
}

fn rate_limited() -> ClassifiedError {
    ClassifiedError::from_response(Some(429), "HTTP 429")
}

fn not_found() -> ClassifiedError {
    ClassifiedError::from_response(Some(404), "model not found")
}

fn transient() -> ClassifiedError {
    ClassifiedError::from_response(Some(502), "HTTP 502")
}

fn prompt() -> Vec<Message> {
    vec![Message::system("be brief"), Message::user("hello")]
}

type Script = Box<dyn Fn(&str, usize) -> Result<String, ClassifiedError> + Send + Sync>;

/// Answers from a script keyed by `(model, attempt index on that model)`
/// and records every model it was asked for.
struct ScriptedDispatcher {
    script: Script,
    calls: Mutex<Vec<String>>,
}

impl ScriptedDispatcher {
    fn new(
        script: impl Fn(&str, usize) -> Result<String, ClassifiedError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            script: Box::new(script),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn always(err: fn() -> ClassifiedError) -> Self {
        Self::new(move |_, _| Err(err()))
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl CompletionDispatcher for ScriptedDispatcher {
    async fn dispatch(
        &self,
        _messages: &[Message],
        _max_tokens: u32,
        model: &str,
    ) -> Result<String, ClassifiedError> {
        let attempt = {
            let mut calls = self.calls.lock().unwrap();
            let attempt = calls.iter().filter(|m| m.as_str() == model).count();
            calls.push(model.to_string());
            attempt
        };
        (self.script)(model, attempt)
    }
}

/// Priority index of each call; must never decrease.
fn priority_trace(calls: &[String], models: &[&str]) -> Vec<usize> {
    calls
        .iter()
        .map(|c| models.iter().position(|m| m == c).expect("unknown model"))
        .collect()
}

// ── Fast skip on rate limit / unavailability ─────────────────────────────────

#[tokio::test(start_paused = true)]
async fn rate_limit_everywhere_spends_no_backoff() {
    init_tracing();
    let models = ["m1", "m2", "m3"];
    let orch = FallbackOrchestrator::new(
        ScriptedDispatcher::always(rate_limited),
        config(&models, 2),
    );

    let start = Instant::now();
    let err = orch.complete(&prompt(), 256).await.unwrap_err();

    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(err.kind, ErrorKind::Exhausted);
    assert_eq!(err.last_kind, Some(ErrorKind::RateLimited));
    assert_eq!(err.http_status, Some(429));
    // One attempt per model, in priority order.
    assert_eq!(orch.dispatcher().calls(), vec!["m1", "m2", "m3"]);
}

#[tokio::test(start_paused = true)]
async fn model_unavailable_skips_immediately() {
    let models = ["m1", "m2"];
    let orch = FallbackOrchestrator::new(
        ScriptedDispatcher::new(|model, _| match model {
            "m1" => Err(not_found()),
            _ => Ok("**Stay** hydrated".to_string()),
        }),
        config(&models, 2),
    );

    let start = Instant::now();
    let text = orch.complete(&prompt(), 256).await.unwrap();

    assert_eq!(text, "Stay hydrated");
    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(orch.dispatcher().calls(), vec!["m1", "m2"]);
}

// ── Backoff on unclassified failures ─────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn transient_everywhere_waits_full_backoff_schedule() {
    init_tracing();
    let models = ["m1", "m2", "m3"];
    let orch = FallbackOrchestrator::new(
        ScriptedDispatcher::always(transient),
        config(&models, 2),
    );

    let start = Instant::now();
    let err = orch.complete(&prompt(), 256).await.unwrap_err();

    // Per model: 2s after attempt 0, 4s after attempt 1, none after attempt 2.
    assert_eq!(start.elapsed(), Duration::from_millis(3 * (2_000 + 4_000)));
    assert_eq!(err.kind, ErrorKind::Exhausted);
    assert_eq!(err.last_kind, Some(ErrorKind::Transient));
    assert_eq!(
        orch.dispatcher().calls(),
        vec!["m1", "m1", "m1", "m2", "m2", "m2", "m3", "m3", "m3"]
    );
}

#[tokio::test(start_paused = true)]
async fn backoff_total_matches_formula_for_other_retry_counts() {
    for (models, retries) in [(vec!["a", "b"], 1u32), (vec!["a"], 3), (vec!["a", "b", "c", "d"], 0)] {
        let orch = FallbackOrchestrator::new(
            ScriptedDispatcher::always(transient),
            config(&models, retries),
        );
        let expected_ms: u64 = models.len() as u64
            * (0..u64::from(retries)).map(|a| (a + 1) * 2_000).sum::<u64>();

        let start = Instant::now();
        orch.complete(&prompt(), 64).await.unwrap_err();

        assert_eq!(
            start.elapsed(),
            Duration::from_millis(expected_ms),
            "models={models:?} retries={retries}"
        );
        assert_eq!(
            orch.dispatcher().calls().len(),
            models.len() * (retries as usize + 1)
        );
    }
}

#[tokio::test(start_paused = true)]
async fn explicit_retry_count_overrides_config() {
    let orch = FallbackOrchestrator::new(
        ScriptedDispatcher::always(transient),
        config(&["m1", "m2"], 2),
    );

    let start = Instant::now();
    orch.complete_with_retries(&prompt(), 0, 64).await.unwrap_err();

    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(orch.dispatcher().calls(), vec!["m1", "m2"]);
}

#[tokio::test(start_paused = true)]
async fn transient_then_success_retries_same_model() {
    let orch = FallbackOrchestrator::new(
        ScriptedDispatcher::new(|_, attempt| {
            if attempt == 0 {
                Err(ClassifiedError::from_response(None, "connection reset by peer"))
            } else {
                Ok("- rest\n- drink water".to_string())
            }
        }),
        config(&["m1", "m2"], 2),
    );

    let start = Instant::now();
    let text = orch.complete(&prompt(), 64).await.unwrap();

    assert_eq!(text, "• rest\n• drink water");
    assert_eq!(start.elapsed(), Duration::from_millis(2_000));
    assert_eq!(orch.dispatcher().calls(), vec!["m1", "m1"]);
}

// ── Ordering ─────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn mixed_failures_keep_priority_order() {
    init_tracing();
    let models = ["m1", "m2", "m3"];
    let orch = FallbackOrchestrator::new(
        ScriptedDispatcher::new(|model, attempt| match (model, attempt) {
            ("m1", 0) => Err(transient()),
            ("m1", _) => Err(not_found()),
            ("m2", _) => Err(rate_limited()),
            _ => Ok("answer".to_string()),
        }),
        config(&models, 2),
    );

    let start = Instant::now();
    let text = orch.complete(&prompt(), 64).await.unwrap();

    assert_eq!(text, "answer");
    assert_eq!(start.elapsed(), Duration::from_millis(2_000));
    assert_eq!(orch.dispatcher().calls(), vec!["m1", "m1", "m2", "m3"]);
}

#[tokio::test(start_paused = true)]
async fn models_are_never_revisited_for_any_failure_sequence() {
    let models = ["m1", "m2", "m3"];
    let kinds: [fn() -> ClassifiedError; 3] = [rate_limited, not_found, transient];

    // Deterministic sequences mixing all three recoverable kinds.
    for seed in 0..27usize {
        let orch = FallbackOrchestrator::new(
            ScriptedDispatcher::new(move |model, attempt| {
                let model_idx = model.trim_start_matches('m').parse::<usize>().unwrap();
                let slot = seed + model_idx * 3 + attempt;
                Err(kinds[slot % 3]())
            }),
            config(&models, 2),
        );
        orch.complete(&prompt(), 64).await.unwrap_err();

        let trace = priority_trace(&orch.dispatcher().calls(), &models);
        assert!(
            trace.windows(2).all(|w| w[0] <= w[1]),
            "seed {seed}: order went backwards: {trace:?}"
        );
        assert_eq!(trace.first(), Some(&0), "seed {seed}");
    }
}

// ── Fatal paths and limits ───────────────────────────────────────────────────

#[tokio::test]
async fn missing_credential_is_fatal_before_dispatch() {
    let mut cfg = config(&["m1", "m2"], 2);
    cfg.api_key = "short-key".to_string();
    let orch = FallbackOrchestrator::new(ScriptedDispatcher::always(transient), cfg);

    let err = orch.complete(&prompt(), 64).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::MissingCredential);
    assert!(orch.dispatcher().calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn missing_credential_from_dispatcher_aborts_run() {
    init_tracing();
    let orch = FallbackOrchestrator::new(
        ScriptedDispatcher::always(ClassifiedError::missing_credential),
        config(&["m1", "m2"], 2),
    );

    let err = orch.complete(&prompt(), 64).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::MissingCredential);
    assert_eq!(orch.dispatcher().calls(), vec!["m1"]);
}

#[tokio::test(start_paused = true)]
async fn total_timeout_caps_the_run() {
    init_tracing();
    let mut cfg = config(&["m1", "m2", "m3"], 2);
    cfg.total_timeout_secs = Some(5);
    let orch = FallbackOrchestrator::new(ScriptedDispatcher::always(transient), cfg);

    let start = Instant::now();
    let err = orch.complete(&prompt(), 64).await.unwrap_err();

    assert_eq!(start.elapsed(), Duration::from_secs(5));
    assert_eq!(err.kind, ErrorKind::Exhausted);
    // Attempt 0 at t=0, attempt 1 at t=2s; the 4s backoff is cut short.
    assert_eq!(orch.dispatcher().calls(), vec!["m1", "m1"]);
}

#[tokio::test]
async fn last_error_is_reported_after_exhaustion() {
    init_tracing();
    let orch = FallbackOrchestrator::new(
        ScriptedDispatcher::new(|model, _| match model {
            "m1" => Err(rate_limited()),
            _ => Err(ClassifiedError::from_response(Some(400), "The model `m2` does not exist")),
        }),
        config(&["m1", "m2"], 2),
    );

    let err = orch.complete(&prompt(), 64).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Exhausted);
    assert_eq!(err.last_kind, Some(ErrorKind::ModelUnavailable));
    assert_eq!(err.http_status, Some(400));
    assert_eq!(err.message, "The model `m2` does not exist");
}
