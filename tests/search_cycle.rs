use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::time::{timeout, Duration};

use crossold::query::{parse_query_literal, HighlightRules};
use crossold::registry::{Backend, BackendRegistry};
use crossold::render::{ReportRenderer, ReportTheme};
use crossold::search::{CyclePhase, SearchOrchestrator, SEARCH_ROUTE};
use crossold::session::{BackendTransport, Connector, Credentials, SessionManager, LOGIN_ROUTE};
use crossold::{CrossOldError, Result};

const TIMEOUT_MS: u64 = 500;

/// One request as seen by an in-memory OLD.
#[derive(Debug, Clone)]
struct Call {
    backend: String,
    route: String,
    counting: bool,
}

/// In-memory OLDs keyed by id. Searches require a prior login, like the real
/// service's cookie check.
#[derive(Clone, Default)]
struct InMemoryOlds {
    forms: HashMap<String, Vec<Value>>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl InMemoryOlds {
    fn with(mut self, id: &str, forms: Vec<Value>) -> Self {
        self.forms.insert(id.to_string(), forms);
        self
    }

    fn calls_to(&self, backend: &str) -> Vec<Call> {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.backend == backend)
            .cloned()
            .collect()
    }
}

struct InMemoryOld {
    id: String,
    forms: Vec<Value>,
    calls: Arc<Mutex<Vec<Call>>>,
    logged_in: AtomicBool,
}

impl Connector for InMemoryOlds {
    fn connect(&self, backend: &Backend) -> Result<Box<dyn BackendTransport>> {
        Ok(Box::new(InMemoryOld {
            id: backend.id().to_string(),
            forms: self.forms.get(backend.id()).cloned().unwrap_or_default(),
            calls: Arc::clone(&self.calls),
            logged_in: AtomicBool::new(false),
        }))
    }
}

#[async_trait]
impl BackendTransport for InMemoryOld {
    async fn post_json(&self, route: &str, body: &Value) -> Result<Value> {
        let counting = body.get("paginator").is_some();
        self.calls.lock().push(Call {
            backend: self.id.clone(),
            route: route.to_string(),
            counting,
        });

        match route {
            LOGIN_ROUTE => {
                let ok = body["password"] == "secret";
                self.logged_in.store(ok, Ordering::SeqCst);
                Ok(json!({ "authenticated": ok }))
            }
            SEARCH_ROUTE if !self.logged_in.load(Ordering::SeqCst) => {
                Ok(json!({ "error": "Authentication is required to access this resource." }))
            }
            SEARCH_ROUTE if body["query"]["filter"][0] == "Fomr" => Ok(json!({
                "errors": { "Malformed OLD query error": "Fomr is not a model" }
            })),
            SEARCH_ROUTE if counting => Ok(json!({
                "paginator": { "page": 1, "items_per_page": 1, "count": self.forms.len() },
                "items": self.forms.iter().take(1).collect::<Vec<_>>(),
            })),
            SEARCH_ROUTE => Ok(Value::Array(self.forms.clone())),
            other => Err(CrossOldError::transport(&self.id, format!("no route {other}"))),
        }
    }
}

fn igt(transcription: &str, gloss: &str, translation: &str) -> Value {
    json!({
        "id": 1,
        "transcription": transcription,
        "morpheme_break": transcription,
        "morpheme_gloss": gloss,
        "phonetic_transcription": null,
        "translations": [{ "grammaticality": "", "transcription": translation }],
    })
}

fn registry() -> BackendRegistry {
    BackendRegistry::new(vec![
        Backend::new("a", "Alpha", "https://a.example/old/").unwrap(),
        Backend::new("b", "Beta", "https://b.example/old/").unwrap(),
    ])
    .unwrap()
}

async fn login(olds: &InMemoryOlds) -> SessionManager {
    timeout(
        Duration::from_millis(TIMEOUT_MS),
        SessionManager::authenticate_all(
            &registry(),
            &Credentials::new("fieldworker", "secret"),
            olds,
        ),
    )
    .await
    .expect("login timed out")
    .expect("login failed")
}

#[tokio::test]
async fn only_backends_with_matches_are_fetched_and_rendered() {
    let olds = InMemoryOlds::default()
        .with(
            "a",
            vec![
                igt("oki", "hello", "hello"),
                igt("nitsspiyi", "1-dance", "I danced"),
                igt("aakitsspiyi", "FUT-dance", "she will dance"),
            ],
        )
        .with("b", vec![]);
    let sessions = login(&olds).await;

    let query = parse_query_literal("['Form', 'transcription', 'regex', '.']").unwrap();
    let mut orchestrator = SearchOrchestrator::new(&sessions);
    let results = timeout(Duration::from_millis(TIMEOUT_MS), orchestrator.run(&query))
        .await
        .expect("search timed out")
        .unwrap();
    assert_eq!(orchestrator.phase(), CyclePhase::Done);

    // b answered its login and its count, and was never fetched from.
    let b_searches: Vec<_> = olds
        .calls_to("b")
        .into_iter()
        .filter(|call| call.route == SEARCH_ROUTE)
        .collect();
    assert_eq!(b_searches.len(), 1);
    assert!(b_searches[0].counting);

    let a_searches: Vec<bool> = olds
        .calls_to("a")
        .into_iter()
        .filter(|call| call.route == SEARCH_ROUTE)
        .map(|call| call.counting)
        .collect();
    assert_eq!(a_searches, vec![true, false]);

    let report = ReportRenderer::new(ReportTheme::plain()).render(
        &query,
        &results,
        &HighlightRules::default(),
    );
    assert!(report.contains("Alpha (3 forms)"));
    assert!(report.contains("\n1)     oki"));
    assert!(report.contains("\n3)     aakitsspiyi"));
    assert!(!report.contains("\n4)"));
    assert!(!report.contains("Beta"));
    assert!(report.contains("\nAlpha: 3\n"));
}

#[tokio::test]
async fn translation_matches_are_highlighted() {
    let olds = InMemoryOlds::default().with(
        "a",
        vec![igt("a-ihpiyi", "3-dance", "he runs quickly")],
    );
    let sessions = login(&olds).await;

    let query = parse_query_literal(
        "['and', [['Form', 'grammaticality', '=', ''], \
                  ['Form', 'translations', 'transcription', 'regex', '[qQ]uickly']]]",
    )
    .unwrap();
    let theme = ReportTheme::default();
    let marker = theme.highlight_marker();
    let rules = HighlightRules::build(&query, &marker);

    let results = SearchOrchestrator::new(&sessions).run(&query).await.unwrap();
    let report = ReportRenderer::new(theme).render(&query, &results, &rules);

    let expected = format!("       `he runs {}`\n", marker.wrap("quickly"));
    assert!(report.contains(&expected), "{report:?}");
    // Only regex leaves highlight; the transcription is untouched.
    assert!(report.contains("a-ihpiyi"));
}

#[tokio::test]
async fn rejected_filter_aborts_before_fetching() {
    let olds = InMemoryOlds::default().with("a", vec![igt("oki", "hello", "hello")]);
    let sessions = login(&olds).await;
    olds.calls.lock().clear();

    let query = parse_query_literal("['Fomr', 'transcription', '=', 'oki']").unwrap();
    let mut orchestrator = SearchOrchestrator::new(&sessions);
    let err = orchestrator.run(&query).await.unwrap_err();

    assert!(matches!(err, CrossOldError::InvalidQuery { .. }));
    assert_eq!(orchestrator.phase(), CyclePhase::Aborted);
    assert!(olds.calls.lock().iter().all(|call| call.counting));
}

#[tokio::test]
async fn wrong_password_fails_the_whole_login() {
    let olds = InMemoryOlds::default();
    let err = SessionManager::authenticate_all(
        &registry(),
        &Credentials::new("fieldworker", "guess"),
        &olds,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CrossOldError::Authentication { .. }));
    assert!(!err.is_cycle_error());
}

#[tokio::test]
async fn sessions_survive_across_cycles() {
    let olds = InMemoryOlds::default().with("b", vec![igt("oki", "hello", "hello")]);
    let sessions = login(&olds).await;

    let bad = parse_query_literal("['Fomr', 'id', '=', 1]").unwrap();
    let good = parse_query_literal("['Form', 'morpheme_gloss', 'regex', 'hello']").unwrap();

    assert!(SearchOrchestrator::new(&sessions).run(&bad).await.is_err());
    let results = SearchOrchestrator::new(&sessions).run(&good).await.unwrap();

    assert_eq!(results.total_forms(), 1);
    assert_eq!(results.counts().get("a"), Some(&0));
    assert_eq!(olds.calls_to("a").iter().filter(|c| c.route == LOGIN_ROUTE).count(), 1);
}
