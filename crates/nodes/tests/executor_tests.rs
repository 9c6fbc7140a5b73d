//! End-to-end tests for `PipelineExecutor` with in-memory collaborators, plus
//! one run through the real HTTP and PNG adapters.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use nodes::{ExecutorSettings, PipelineExecutor, RetryConfig};
use pipeline::{
    ChartRenderer, ChartSpec, CompletionRequest, CompletionResponse, CompletionService, Concept,
    PaperRecord, PipelineError, SearchMeta, SearchRequest, SearchResponse, SearchService,
    ServiceFailure, ServiceKind,
};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

struct FakeSearch {
    responses: Mutex<Vec<Result<SearchResponse, PipelineError>>>,
    requests: Mutex<Vec<SearchRequest>>,
}

impl FakeSearch {
    fn returning(results: Vec<Result<SearchResponse, PipelineError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(results),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl SearchService for FakeSearch {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, PipelineError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses.lock().unwrap().remove(0)
    }
}

#[derive(Default)]
struct FakeCompletion {
    requests: Mutex<Vec<CompletionRequest>>,
}

impl FakeCompletion {
    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionService for FakeCompletion {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, PipelineError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(CompletionResponse {
            text: "Promising but early.".to_string(),
            model: None,
        })
    }
}

#[derive(Default)]
struct RecordingRenderer {
    rendered: Mutex<Vec<(ChartSpec, PathBuf)>>,
}

impl ChartRenderer for RecordingRenderer {
    fn render(&self, spec: &ChartSpec, path: &Path) -> Result<(), PipelineError> {
        self.rendered
            .lock()
            .unwrap()
            .push((spec.clone(), path.to_path_buf()));
        Ok(())
    }
}

fn quantum_response() -> SearchResponse {
    SearchResponse {
        papers: vec![
            PaperRecord {
                title: "Later work".into(),
                year: Some(2023),
                citation_count: 3,
                authors: vec!["Grace".into()],
                institutions: vec!["MIT".into()],
                doi: None,
            },
            PaperRecord {
                title: "Seminal work".into(),
                year: Some(2022),
                citation_count: 10,
                authors: vec!["Ada".into(), "Grace".into()],
                institutions: vec!["MIT".into(), "ETH Zurich".into()],
                doi: Some("https://doi.org/10.1/seminal".into()),
            },
        ],
        meta: SearchMeta {
            total_matches: Some(1234),
            page: Some(1),
            page_size: Some(50),
        },
    }
}

fn settings(output_dir: &Path) -> ExecutorSettings {
    ExecutorSettings {
        output_dir: output_dir.to_path_buf(),
        ..ExecutorSettings::default()
    }
}

fn concept() -> Concept {
    Concept::new("quantum computing").unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn quantum_computing_run_populates_every_output() {
    let search = FakeSearch::returning(vec![Ok(quantum_response())]);
    let completion = Arc::new(FakeCompletion::default());
    let renderer = Arc::new(RecordingRenderer::default());
    let executor = PipelineExecutor::new(
        search.clone(),
        completion.clone(),
        renderer.clone(),
        settings(Path::new("out")),
    );

    let outcome = executor.run(concept()).await.unwrap();

    assert_eq!(search.requests.lock().unwrap()[0].page_size.as_u32(), 50);

    let report = &outcome.formatted_result;
    assert!(report.contains("Found 2 academic papers"));
    assert!(report.contains("(1,234 matching works indexed)"));
    assert!(report.contains("2022 | 1\n2023 | 1"));
    let seminal = report.find("• Seminal work").unwrap();
    let later = report.find("• Later work").unwrap();
    assert!(seminal < later);
    assert!(report.contains("• MIT (2 papers)"));
    assert!(report.contains("• Grace (2 papers)"));

    assert_eq!(outcome.investment_insights, "Promising but early.");
    let prompt = &completion.requests.lock().unwrap()[0].user_prompt;
    assert!(prompt.contains("quantum computing"));
    assert!(prompt.contains(report.as_str()));

    let rendered = renderer.rendered.lock().unwrap();
    let paths: Vec<&Path> = rendered.iter().map(|(_, p)| p.as_path()).collect();
    assert_eq!(
        paths,
        vec![
            Path::new("out/quantum_computing_trend_chart.png"),
            Path::new("out/quantum_computing_institutions_chart.png"),
            Path::new("out/quantum_computing_authors_chart.png"),
        ]
    );
    assert_eq!(outcome.charts.trend, Path::new("out/quantum_computing_trend_chart.png"));
    assert_eq!(rendered[1].0.points[0].label, "MIT");
}

#[tokio::test]
async fn empty_results_still_produce_a_report_and_charts() {
    let search = FakeSearch::returning(vec![Ok(SearchResponse::default())]);
    let renderer = Arc::new(RecordingRenderer::default());
    let executor = PipelineExecutor::new(
        search,
        Arc::new(FakeCompletion::default()),
        renderer.clone(),
        settings(Path::new(".")),
    );

    let outcome = executor.run(concept()).await.unwrap();

    assert!(outcome.formatted_result.contains("Found 0 academic papers"));
    let rendered = renderer.rendered.lock().unwrap();
    assert_eq!(rendered.len(), 3);
    assert!(rendered.iter().all(|(spec, _)| spec.points.is_empty()));
}

#[tokio::test]
async fn search_failure_stops_before_rendering_or_completion() {
    let search = FakeSearch::returning(vec![Err(PipelineError::external(
        ServiceKind::Search,
        ServiceFailure::Status(500),
        "internal error",
    ))]);
    let completion = Arc::new(FakeCompletion::default());
    let renderer = Arc::new(RecordingRenderer::default());
    let executor = PipelineExecutor::new(
        search,
        completion.clone(),
        renderer.clone(),
        settings(Path::new(".")),
    );

    let err = executor.run(concept()).await.unwrap_err();

    assert!(matches!(
        err,
        PipelineError::ExternalService {
            service: ServiceKind::Search,
            ..
        }
    ));
    assert!(renderer.rendered.lock().unwrap().is_empty());
    assert_eq!(completion.calls(), 0);
}

#[tokio::test]
async fn render_failure_stops_before_completion() {
    struct FailingRenderer;

    impl ChartRenderer for FailingRenderer {
        fn render(&self, _spec: &ChartSpec, path: &Path) -> Result<(), PipelineError> {
            Err(PipelineError::ChartRender {
                path: path.to_path_buf(),
                message: "disk full".into(),
            })
        }
    }

    let completion = Arc::new(FakeCompletion::default());
    let executor = PipelineExecutor::new(
        FakeSearch::returning(vec![Ok(quantum_response())]),
        completion.clone(),
        Arc::new(FailingRenderer),
        settings(Path::new(".")),
    );

    let err = executor.run(concept()).await.unwrap_err();
    assert!(matches!(err, PipelineError::ChartRender { .. }));
    assert_eq!(completion.calls(), 0);
}

#[tokio::test]
async fn retryable_search_failure_is_retried_when_enabled() {
    let search = FakeSearch::returning(vec![
        Err(PipelineError::external(
            ServiceKind::Search,
            ServiceFailure::Status(503),
            "unavailable",
        )),
        Ok(quantum_response()),
    ]);
    let executor = PipelineExecutor::new(
        search.clone(),
        Arc::new(FakeCompletion::default()),
        Arc::new(RecordingRenderer::default()),
        ExecutorSettings {
            retry: RetryConfig::default()
                .with_max_retries(1)
                .with_initial_delay(Duration::ZERO),
            ..ExecutorSettings::default()
        },
    );

    executor.run(concept()).await.unwrap();
    assert_eq!(search.calls(), 2);
}

#[tokio::test]
async fn http_500_through_real_adapters_writes_no_files() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/works"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .expect(1)
        .mount(&server)
        .await;

    let search = openalex::OpenAlexClient::new(openalex::OpenAlexConfig {
        base_url: server.uri(),
        mailto: None,
        timeout: Duration::from_secs(5),
    })
    .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let completion = Arc::new(FakeCompletion::default());
    let executor = PipelineExecutor::new(
        Arc::new(search),
        completion.clone(),
        Arc::new(charts::PngChartRenderer::default()),
        settings(dir.path()),
    );

    let err = executor.run(concept()).await.unwrap_err();

    assert!(matches!(
        err,
        PipelineError::ExternalService {
            failure: ServiceFailure::Status(500),
            ..
        }
    ));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    assert_eq!(completion.calls(), 0);
}

#[tokio::test]
async fn real_renderer_writes_three_files() {
    let dir = tempfile::tempdir().unwrap();
    let executor = PipelineExecutor::new(
        FakeSearch::returning(vec![Ok(quantum_response())]),
        Arc::new(FakeCompletion::default()),
        Arc::new(charts::PngChartRenderer::default()),
        settings(dir.path()),
    );

    let outcome = executor.run(concept()).await.unwrap();

    for (_, path) in outcome.charts.iter() {
        assert!(path.starts_with(dir.path()));
        assert!(path.is_file(), "missing {}", path.display());
    }
}
