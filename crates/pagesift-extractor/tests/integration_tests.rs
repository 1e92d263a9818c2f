//! Integration tests for the Extractor

use pagesift_domain::RenderResult;
use pagesift_extractor::{Extractor, ExtractorConfig, ExtractorError, PromptTemplate};
use pagesift_llm::MockProvider;
use pagesift_reducer::ReductionStrategy;
use serde_json::json;
use std::io::Write;

const FARES_HTML: &str = r#"<html>
<head><script>track()</script></head>
<body>
  <nav>Home | Deals</nav>
  <main>
    <h1>JFK to LAX</h1>
    <p>UA123 departs 14:30, arrives 17:55. Nonstop, 5h 25m. Economy fare $245.00 per person.</p>
    <p>DL456 departs 16:05, arrives 19:40. 1 stop. Economy fare $289.00 per person.</p>
  </main>
  <footer>Privacy</footer>
</body>
</html>"#;

const FARES_TEXT: &str = "Home | Deals\nJFK to LAX\n\
    UA123 departs 14:30, arrives 17:55. Nonstop, 5h 25m. Economy fare $245.00 per person.\n\
    DL456 departs 16:05, arrives 19:40. 1 stop. Economy fare $289.00 per person.\nPrivacy";

fn page() -> RenderResult {
    RenderResult::new(FARES_HTML.to_string(), FARES_TEXT.to_string())
}

fn template_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file
}

#[tokio::test]
async fn test_full_extraction_flow() {
    let prompt = template_file("Extract every flight as {\"flights\": [{\"number\", \"price\"}]}.");
    let llm = MockProvider::new(
        r#"{"flights": [{"number": "UA123", "price": "$245.00"}, {"number": "DL456", "price": "$289.00"}]}"#,
    );
    let extractor = Extractor::new(
        llm.clone(),
        PromptTemplate::from_file(prompt.path()).unwrap(),
        ExtractorConfig::default(),
    );

    let value = extractor.extract(&page(), "https://fares.example/jfk-lax").await.unwrap();

    assert_eq!(value["flights"][1]["number"], "DL456");
    let request = llm.last_request().unwrap();
    assert!(request.system.starts_with("Extract every flight"));
    assert!(request.user.contains("AIRPORT:JFK"));
    assert!(request.user.contains("$289.00"));
}

#[tokio::test]
async fn test_fenced_reply_is_recovered() {
    let llm = MockProvider::new("```json\n{\"a\":1}\n```");
    let extractor = Extractor::new(llm, PromptTemplate::new("x"), ExtractorConfig::default());

    let value = extractor.extract(&page(), "https://fares.example").await.unwrap();
    assert_eq!(value, json!({"a": 1}));
}

#[tokio::test]
async fn test_empty_reply() {
    let extractor = Extractor::new(
        MockProvider::new(""),
        PromptTemplate::new("x"),
        ExtractorConfig::default(),
    );

    let result = extractor.extract(&page(), "https://fares.example").await;
    assert_eq!(result, Err(ExtractorError::EmptyResponse));
}

#[tokio::test]
async fn test_prose_reply_is_not_retried() {
    let llm = MockProvider::new("Sorry, I cannot help with that.");
    let extractor = Extractor::new(llm.clone(), PromptTemplate::new("x"), ExtractorConfig::default());

    let result = extractor.extract(&page(), "https://fares.example").await;

    assert!(matches!(result, Err(ExtractorError::InvalidJson(_))));
    assert_eq!(llm.call_count(), 1);
}

#[tokio::test]
async fn test_light_cleanup_sends_markup() {
    let llm = MockProvider::default();
    let config = ExtractorConfig::default().with_strategy(ReductionStrategy::LightCleanup);
    let extractor = Extractor::new(llm.clone(), PromptTemplate::new("x"), config);

    extractor.extract(&page(), "https://fares.example").await.unwrap();

    let user = llm.last_request().unwrap().user;
    assert!(user.contains("<main>"));
    assert!(!user.contains("track()"));
}

#[tokio::test]
async fn test_unrelated_page_falls_back_to_main_content() {
    let llm = MockProvider::default();
    let extractor = Extractor::new(llm.clone(), PromptTemplate::new("x"), ExtractorConfig::default());
    let page = RenderResult::new(
        "<html><body><article>Nothing to see here.</article></body></html>".to_string(),
        "Nothing to see here.".to_string(),
    );

    extractor.extract(&page, "https://blank.example").await.unwrap();

    let user = llm.last_request().unwrap().user;
    assert!(user.contains("Nothing to see here."));
    assert!(!user.contains("<article>"));
}

#[test]
fn test_config_from_toml_drives_reducer() {
    let config = ExtractorConfig::from_toml(
        r#"
        strategy = "targeted"

        [reducer.targeted]
        context_window = 10
        "#,
    )
    .unwrap();
    let extractor = Extractor::new(MockProvider::default(), PromptTemplate::new("x"), config);

    let reduced = extractor.reduce(&page(), "https://fares.example");
    assert_eq!(reduced.method, pagesift_domain::ReductionMethod::Targeted);
    assert!(reduced.content.contains("PRICE:$245.00"));
}
