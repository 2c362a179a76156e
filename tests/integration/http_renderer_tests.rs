//! Integration tests for the HTTP renderer
//!
//! These tests use wiremock to serve documentation pages and check how
//! responses map onto render results.

use docs_harvest::config::UserAgentConfig;
use docs_harvest::renderer::{HttpRenderer, PageRenderer, RenderConfig};
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARTICLE: &str = r#"<html><head><title>Routing</title><script>var x = 1;</script></head>
<body>
  <nav><a href="/docs/app/nav-only">Nav</a></nav>
  <main>
    <h1>Routing</h1>
    <p>The router maps every URL to a page component in the app directory.</p>
    <p>Read about <a href="/docs/app/layouts#top">layouts</a> or the
       <a href="https://github.com/vercel/next.js">source</a>.</p>
  </main>
</body></html>"#;

fn user_agent() -> UserAgentConfig {
    UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
        contact_email: "test@example.com".to_string(),
    }
}

fn renderer_for(server: &MockServer) -> HttpRenderer {
    let origin = Url::parse(&server.uri()).expect("Failed to parse mock server URI");
    HttpRenderer::new(&user_agent(), origin, None).expect("Failed to build renderer")
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

#[tokio::test]
async fn test_renders_selected_content() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/docs/app/routing"))
        .respond_with(html(ARTICLE))
        .mount(&mock_server)
        .await;

    let renderer = renderer_for(&mock_server);
    let url = format!("{}/docs/app/routing", mock_server.uri());
    let result = renderer
        .render(&url, &RenderConfig::content("main"))
        .await
        .unwrap();

    assert!(result.success);
    assert!(result.markdown.contains("# Routing"));
    assert!(result.markdown.contains("page component"));
    assert!(!result.markdown.contains("var x"));
    assert!(!result.markdown.contains("Nav"));
    assert!(result.external_links.is_empty());

    let layouts = format!("{}/docs/app/layouts#top", mock_server.uri());
    assert!(result.internal_links.iter().any(|l| l.href == layouts));
}

#[tokio::test]
async fn test_discovery_sees_whole_document() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/docs/app/routing"))
        .respond_with(html(ARTICLE))
        .mount(&mock_server)
        .await;

    let renderer = renderer_for(&mock_server);
    let url = format!("{}/docs/app/routing", mock_server.uri());
    let result = renderer
        .render(&url, &RenderConfig::discovery())
        .await
        .unwrap();

    assert!(result.success);
    let hrefs: Vec<&str> = result.internal_links.iter().map(|l| l.href.as_str()).collect();
    assert!(hrefs.iter().any(|h| h.ends_with("/docs/app/nav-only")));
    assert!(hrefs.iter().any(|h| h.contains("/docs/app/layouts")));
    assert_eq!(result.external_links.len(), 1);
}

#[tokio::test]
async fn test_unmatched_selector_is_unsuccessful() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/docs/app/routing"))
        .respond_with(html(ARTICLE))
        .mount(&mock_server)
        .await;

    let renderer = renderer_for(&mock_server);
    let url = format!("{}/docs/app/routing", mock_server.uri());
    let result = renderer
        .render(&url, &RenderConfig::content("div.prose[data-docs='true']"))
        .await
        .unwrap();

    assert!(!result.success);
}

#[tokio::test]
async fn test_not_found_is_unsuccessful() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/docs/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&mock_server)
        .await;

    let renderer = renderer_for(&mock_server);
    let url = format!("{}/docs/missing", mock_server.uri());
    let result = renderer
        .render(&url, &RenderConfig::discovery())
        .await
        .unwrap();

    assert!(!result.success);
    assert!(result.markdown.is_empty());
}

#[tokio::test]
async fn test_non_html_is_unsuccessful() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/docs/data.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"title": "not a page"}"#, "application/json"),
        )
        .mount(&mock_server)
        .await;

    let renderer = renderer_for(&mock_server);
    let url = format!("{}/docs/data.json", mock_server.uri());
    let result = renderer
        .render(&url, &RenderConfig::discovery())
        .await
        .unwrap();

    assert!(!result.success);
}

#[tokio::test]
async fn test_sends_user_agent() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/docs/app/routing"))
        .and(header(
            "user-agent",
            "TestBot/1.0.0 (+https://example.com/contact; test@example.com)",
        ))
        .respond_with(html(ARTICLE))
        .expect(1)
        .mount(&mock_server)
        .await;

    let renderer = renderer_for(&mock_server);
    let url = format!("{}/docs/app/routing", mock_server.uri());
    let result = renderer
        .render(&url, &RenderConfig::content("main"))
        .await
        .unwrap();

    assert!(result.success);
}

#[tokio::test]
async fn test_relative_links_resolve_against_served_url() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/docs/guides"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("location", format!("{}/docs/guides/", mock_server.uri()).as_str()),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/docs/guides/"))
        .respond_with(html(
            r#"<html><body><main><h1>Guides</h1>
            <p>Start with <a href="caching">caching</a> before anything else here.</p>
            </main></body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    let renderer = renderer_for(&mock_server);
    let url = format!("{}/docs/guides", mock_server.uri());
    let result = renderer
        .render(&url, &RenderConfig::discovery())
        .await
        .unwrap();

    let caching = format!("{}/docs/guides/caching", mock_server.uri());
    assert!(result.success);
    assert_eq!(result.internal_links.len(), 1);
    assert_eq!(result.internal_links[0].href, caching);
    assert!(result.markdown.contains(&format!("[caching]({})", caching)));
}

#[tokio::test]
async fn test_selector_cascade_fetches_page_once() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/docs/app/routing"))
        .respond_with(html(ARTICLE))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/docs/app/layouts"))
        .respond_with(html(ARTICLE))
        .expect(1)
        .mount(&mock_server)
        .await;

    let renderer = renderer_for(&mock_server);
    let routing = format!("{}/docs/app/routing", mock_server.uri());
    let layouts = format!("{}/docs/app/layouts", mock_server.uri());

    let configs = [
        RenderConfig::discovery(),
        RenderConfig::metadata("div.prose[data-docs='true']"),
        RenderConfig::metadata("main"),
        RenderConfig::content("div.prose[data-docs='true']"),
        RenderConfig::content("main"),
    ];
    for config in &configs {
        renderer.render(&routing, config).await.unwrap();
    }

    let result = renderer
        .render(&layouts, &RenderConfig::content("main"))
        .await
        .unwrap();
    assert!(result.success);
}

#[tokio::test]
async fn test_failed_fetch_is_not_repeated_within_cascade() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/docs/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let renderer = renderer_for(&mock_server);
    let url = format!("{}/docs/missing", mock_server.uri());
    for selector in ["main", "article", "body"] {
        let result = renderer
            .render(&url, &RenderConfig::content(selector))
            .await
            .unwrap();
        assert!(!result.success);
    }
}
