// End-to-end checks through the facade crate
use mockito::{Matcher, Server};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use relget::core::resolve_tools;
use relget::{pick_latest, select, Pipeline, Platform, Settings, ToolRegistry};

fn release(tag: &str, prerelease: bool, published_at: &str, assets: &[&str]) -> Value {
    json!({
        "tag_name": tag,
        "name": tag,
        "prerelease": prerelease,
        "draft": false,
        "published_at": published_at,
        "assets": assets.iter().map(|name| json!({
            "name": name,
            "size": 1000,
            "browser_download_url": format!("https://example.com/{}/{}", tag, name),
        })).collect::<Vec<_>>(),
    })
}

#[tokio::test]
async fn test_kubectx_listing() {
    let body = json!([
        release("v1.1.0", false, "2024-01-01T00:00:00Z", &["kubectx_linux_amd64.tar.gz"]),
        release("garbage-tag", false, "2024-03-01T00:00:00Z", &[]),
        release("v2.0.0-beta", true, "2024-02-01T00:00:00Z", &[
            "kubectx_linux_amd64.tar.gz",
            "kubectx_darwin_arm64.tar.gz",
            "kubectx_windows_amd64.zip",
            "checksums.txt",
        ]),
        release("v1.2.0", false, "2024-01-15T00:00:00Z", &["kubectx_darwin_arm64.tar.gz"]),
    ]);

    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/repos/ahmetb/kubectx/releases")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(body.to_string())
        .create_async()
        .await;

    let registry = ToolRegistry::builtin();
    let tools = resolve_tools(&registry, &["kubens"]).unwrap();
    let settings = Settings {
        github_api: Some(server.url()),
        ..Settings::default()
    };
    let pipeline = Pipeline::new(settings);
    let result = pipeline
        .fetch_tool(tools[0], &CancellationToken::new())
        .await
        .unwrap();

    let tags: Vec<_> = result.releases.iter().map(|r| r.tag.as_str()).collect();
    assert_eq!(tags, vec!["v2.0.0-beta", "v1.2.0", "v1.1.0", "garbage-tag"]);
    assert_eq!(result.releases[0].matched_assets.len(), 3);

    let linux: Platform = "linux-amd64".parse().unwrap();
    let (stable, _) = pick_latest(&result, linux, false).unwrap();
    assert_eq!(stable.tag, "v1.1.0");

    let top = select(result, 2);
    let json = serde_json::to_value(&top).unwrap();
    assert_eq!(json["toolNames"], json!(["kubectx", "kubens"]));
    assert_eq!(json["releases"].as_array().unwrap().len(), 2);
    assert_eq!(json["releases"][0]["version"], "2.0.0-beta");
    assert_eq!(json["releases"][0]["isPrerelease"], true);
    assert_eq!(json["releases"][0]["channel"], "beta");
    assert_eq!(
        json["releases"][0]["matchedAssets"]["windows-amd64"]["downloadUrl"],
        "https://example.com/v2.0.0-beta/kubectx_windows_amd64.zip"
    );
}
