#![allow(clippy::unwrap_used)]
// Integration tests for the standard ACL resource layer using wiremock.

use std::net::Ipv4Addr;

use serde_json::{json, Value};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use eapi::{AclAction, Credentials, EapiNode, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, EapiNode) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let node = EapiNode::with_client(
        reqwest::Client::new(),
        base_url,
        Credentials::new("admin", "pw"),
    );
    (server, node)
}

/// Mount a success envelope whose second result carries `output`
/// (the first result belongs to the prepended `enable` command).
async fn mock_show_output(server: &MockServer, output: &str) {
    Mock::given(method("POST"))
        .and(path("/command-api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": "test",
            "result": [{}, { "output": output }],
        })))
        .mount(server)
        .await;
}

/// Mount a success envelope with `n` empty results (for configure calls).
async fn mock_configure_ok(server: &MockServer, n: usize) {
    Mock::given(method("POST"))
        .and(path("/command-api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": "test",
            "result": vec![json!({}); n],
        })))
        .mount(server)
        .await;
}

/// The `cmds` array of the one request the server received.
async fn single_request_cmds(server: &MockServer) -> Vec<String> {
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    body["params"]["cmds"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c.as_str().unwrap().to_string())
        .collect()
}

fn addr(s: &str) -> Ipv4Addr {
    s.parse().unwrap()
}

// ── Read path ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_parses_acl() {
    let (server, node) = setup().await;
    mock_show_output(
        &server,
        "Standard IP Access List test\n\
         10 permit any\n\
         20 deny host 10.1.1.1\n\
         30 permit 172.16.0.0/12 log\n",
    )
    .await;

    let acl = node.standard_acls().get("test").await.unwrap().unwrap();

    assert_eq!(acl.name, "test");
    assert_eq!(acl.entries.len(), 3);

    assert_eq!(acl.entries[&10].action, AclAction::Permit);
    assert_eq!(acl.entries[&10].src_addr, addr("0.0.0.0"));
    assert_eq!(acl.entries[&10].src_len, 32);
    assert!(!acl.entries[&10].log);

    assert_eq!(acl.entries[&20].action, AclAction::Deny);
    assert_eq!(acl.entries[&20].src_addr, addr("10.1.1.1"));
    assert_eq!(acl.entries[&20].src_len, 32);

    assert_eq!(acl.entries[&30].src_len, 12);
    assert!(acl.entries[&30].log);

    let cmds = single_request_cmds(&server).await;
    assert_eq!(cmds, vec!["enable", "show ip access-lists test"]);
}

#[tokio::test]
async fn test_get_returns_none_on_empty_output() {
    let (server, node) = setup().await;
    mock_show_output(&server, "").await;

    let acl = node.standard_acls().get("missing").await.unwrap();
    assert!(acl.is_none());
}

#[tokio::test]
async fn test_get_surfaces_transport_failure() {
    // Nothing is listening on the base URL; the read path must report
    // the failure instead of mapping it to an absent resource.
    let node = EapiNode::with_client(
        reqwest::Client::new(),
        Url::parse("http://127.0.0.1:1/").unwrap(),
        Credentials::new("admin", "pw"),
    );

    let result = node.standard_acls().get("test").await;

    assert!(
        matches!(result, Err(Error::Transport(_))),
        "expected Transport error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_get_all_parses_every_block() {
    let (server, node) = setup().await;
    mock_show_output(
        &server,
        "Standard IP Access List mgmt\n\
         10 permit host 10.0.0.1\n\
         \n\
         Standard IP Access List edge\n\
         10 deny any log\n\
         20 permit 192.168.0.0 255.255.0.0\n\
         \n",
    )
    .await;

    let acls = node.standard_acls().get_all().await.unwrap().unwrap();

    assert_eq!(acls.len(), 2);
    assert_eq!(acls["mgmt"].entries.len(), 1);
    assert_eq!(acls["mgmt"].entries[&10].src_addr, addr("10.0.0.1"));

    assert_eq!(acls["edge"].entries.len(), 2);
    assert!(acls["edge"].entries[&10].log);
    assert_eq!(acls["edge"].entries[&20].src_len, 16);

    let cmds = single_request_cmds(&server).await;
    assert_eq!(cmds, vec!["enable", "show ip access-lists"]);
}

#[tokio::test]
async fn test_get_all_returns_none_on_blank_output() {
    let (server, node) = setup().await;
    mock_show_output(&server, "\n").await;

    let acls = node.standard_acls().get_all().await.unwrap();
    assert!(acls.is_none());
}

// ── Write path ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_command_sequence() {
    let (server, node) = setup().await;
    mock_configure_ok(&server, 2).await;

    node.standard_acls().create("acl1").await.unwrap();

    let cmds = single_request_cmds(&server).await;
    assert_eq!(cmds, vec!["configure", "ip access-list standard acl1"]);
}

#[tokio::test]
async fn test_delete_command_sequence() {
    let (server, node) = setup().await;
    mock_configure_ok(&server, 2).await;

    node.standard_acls().delete("acl1").await.unwrap();

    let cmds = single_request_cmds(&server).await;
    assert_eq!(cmds, vec!["configure", "no ip access-list standard acl1"]);
}

#[tokio::test]
async fn test_set_default_command_sequence() {
    let (server, node) = setup().await;
    mock_configure_ok(&server, 2).await;

    node.standard_acls().set_default("acl1").await.unwrap();

    let cmds = single_request_cmds(&server).await;
    assert_eq!(cmds, vec!["configure", "default ip access-list standard acl1"]);
}

#[tokio::test]
async fn test_add_entry_command_sequence() {
    let (server, node) = setup().await;
    mock_configure_ok(&server, 4).await;

    node.standard_acls()
        .add_entry("acl1", AclAction::Permit, addr("10.0.0.0"), 8, false)
        .await
        .unwrap();

    let cmds = single_request_cmds(&server).await;
    assert_eq!(
        cmds,
        vec![
            "configure",
            "ip access-list standard acl1",
            "permit 10.0.0.0/8",
            "exit",
        ]
    );
}

#[tokio::test]
async fn test_update_entry_command_sequence() {
    let (server, node) = setup().await;
    mock_configure_ok(&server, 5).await;

    node.standard_acls()
        .update_entry("acl1", 20, AclAction::Deny, addr("10.0.0.0"), 24, true)
        .await
        .unwrap();

    let cmds = single_request_cmds(&server).await;
    assert_eq!(
        cmds,
        vec![
            "configure",
            "ip access-list standard acl1",
            "no 20",
            "20 deny 10.0.0.0/24 log",
            "exit",
        ]
    );
}

#[tokio::test]
async fn test_remove_entry_command_sequence() {
    let (server, node) = setup().await;
    mock_configure_ok(&server, 4).await;

    node.standard_acls().remove_entry("acl1", 10).await.unwrap();

    let cmds = single_request_cmds(&server).await;
    assert_eq!(
        cmds,
        vec![
            "configure",
            "ip access-list standard acl1",
            "no 10",
            "exit",
        ]
    );
}

#[tokio::test]
async fn test_rejected_mutation_surfaces_partial_progress() {
    let (server, node) = setup().await;

    // The device rejects the replacement rule after the removal at
    // `no 20` already succeeded; the error data shows how far it got.
    Mock::given(method("POST"))
        .and(path("/command-api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": "test",
            "error": {
                "code": 1002,
                "message": "CLI command 4 of 5 '20 deny 10.0.0.0/24' failed: invalid command",
                "data": [{}, {}, {}, { "errors": ["Invalid input"] }],
            },
        })))
        .mount(&server)
        .await;

    let result = node
        .standard_acls()
        .update_entry("acl1", 20, AclAction::Deny, addr("10.0.0.0"), 24, false)
        .await;

    match result {
        Err(Error::CommandFailed { code, ref outputs, .. }) => {
            assert_eq!(code, 1002);
            assert_eq!(outputs.len(), 4);
        }
        other => panic!("expected CommandFailed, got: {other:?}"),
    }
}
