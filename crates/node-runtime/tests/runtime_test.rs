//! # Runtime Integration Tests
//!
//! Drive `NodeRuntime::serve` and `serve_until` with in-memory request streams
//! and check the response lines and what ends up on disk.

use std::time::Duration;

use node_runtime::{spawn_line_reader, NodeConfig, NodeRuntime, INVALID_REQUEST};
use record_store::TransactionStoreApi;
use serde_json::{json, Value};

fn open_runtime(dir: &std::path::Path) -> NodeRuntime {
    let config = NodeConfig {
        data_dir: dir.to_path_buf(),
        ..NodeConfig::default()
    };
    NodeRuntime::open(config).unwrap()
}

async fn serve(runtime: &mut NodeRuntime, input: &str) -> Vec<Value> {
    let mut output = Vec::new();
    runtime.serve(input.as_bytes(), &mut output).await.unwrap();
    parse_responses(output)
}

fn parse_responses(output: Vec<u8>) -> Vec<Value> {
    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn test_serve_answers_each_line_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut runtime = open_runtime(dir.path());

    let input = concat!(
        r#"{"function":"TransactionExists","args":["1"]}"#,
        "\n",
        r#"{"function":"ReadTransaction","args":["2"]}"#,
        "\n",
        "\n",
        r#"{"function":"DeleteTransaction","args":["3"]}"#,
        "\n",
        r#"{"function":"GetAllTransactions"}"#,
        "\n",
    );
    let responses = serve(&mut runtime, input).await;

    assert_eq!(responses.len(), 4);
    assert_eq!(responses[0], json!({ "result": true }));
    assert_eq!(responses[1]["result"]["Sender"], json!("John Jones"));
    assert_eq!(responses[1]["result"]["Amount"], json!(50.0));
    assert_eq!(responses[2], json!({ "result": null }));
    assert_eq!(responses[3]["result"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_serve_reports_errors_and_keeps_going() {
    let dir = tempfile::tempdir().unwrap();
    let mut runtime = open_runtime(dir.path());

    let input = concat!(
        "{broken\n",
        r#"{"function":"ReadTransaction","args":["99"]}"#,
        "\n",
        r#"{"function":"Mint","args":[]}"#,
        "\n",
        r#"{"function":"TransactionExists","args":["4"]}"#,
        "\n",
    );
    let responses = serve(&mut runtime, input).await;

    assert_eq!(responses[0]["error"]["kind"], json!(INVALID_REQUEST));
    assert_eq!(responses[1]["error"]["kind"], json!("NotFound"));
    assert_eq!(responses[2]["error"]["kind"], json!("UnknownFunction"));
    assert_eq!(responses[3], json!({ "result": true }));
}

#[tokio::test]
async fn test_writes_persist_across_restart() {
    let dir = tempfile::tempdir().unwrap();
    let purchase = r#"{"AmountInGrams":7,"AmountInMiligramsOfTotalTHC":1400,"Category":"Flower","Cost":60,"FedTax":6,"Name":"Gelato","StateTax":8,"THCPercent":0.2,"WeFee":1}"#;
    let create = json!({
        "function": "CreateTransaction",
        "args": ["7", "60", "Brooklyn", "Dispensary 7", "Ada", "Pending", "2023-10-02 09:00:00", purchase, "PUREPU"],
    });

    {
        let mut runtime = open_runtime(dir.path());
        let responses = serve(&mut runtime, &format!("{}\n", create)).await;
        assert_eq!(responses[0], json!({ "result": null }));
    }

    let mut runtime = open_runtime(dir.path());
    assert_eq!(runtime.store().read("7").unwrap().purchase.name, "Gelato");

    let responses = serve(
        &mut runtime,
        "{\"function\":\"ReadTransactionByLocation\",\"args\":[\"Brooklyn\"]}\n",
    )
    .await;
    let found = responses[0]["result"].as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["TransactionID"], json!("7"));
}

#[tokio::test]
async fn test_second_runtime_on_same_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let _first = open_runtime(dir.path());

    let config = NodeConfig {
        data_dir: dir.path().to_path_buf(),
        ..NodeConfig::default()
    };
    assert!(NodeRuntime::open(config).is_err());
}

#[tokio::test]
async fn test_serve_until_stops_on_shutdown_while_input_stays_open() {
    let dir = tempfile::tempdir().unwrap();
    let mut runtime = open_runtime(dir.path());

    let (requests, receiver) = tokio::sync::mpsc::channel(4);
    requests
        .send(r#"{"function":"TransactionExists","args":["1"]}"#.to_string())
        .await
        .unwrap();

    let (stop, stopped) = tokio::sync::oneshot::channel::<()>();
    let shutdown = async {
        let _ = stopped.await;
    };
    let trigger = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let _ = stop.send(());
    };

    let mut output = Vec::new();
    let (served, ()) = tokio::time::timeout(Duration::from_secs(5), async {
        tokio::join!(runtime.serve_until(receiver, &mut output, shutdown), trigger)
    })
    .await
    .expect("serve_until kept waiting for input after shutdown");

    assert_eq!(served.unwrap(), 1);
    assert_eq!(parse_responses(output), vec![json!({ "result": true })]);
    // The sender stayed open the whole time, so only shutdown ended the loop
    drop(requests);
}

#[tokio::test]
async fn test_line_reader_feeds_serve_until_to_eof() {
    let dir = tempfile::tempdir().unwrap();
    let mut runtime = open_runtime(dir.path());

    let input = concat!(
        r#"{"function":"DeleteTransaction","args":["2"]}"#,
        "\n",
        "\n",
        r#"{"function":"TransactionExists","args":["2"]}"#,
        "\n",
    );
    let requests = spawn_line_reader(std::io::Cursor::new(input.as_bytes().to_vec()), 1).unwrap();

    let mut output = Vec::new();
    let served = runtime
        .serve_until(requests, &mut output, std::future::pending())
        .await
        .unwrap();

    assert_eq!(served, 2);
    assert_eq!(
        parse_responses(output),
        vec![json!({ "result": null }), json!({ "result": false })]
    );
}
