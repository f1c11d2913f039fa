//! # Node Runtime
//!
//! Opens the durable world state, seeds it on first start, and serves contract
//! invocations one JSON line at a time.
//!
//! ## Wire Format
//!
//! ```text
//! → {"function": "ReadTransaction", "args": ["2"]}
//! ← {"result": {"Amount": 50.0, ...}}
//! → {"function": "ReadTransaction", "args": ["9"]}
//! ← {"error": {"kind": "NotFound", "message": "the transaction 9 does not exist"}}
//! ```
//!
//! Each line is one top-level invocation and runs to completion before the
//! next line is read. Blank lines are skipped. A line that is not a valid
//! invocation gets an `InvalidRequest` error and the loop continues.
//!
//! ## Shutdown
//!
//! Blocking reads (stdin) happen on a dedicated thread that feeds a channel,
//! so `serve_until` can stop on a shutdown signal without waiting for input.

use std::future::Future;
use std::io::BufRead;

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use record_store::adapters::contract::error_response;
use record_store::{
    ContractHandler, FileBackedWorldState, Invocation, JsonTransactionSerializer, StoreConfig,
    StoreDependencies, TransactionStore, TransactionStoreApi,
};

use crate::config::NodeConfig;

/// Store served by the runtime.
pub type FileTransactionStore = TransactionStore<FileBackedWorldState, JsonTransactionSerializer>;

/// Error kind for request lines that do not parse as an invocation.
pub const INVALID_REQUEST: &str = "InvalidRequest";

/// The runtime: one store, one invocation handler.
pub struct NodeRuntime {
    handler: ContractHandler<FileTransactionStore>,
    config: NodeConfig,
}

impl NodeRuntime {
    /// Open the world state under `config.data_dir` and seed it if needed.
    ///
    /// ## Startup Sequence
    ///
    /// 1. Validate configuration
    /// 2. Lock and load the data directory
    /// 3. Reconcile the location index with `index_policy`
    /// 4. Run `InitLedger` if `seed_on_start` is set and there are no records
    pub fn open(config: NodeConfig) -> Result<Self> {
        config.validate()?;

        let world_state = FileBackedWorldState::open(&config.data_dir).with_context(|| {
            format!("failed to open world state in {}", config.data_dir.display())
        })?;

        let deps = StoreDependencies {
            world_state,
            serializer: JsonTransactionSerializer,
        };
        let store_config = StoreConfig::default().with_index_policy(config.index_policy);
        let mut store =
            TransactionStore::open(deps, store_config).context("failed to reconcile location index")?;

        if config.seed_on_start && !store.has_records().context("failed to inspect ledger")? {
            let seeded = store.init_ledger().context("failed to seed ledger")?;
            info!("Seeded empty ledger with {} transactions", seeded);
        }

        info!(
            "Record store ready: data_dir={}, location_index={}",
            config.data_dir.display(),
            config.index_policy
        );

        Ok(Self {
            handler: ContractHandler::new(store),
            config,
        })
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn store(&self) -> &FileTransactionStore {
        self.handler.store()
    }

    /// Answer one request line.
    pub fn handle_line(&mut self, line: &str) -> Value {
        match serde_json::from_str::<Invocation>(line) {
            Ok(invocation) => {
                debug!("Invoking {} ({} args)", invocation.function, invocation.args.len());
                self.handler.handle(&invocation)
            }
            Err(e) => error_response(INVALID_REQUEST, &e.to_string()),
        }
    }

    /// Serve request lines from `reader` until EOF, writing one response line
    /// per request to `writer`. Returns the number of requests answered.
    pub async fn serve<R, W>(&mut self, reader: R, mut writer: W) -> Result<u64>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        let mut served = 0u64;

        while let Some(line) = lines.next_line().await.context("failed to read request")? {
            if line.trim().is_empty() {
                continue;
            }
            self.respond(&line, &mut writer).await?;
            served += 1;
        }

        Ok(served)
    }

    /// Serve request lines from a channel until it closes or `shutdown`
    /// resolves. A request already being answered is finished first.
    pub async fn serve_until<W, F>(
        &mut self,
        mut requests: mpsc::Receiver<String>,
        mut writer: W,
        shutdown: F,
    ) -> Result<u64>
    where
        W: AsyncWrite + Unpin,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut served = 0u64;

        loop {
            let line = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested after {} invocations", served);
                    break;
                }
                line = requests.recv() => match line {
                    Some(line) => line,
                    None => {
                        info!("Input closed after {} invocations", served);
                        break;
                    }
                },
            };

            if line.trim().is_empty() {
                continue;
            }
            self.respond(&line, &mut writer).await?;
            served += 1;
        }

        Ok(served)
    }

    async fn respond<W>(&mut self, line: &str, writer: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let response = self.handle_line(line);
        let mut bytes = serde_json::to_vec(&response).context("failed to encode response")?;
        bytes.push(b'\n');
        writer
            .write_all(&bytes)
            .await
            .context("failed to write response")?;
        writer.flush().await.context("failed to write response")?;
        Ok(())
    }
}

/// Read lines from a blocking source on a dedicated thread.
///
/// The channel closes at EOF or on a read error. The thread also stops once
/// the receiver is dropped and the next line arrives; it is never joined, so a
/// read that never returns does not hold up process exit.
pub fn spawn_line_reader<R>(reader: R, capacity: usize) -> Result<mpsc::Receiver<String>>
where
    R: BufRead + Send + 'static,
{
    let (sender, receiver) = mpsc::channel(capacity);
    std::thread::Builder::new()
        .name("request-reader".to_string())
        .spawn(move || {
            for line in reader.lines() {
                match line {
                    Ok(line) => {
                        if sender.blocking_send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Failed to read request: {}", e);
                        break;
                    }
                }
            }
        })
        .context("failed to start request reader")?;
    Ok(receiver)
}
