//! API Server Module
//!
//! This module implements the JSON-RPC server the consensus engine talks to.
//! Every callback is routed through a single mutex around the orchestrator,
//! so at most one of them runs at a time on this node.
//!
//! # Methods
//! - `prepareProposal`: build the proposer's transaction list
//! - `processProposal`: verify a received proposal (`ACCEPT` / `REJECT`)
//! - `finalizeBlock`: dequeue the batch due now and queue the announced one
//! - `getBatch`: return the batch due at a height
//! - `getProposer`: return the proposer who committed the batch due at a height

use crate::{
    RawTx, RejectReason, Verdict,
    batch::BatchOrchestrator,
    config::ApiConfig,
    scheduler::ProposalRequest,
    store::KvStore,
    validation::ProcessRequest,
};
use axum::{Json, Router, extract::State, routing::post};
use ethers::types::Bytes;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;
const INTERNAL_ERROR: i32 = -32603;
/// Pipeline failure that must stop the current consensus step
const PIPELINE_ERROR: i32 = -32000;

/// Shared state handed to every request handler
///
/// Cloned per request by axum; all clones point at the same orchestrator.
pub struct AppState<S> {
    /// The node's pipeline, locked for the duration of each callback
    orchestrator: Arc<Mutex<BatchOrchestrator<S>>>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            orchestrator: self.orchestrator.clone(),
        }
    }
}

/// The main API server struct
pub struct Server<S> {
    config: ApiConfig,
    state: AppState<S>,
}

impl<S: KvStore> Server<S> {
    /// Creates a new API server instance
    ///
    /// # Arguments
    /// * `config` - Listen address settings
    /// * `orchestrator` - The node's delayed-commit pipeline
    pub fn new(config: ApiConfig, orchestrator: BatchOrchestrator<S>) -> Self {
        let state = AppState {
            orchestrator: Arc::new(Mutex::new(orchestrator)),
        };
        Self { config, state }
    }

    /// Router with the single JSON-RPC endpoint at "/"
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", post(handle_rpc::<S>))
            .with_state(self.state.clone())
    }

    /// Starts the API server and begins listening for incoming requests
    pub async fn start(self) -> anyhow::Result<()> {
        let app = self.router();

        let addr = format!("{}:{}", self.config.host, self.config.port);
        info!("API server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// JSON-RPC 2.0 request structure
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    /// Protocol version, expected to be "2.0"
    #[allow(dead_code)]
    jsonrpc: String,
    /// Name of the callback to invoke
    method: String,
    /// Method parameters, decoded per method
    #[serde(default)]
    params: Value,
    /// Request identifier echoed back in the response
    id: Value,
}

/// JSON-RPC 2.0 response structure
///
/// Either `result` or `error` is populated, never both.
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    /// Protocol version, always "2.0"
    jsonrpc: String,
    /// Result of a successful call
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    /// Error of a failed call
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
    /// Identifier of the request being answered
    id: Value,
}

/// JSON-RPC 2.0 error object
#[derive(Debug, Serialize)]
struct JsonRpcError {
    /// Standard code, or `PIPELINE_ERROR` for failed callbacks
    code: i32,
    /// Human-readable error description
    message: String,
}

#[derive(Debug, Serialize)]
struct PrepareProposalResult {
    txs: Vec<RawTx>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
enum ProposalStatus {
    Accept,
    Reject,
}

#[derive(Debug, Serialize)]
struct ProcessProposalResult {
    status: ProposalStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<RejectReason>,
}

#[derive(Debug, Deserialize)]
struct FinalizeBlockParams {
    height: u64,
    txs: Vec<RawTx>,
}

/// Parameters of the height-indexed queries
#[derive(Debug, Deserialize)]
struct HeightParams {
    height: u64,
}

#[derive(Debug, Serialize)]
struct ProposerResult {
    proposer: Bytes,
}

fn success(id: Value, result: impl Serialize) -> Json<JsonRpcResponse> {
    match serde_json::to_value(result) {
        Ok(value) => Json(JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(value),
            error: None,
            id,
        }),
        Err(e) => failure(id, INTERNAL_ERROR, e.to_string()),
    }
}

fn failure(id: Value, code: i32, message: String) -> Json<JsonRpcResponse> {
    Json(JsonRpcResponse {
        jsonrpc: "2.0".to_string(),
        result: None,
        error: Some(JsonRpcError { code, message }),
        id,
    })
}

fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, String> {
    serde_json::from_value(params).map_err(|e| format!("Invalid params: {}", e))
}

/// Main RPC request handler
///
/// Routes the request to the matching callback by method name.
///
/// # Arguments
/// * `state` - Shared orchestrator handle
/// * `request` - The decoded JSON-RPC request
///
/// # Returns
/// A JSON-RPC response. A rejected proposal is a successful call whose result
/// carries the `REJECT` status; callback failures carry `PIPELINE_ERROR`.
async fn handle_rpc<S: KvStore>(
    State(state): State<AppState<S>>,
    Json(request): Json<JsonRpcRequest>,
) -> Json<JsonRpcResponse> {
    info!("Received RPC request: {}", request.method);

    let JsonRpcRequest {
        method, params, id, ..
    } = request;

    macro_rules! params {
        ($ty:ty) => {
            match parse_params::<$ty>(params) {
                Ok(p) => p,
                Err(message) => {
                    error!("{} for {}", message, method);
                    return failure(id, INVALID_PARAMS, message);
                }
            }
        };
    }

    let orchestrator = state.orchestrator.lock().await;

    match method.as_str() {
        "prepareProposal" => {
            let req = params!(ProposalRequest);
            match orchestrator.prepare_proposal(req).await {
                Ok(txs) => success(id, PrepareProposalResult { txs }),
                Err(e) => {
                    error!("PrepareProposal failed: {}", e);
                    failure(id, PIPELINE_ERROR, e.to_string())
                }
            }
        }
        "processProposal" => {
            let req = params!(ProcessRequest);
            match orchestrator.process_proposal(&req).await {
                Verdict::Accepted => success(
                    id,
                    ProcessProposalResult {
                        status: ProposalStatus::Accept,
                        reason: None,
                    },
                ),
                Verdict::Rejected { reason } => success(
                    id,
                    ProcessProposalResult {
                        status: ProposalStatus::Reject,
                        reason: Some(reason),
                    },
                ),
                Verdict::Fatal { cause } => {
                    error!("ProcessProposal failed: {}", cause);
                    failure(id, PIPELINE_ERROR, cause.to_string())
                }
            }
        }
        "finalizeBlock" => {
            let req = params!(FinalizeBlockParams);
            match orchestrator.finalize_block(req.height, &req.txs).await {
                Ok(finalized) => success(id, finalized),
                Err(e) => {
                    error!("FinalizeBlock failed at height {}: {}", req.height, e);
                    failure(id, PIPELINE_ERROR, e.to_string())
                }
            }
        }
        "getBatch" => {
            let req = params!(HeightParams);
            match orchestrator.batch(req.height).await {
                Ok(batch) => success(id, batch),
                Err(e) => {
                    warn!("getBatch failed for height {}: {}", req.height, e);
                    failure(id, PIPELINE_ERROR, e.to_string())
                }
            }
        }
        "getProposer" => {
            let req = params!(HeightParams);
            match orchestrator.proposer(req.height).await {
                Ok(proposer) => success(id, ProposerResult { proposer }),
                Err(e) => {
                    warn!("getProposer failed for height {}: {}", req.height, e);
                    failure(id, PIPELINE_ERROR, e.to_string())
                }
            }
        }
        _ => failure(id, METHOD_NOT_FOUND, "Method not found".to_string()),
    }
}
