use artdid_types::{Address, TxId};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};
use crate::transport::{LedgerQuery, LedgerTransaction, LedgerTransport, QueryResponse, TxReceipt};

/// Body of `POST /v1/transactions`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub from: Address,
    pub transaction: LedgerTransaction,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub tx_id: TxId,
}

/// Ledger transport speaking JSON to a ledger node bridge.
///
/// - `POST {endpoint}/v1/query` with a [`LedgerQuery`] returns a [`QueryResponse`]
/// - `POST {endpoint}/v1/transactions` with a [`SubmitRequest`] returns a [`SubmitResponse`]
/// - `GET {endpoint}/v1/transactions/{txId}/receipt?confirmations=n` blocks
///   until the transaction is final and returns its [`TxReceipt`]
///
/// The bridge holds the signing key for `signer`.
#[derive(Clone, Debug)]
pub struct HttpLedgerTransport {
    endpoint: String,
    signer: Address,
    client: Client,
}

impl HttpLedgerTransport {
    pub fn new(endpoint: &str, signer: Address) -> LedgerResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("artdid/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LedgerError::unavailable(format!("building HTTP client: {e}")))?;
        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            signer,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> LedgerResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(LedgerError::unavailable(format!("bridge returned HTTP {status}: {body}")));
    }
    response
        .json()
        .await
        .map_err(|e| LedgerError::unavailable(format!("undecodable bridge response: {e}")))
}

#[async_trait]
impl LedgerTransport for HttpLedgerTransport {
    fn signer(&self) -> &Address {
        &self.signer
    }

    async fn query(&self, query: &LedgerQuery) -> LedgerResult<QueryResponse> {
        let response = self
            .client
            .post(format!("{}/v1/query", self.endpoint))
            .json(query)
            .send()
            .await
            .map_err(LedgerError::unavailable)?;
        decode(response).await
    }

    async fn submit(&self, transaction: &LedgerTransaction) -> LedgerResult<TxId> {
        let request = SubmitRequest {
            from: self.signer.clone(),
            transaction: transaction.clone(),
        };
        let response = self
            .client
            .post(format!("{}/v1/transactions", self.endpoint))
            .json(&request)
            .send()
            .await
            .map_err(LedgerError::unavailable)?;
        let submitted: SubmitResponse = decode(response).await?;
        Ok(submitted.tx_id)
    }

    async fn wait_for_receipt(&self, tx_id: &TxId, confirmations: u64) -> LedgerResult<TxReceipt> {
        let response = self
            .client
            .get(format!("{}/v1/transactions/{tx_id}/receipt", self.endpoint))
            .query(&[("confirmations", confirmations)])
            .send()
            .await
            .map_err(LedgerError::unavailable)?;
        decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;
    use crate::gateway::LedgerGateway;
    use crate::memory::InMemoryLedger;
    use artdid_types::ContentAddress;
    use axum::extract::{Path, Query, State};
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use std::collections::HashMap;
    use std::sync::Arc;

    type Bridge = Arc<InMemoryLedger>;

    async fn query(
        State(ledger): State<Bridge>,
        Json(q): Json<LedgerQuery>,
    ) -> Result<Json<QueryResponse>, StatusCode> {
        let conn = ledger.connect(Address::empty());
        conn.query(&q).await.map(Json).map_err(|_| StatusCode::SERVICE_UNAVAILABLE)
    }

    async fn submit(
        State(ledger): State<Bridge>,
        Json(req): Json<SubmitRequest>,
    ) -> Result<Json<SubmitResponse>, StatusCode> {
        let conn = ledger.connect(req.from);
        conn.submit(&req.transaction)
            .await
            .map(|tx_id| Json(SubmitResponse { tx_id }))
            .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)
    }

    async fn receipt(
        State(ledger): State<Bridge>,
        Path(tx_id): Path<String>,
        Query(params): Query<HashMap<String, u64>>,
    ) -> Result<Json<TxReceipt>, StatusCode> {
        let confirmations = params.get("confirmations").copied().unwrap_or(1);
        let conn = ledger.connect(Address::empty());
        conn.wait_for_receipt(&TxId::new(tx_id), confirmations)
            .await
            .map(Json)
            .map_err(|_| StatusCode::NOT_FOUND)
    }

    async fn spawn_bridge(ledger: Bridge) -> String {
        let app = Router::new()
            .route("/v1/query", post(query))
            .route("/v1/transactions", post(submit))
            .route("/v1/transactions/:tx_id/receipt", get(receipt))
            .with_state(ledger);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn alice() -> Address {
        Address::new("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa")
    }

    fn bob() -> Address {
        Address::new("0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb")
    }

    #[tokio::test]
    async fn gateway_over_http_bridge() {
        let ledger = Arc::new(InMemoryLedger::new());
        let endpoint = spawn_bridge(ledger.clone()).await;
        let transport = HttpLedgerTransport::new(&format!("{endpoint}/"), alice()).unwrap();
        assert_eq!(transport.endpoint(), endpoint);
        let gw = LedgerGateway::new(Arc::new(transport), LedgerConfig::default());

        let reg = gw.register(&ContentAddress::new("Qm123")).await.unwrap();
        gw.update(&reg.record_id, &ContentAddress::new("Qm456"), 1).await.unwrap();
        gw.transfer_ownership(&reg.record_id, &bob()).await.unwrap();

        let record = gw.get_full(&reg.record_id).await.unwrap();
        assert_eq!(record.version(), 2);
        assert_eq!(record.owner_history, vec![alice(), bob()]);
        assert_eq!(ledger.record_count(), 1);
    }

    #[tokio::test]
    async fn reverts_travel_through_the_bridge() {
        let ledger = Arc::new(InMemoryLedger::new());
        let endpoint = spawn_bridge(ledger.clone()).await;
        let as_alice = LedgerGateway::new(
            Arc::new(HttpLedgerTransport::new(&endpoint, alice()).unwrap()),
            LedgerConfig::default(),
        );
        let as_bob = LedgerGateway::new(
            Arc::new(HttpLedgerTransport::new(&endpoint, bob()).unwrap()),
            LedgerConfig::default(),
        );
        let reg = as_alice.register(&ContentAddress::new("Qm123")).await.unwrap();
        let err = as_bob.transfer_ownership(&reg.record_id, &bob()).await.unwrap_err();
        assert!(matches!(err, LedgerError::OwnerAuthorizationDenied { .. }));
    }

    #[tokio::test]
    async fn bridge_error_status_is_unavailable() {
        let ledger = Arc::new(InMemoryLedger::new());
        let endpoint = spawn_bridge(ledger.clone()).await;
        ledger.set_online(false);
        let transport = HttpLedgerTransport::new(&endpoint, alice()).unwrap();
        let err = transport
            .query(&LedgerQuery::RecordExists {
                record_id: artdid_types::RecordId::new("0x1"),
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn unreachable_bridge_is_unavailable() {
        let transport = HttpLedgerTransport::new("http://127.0.0.1:1", alice()).unwrap();
        let err = transport
            .submit(&LedgerTransaction::RegisterRecord {
                content_address: ContentAddress::new("Qm123"),
            })
            .await
            .unwrap_err();
        assert!(err.is_unavailable());
    }
}
