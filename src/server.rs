//! JSON-lines command protocol.
//!
//! Each input line is one command:
//! `{"id": .., "method": "create" | "get" | "batchUpdate", "params": {..}}`.
//! Each output line answers one command with the same `id` and either a
//! `result` or an `error` carrying an HTTP-equivalent status. Commands run
//! concurrently; replies may arrive out of order and are matched by `id`.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::error::{DocsError, Result};
use crate::request::{BatchUpdateRequest, BatchUpdateResponse, CreateDocumentRequest};
use crate::store::{DocumentService, DocumentStorage};

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    id: Value,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentParams {
    document_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchUpdateParams {
    document_id: String,
    #[serde(flatten)]
    batch: BatchUpdateRequest,
}

#[derive(Debug, Serialize)]
struct Reply {
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorBody>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    status: u16,
    message: String,
}

fn decode<T: DeserializeOwned>(params: Value) -> Result<T> {
    let params = if params.is_null() {
        Value::Object(Default::default())
    } else {
        params
    };
    serde_json::from_value(params).map_err(|e| DocsError::MalformedRequest(e.to_string()))
}

async fn dispatch<S: DocumentStorage>(
    service: &DocumentService<S>,
    envelope: Envelope,
) -> Result<Value> {
    tracing::debug!("→ {} {}", envelope.method, envelope.params);

    match envelope.method.as_str() {
        "create" => {
            let params: CreateDocumentRequest = decode(envelope.params)?;
            let document = service.create(&params.title).await?;
            Ok(serde_json::to_value(document)?)
        }
        "get" => {
            let params: DocumentParams = decode(envelope.params)?;
            let document = service.get(&params.document_id).await?;
            Ok(serde_json::to_value(document)?)
        }
        "batchUpdate" => {
            let params: BatchUpdateParams = decode(envelope.params)?;
            let document = service
                .batch_update(&params.document_id, &params.batch.requests)
                .await?;
            Ok(serde_json::to_value(BatchUpdateResponse::for_document(
                &document,
            ))?)
        }
        other => Err(DocsError::MalformedRequest(format!(
            "unknown method: {}",
            other
        ))),
    }
}

/// Encode the reply line for one command.
fn encode_reply(id: Value, outcome: Result<Value>) -> String {
    let reply = match outcome {
        Ok(result) => Reply {
            id,
            result: Some(result),
            error: None,
        },
        Err(e) => {
            tracing::warn!("✗ request {} failed: {}", id, e);
            Reply {
                id,
                result: None,
                error: Some(ErrorBody {
                    status: e.status_code(),
                    message: e.to_string(),
                }),
            }
        }
    };

    serde_json::to_string(&reply).unwrap_or_else(|e| {
        format!(
            r#"{{"id":null,"error":{{"status":500,"message":"failed to encode reply: {}"}}}}"#,
            e
        )
    })
}

/// Handle one protocol line and return the reply line.
pub async fn handle_line<S: DocumentStorage>(service: &DocumentService<S>, line: &str) -> String {
    match serde_json::from_str::<Envelope>(line) {
        Ok(envelope) => {
            let id = envelope.id.clone();
            encode_reply(id, dispatch(service, envelope).await)
        }
        Err(e) => encode_reply(Value::Null, Err(DocsError::MalformedRequest(e.to_string()))),
    }
}

/// Serve commands from `reader` until EOF, writing replies to `writer`.
///
/// A line that is not valid UTF-8 gets a malformed-request reply. On a read
/// error, commands already accepted still finish and are answered before the
/// error is returned.
pub async fn serve<S, R, W>(
    service: Arc<DocumentService<S>>,
    mut reader: R,
    mut writer: W,
) -> std::io::Result<()>
where
    S: DocumentStorage + 'static,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let writer_task = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            writer.write_all(line.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
        Ok::<_, std::io::Error>(())
    });

    let mut tasks = JoinSet::new();
    let mut buf = Vec::new();
    let read_result = loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break Ok(()),
            Ok(_) => {}
            Err(e) => break Err(e),
        }

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim().to_string(),
            Err(e) => {
                let reply = encode_reply(
                    Value::Null,
                    Err(DocsError::MalformedRequest(format!("line is not UTF-8: {}", e))),
                );
                // Receiver only closes if the writer failed; that error surfaces below.
                let _ = tx.send(reply);
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }

        let service = Arc::clone(&service);
        let tx = tx.clone();
        tasks.spawn(async move {
            let reply = handle_line(&service, &line).await;
            let _ = tx.send(reply);
        });
    };

    while tasks.join_next().await.is_some() {}
    drop(tx);

    let write_result = writer_task
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    read_result.and(write_result)
}
