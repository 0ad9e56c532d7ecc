// etcd implementation of the KvStore port, spoken over the v3 JSON gateway.
//
// The gateway carries keys and values as base64 and int64 fields as strings.
// Endpoints are tried in order on connect; the first one that answers a status
// request serves the whole session.

use crate::shared::infrastructure::kv_store::{
    KeyOrder, KeyValue, KvError, KvSession, KvStore, PutOutcome,
};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct EtcdGatewayStore {
    endpoints: Vec<String>,
    dial_timeout: Duration,
}

impl EtcdGatewayStore {
    pub fn new(endpoints: Vec<String>, dial_timeout: Duration) -> Self {
        Self {
            endpoints: endpoints.iter().map(|e| normalize_endpoint(e)).collect(),
            dial_timeout,
        }
    }

    #[cfg(test)]
    fn endpoints(&self) -> &[String] {
        &self.endpoints
    }
}

fn normalize_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}

/// Smallest key greater than every key starting with `prefix`.
fn prefix_range_end(prefix: &[u8]) -> Vec<u8> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < 0xff {
            end.push(last + 1);
            return end;
        }
    }
    // Every byte was 0xff: "\0" asks etcd for all keys >= prefix.
    vec![0]
}

fn decode(field: &str) -> Result<String, KvError> {
    let bytes = STANDARD
        .decode(field)
        .map_err(|err| KvError::Backend(format!("invalid base64 from gateway: {err}")))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn parse_i64(field: Option<&str>) -> i64 {
    field.and_then(|raw| raw.parse().ok()).unwrap_or(0)
}

#[derive(Serialize)]
struct RangeRequest {
    key: String,
    range_end: String,
    sort_order: &'static str,
    sort_target: &'static str,
}

#[derive(Serialize)]
struct PutRequest {
    key: String,
    value: String,
}

#[derive(Serialize)]
struct DeleteRangeRequest {
    key: String,
}

#[derive(Deserialize, Default)]
struct ResponseHeader {
    revision: Option<String>,
}

#[derive(Deserialize)]
struct GatewayKeyValue {
    key: String,
    #[serde(default)]
    value: String,
}

#[derive(Deserialize)]
struct RangeResponse {
    #[serde(default)]
    kvs: Vec<GatewayKeyValue>,
}

#[derive(Deserialize)]
struct PutResponse {
    #[serde(default)]
    header: ResponseHeader,
}

#[derive(Deserialize)]
struct DeleteRangeResponse {
    deleted: Option<String>,
}

#[async_trait]
impl KvStore for EtcdGatewayStore {
    async fn connect(&self) -> Result<Box<dyn KvSession>, KvError> {
        let client = Client::builder()
            .connect_timeout(self.dial_timeout)
            .build()
            .map_err(|err| KvError::Connect(format!("failed to build http client: {err}")))?;

        let mut failures = Vec::new();
        for endpoint in &self.endpoints {
            let reachable = client
                .post(format!("{endpoint}/v3/maintenance/status"))
                .json(&serde_json::json!({}))
                .timeout(self.dial_timeout)
                .send()
                .await
                .and_then(|response| response.error_for_status());
            match reachable {
                Ok(_) => {
                    tracing::debug!(endpoint = %endpoint, "etcd endpoint reachable");
                    return Ok(Box::new(EtcdGatewaySession {
                        client,
                        endpoint: endpoint.clone(),
                    }));
                }
                Err(err) => {
                    tracing::debug!(
                        endpoint = %endpoint,
                        error = %err,
                        "etcd endpoint unreachable"
                    );
                    failures.push(format!("{endpoint}: {err}"));
                }
            }
        }
        Err(KvError::Connect(format!(
            "no etcd endpoint reachable ({})",
            failures.join("; ")
        )))
    }
}

struct EtcdGatewaySession {
    client: Client,
    endpoint: String,
}

impl EtcdGatewaySession {
    async fn call<B, R>(&self, path: &str, body: &B) -> Result<R, KvError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(format!("{}{path}", self.endpoint))
            .json(body)
            .send()
            .await
            .map_err(|err| KvError::Backend(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(KvError::Backend(format!("{status}: {text}")));
        }
        response
            .json::<R>()
            .await
            .map_err(|err| KvError::Backend(format!("unexpected gateway response: {err}")))
    }
}

#[async_trait]
impl KvSession for EtcdGatewaySession {
    async fn get_prefix(&self, prefix: &str, order: KeyOrder) -> Result<Vec<KeyValue>, KvError> {
        let request = RangeRequest {
            key: STANDARD.encode(prefix),
            range_end: STANDARD.encode(prefix_range_end(prefix.as_bytes())),
            sort_order: match order {
                KeyOrder::Ascending => "ASCEND",
                KeyOrder::Descending => "DESCEND",
            },
            sort_target: "KEY",
        };
        let response: RangeResponse = self.call("/v3/kv/range", &request).await?;
        response
            .kvs
            .iter()
            .map(|kv| -> Result<KeyValue, KvError> {
                Ok(KeyValue {
                    key: decode(&kv.key)?,
                    value: decode(&kv.value)?,
                })
            })
            .collect()
    }

    async fn put(&self, key: &str, value: &str) -> Result<PutOutcome, KvError> {
        let request = PutRequest {
            key: STANDARD.encode(key),
            value: STANDARD.encode(value),
        };
        let response: PutResponse = self.call("/v3/kv/put", &request).await?;
        Ok(PutOutcome {
            revision: parse_i64(response.header.revision.as_deref()),
        })
    }

    async fn delete(&self, key: &str) -> Result<u64, KvError> {
        let request = DeleteRangeRequest {
            key: STANDARD.encode(key),
        };
        let response: DeleteRangeResponse = self.call("/v3/kv/deleterange", &request).await?;
        Ok(parse_i64(response.deleted.as_deref()).max(0) as u64)
    }

    // The gateway is stateless; dropping the client releases its pooled sockets.
    async fn close(&self) -> Result<(), KvError> {
        Ok(())
    }
}

#[cfg(test)]
mod etcd_gateway_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(b"operation_".as_slice(), b"operation`".to_vec())]
    #[case(b"a\xff".as_slice(), b"b".to_vec())]
    #[case(b"\xff\xff".as_slice(), vec![0])]
    fn it_should_compute_the_prefix_range_end(#[case] prefix: &[u8], #[case] expected: Vec<u8>) {
        assert_eq!(prefix_range_end(prefix), expected);
    }

    #[rstest]
    #[case("etcd:2379", "http://etcd:2379")]
    #[case("http://etcd:22379/", "http://etcd:22379")]
    #[case(" https://etcd:32379 ", "https://etcd:32379")]
    fn it_should_normalize_endpoints(#[case] raw: &str, #[case] expected: &str) {
        let store = EtcdGatewayStore::new(vec![raw.to_string()], Duration::from_secs(5));
        assert_eq!(store.endpoints(), [expected.to_string()]);
    }

    #[rstest]
    fn it_should_decode_a_range_response() {
        let raw = r#"{
            "header": {"revision": "12"},
            "kvs": [
                {"key": "b3BlcmF0aW9uXzA3", "value": "LTQ=", "mod_revision": "9"},
                {"key": "b3BlcmF0aW9uXzQy", "value": "MTA="}
            ],
            "count": "2"
        }"#;
        let response: RangeResponse = serde_json::from_str(raw).unwrap();
        let decoded: Vec<_> = response
            .kvs
            .iter()
            .map(|kv| (decode(&kv.key).unwrap(), decode(&kv.value).unwrap()))
            .collect();
        assert_eq!(
            decoded,
            vec![
                ("operation_07".to_string(), "-4".to_string()),
                ("operation_42".to_string(), "10".to_string()),
            ]
        );
    }

    #[rstest]
    fn it_should_decode_an_empty_range_response() {
        let response: RangeResponse = serde_json::from_str(r#"{"header": {}}"#).unwrap();
        assert!(response.kvs.is_empty());
    }

    #[rstest]
    fn it_should_read_int64_fields_sent_as_strings() {
        let put: PutResponse = serde_json::from_str(r#"{"header": {"revision": "31"}}"#).unwrap();
        assert_eq!(parse_i64(put.header.revision.as_deref()), 31);
        let deleted: DeleteRangeResponse = serde_json::from_str(r#"{"header": {}}"#).unwrap();
        assert_eq!(parse_i64(deleted.deleted.as_deref()), 0);
    }

    #[rstest]
    fn it_should_encode_the_range_request_for_a_prefix() {
        let request = RangeRequest {
            key: STANDARD.encode("operation_"),
            range_end: STANDARD.encode(prefix_range_end(b"operation_")),
            sort_order: "ASCEND",
            sort_target: "KEY",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["key"], "b3BlcmF0aW9uXw==");
        assert_eq!(json["range_end"], "b3BlcmF0aW9uYA==");
        assert_eq!(json["sort_target"], "KEY");
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_fail_to_connect_when_no_endpoint_answers() {
        let store = EtcdGatewayStore::new(
            vec!["127.0.0.1:1".to_string()],
            Duration::from_millis(500),
        );
        let result = store.connect().await;
        match result {
            Err(KvError::Connect(message)) => assert!(message.contains("http://127.0.0.1:1")),
            Err(other) => panic!("unexpected error: {other:?}"),
            Ok(_) => panic!("expected connect to fail"),
        }
    }
}
