//! CloudTrail 로그 번들 스트리밍 디코더
//!
//! 번들은 `{"Records": [ ... ]}` 형태의 큰 JSON 문서입니다. 전체를 메모리에 올리지 않도록
//! blocking 스레드에서 `serde_json` 스트림 디코더로 레코드를 하나씩 꺼내 채널로 넘기고,
//! async 쪽에서는 도착하는 대로 인덱싱합니다.
//!
//! ```text
//! ObjectReader ─SyncIoBridge─> serde_json::Deserializer ─mpsc─> RecordStream::next()
//! ```
//!
//! 소비자가 스트림을 버리면 디코더는 다음 레코드를 보내려다 멈춥니다.

use std::fmt;
use std::io::BufReader;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::{self, DeserializeSeed, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde_json::{Map, Value};
use syslogidx_core::storage::ObjectReader;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::io::SyncIoBridge;

use crate::error::CloudTrailError;

/// 디코더와 인덱서 사이에 대기할 수 있는 레코드 수
const RECORD_BUFFER: usize = 64;

/// 레코드 하나 (원래 키 순서 유지)
pub type Record = Map<String, Value>;

/// 스트리밍으로 디코딩되는 레코드 시퀀스
pub struct RecordStream {
    rx: mpsc::Receiver<Record>,
    decoder: Option<JoinHandle<Result<usize, CloudTrailError>>>,
}

impl RecordStream {
    /// `reader`에서 번들 디코딩을 시작합니다.
    ///
    /// tokio 런타임 안에서 호출해야 합니다.
    pub fn spawn(reader: ObjectReader) -> Self {
        let (tx, rx) = mpsc::channel(RECORD_BUFFER);
        let bridge = SyncIoBridge::new(reader);
        let decoder = tokio::task::spawn_blocking(move || decode_bundle(BufReader::new(bridge), tx));
        Self {
            rx,
            decoder: Some(decoder),
        }
    }

    /// 다음 레코드를 반환합니다.
    ///
    /// 레코드를 모두 소비하면 `Ok(None)`, 번들이 손상되었으면 마지막에 `Err`를 반환합니다.
    pub async fn next(&mut self) -> Result<Option<Record>, CloudTrailError> {
        if let Some(record) = self.rx.recv().await {
            return Ok(Some(record));
        }
        match self.decoder.take() {
            Some(decoder) => match decoder.await {
                Ok(Ok(_)) => Ok(None),
                Ok(Err(e)) => Err(e),
                Err(e) => Err(CloudTrailError::Decode(format!("decoder task failed: {e}"))),
            },
            None => Ok(None),
        }
    }
}

/// 번들 전체를 디코딩하며 레코드를 `tx`로 보냅니다. 보낸 레코드 수를 반환합니다.
///
/// `Records` 키가 없으면 빈 번들로 취급합니다.
fn decode_bundle<R: std::io::Read>(
    reader: R,
    tx: mpsc::Sender<Record>,
) -> Result<usize, CloudTrailError> {
    let mut de = serde_json::Deserializer::from_reader(reader);
    let count = BundleSeed { tx: &tx }
        .deserialize(&mut de)
        .map_err(|e| CloudTrailError::Decode(e.to_string()))?;
    de.end()
        .map_err(|e| CloudTrailError::Decode(e.to_string()))?;
    Ok(count)
}

struct BundleSeed<'a> {
    tx: &'a mpsc::Sender<Record>,
}

impl<'de> DeserializeSeed<'de> for BundleSeed<'_> {
    type Value = usize;

    fn deserialize<D: de::Deserializer<'de>>(self, deserializer: D) -> Result<usize, D::Error> {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for BundleSeed<'_> {
    type Value = usize;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a CloudTrail log object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<usize, A::Error> {
        let mut count = 0;
        while let Some(key) = map.next_key::<String>()? {
            if key == "Records" {
                count += map.next_value_seed(RecordsSeed { tx: self.tx })?;
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        Ok(count)
    }
}

struct RecordsSeed<'a> {
    tx: &'a mpsc::Sender<Record>,
}

impl<'de> DeserializeSeed<'de> for RecordsSeed<'_> {
    type Value = usize;

    fn deserialize<D: de::Deserializer<'de>>(self, deserializer: D) -> Result<usize, D::Error> {
        deserializer.deserialize_seq(self)
    }
}

impl<'de> Visitor<'de> for RecordsSeed<'_> {
    type Value = usize;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array of CloudTrail records")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<usize, A::Error> {
        let mut count = 0;
        while let Some(record) = seq.next_element::<Record>()? {
            self.tx
                .blocking_send(record)
                .map_err(|_| <A::Error as de::Error>::custom("record consumer stopped"))?;
            count += 1;
        }
        Ok(count)
    }
}

/// 레코드의 `eventTime`을 UTC로 파싱합니다.
pub fn event_time(record: &Record) -> Option<DateTime<Utc>> {
    let raw = record.get("eventTime")?.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// 레코드에 `@timestamp`, `@version`, `@app`을 추가하고 다시 인코딩합니다.
///
/// 원래 필드는 순서와 값이 그대로 유지됩니다. `app_tag`가 비어 있으면 `@app`을 생략합니다.
pub fn enrich(
    mut record: Record,
    time: &DateTime<Utc>,
    app_tag: &str,
) -> Result<Vec<u8>, CloudTrailError> {
    record.insert(
        "@timestamp".to_owned(),
        Value::String(time.to_rfc3339_opts(SecondsFormat::Secs, true)),
    );
    record.insert("@version".to_owned(), Value::String("1".to_owned()));
    if !app_tag.is_empty() {
        record.insert("@app".to_owned(), Value::String(app_tag.to_owned()));
    }
    serde_json::to_vec(&record).map_err(|e| CloudTrailError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn reader(body: &str) -> ObjectReader {
        Box::pin(Cursor::new(body.as_bytes().to_vec()))
    }

    async fn collect(body: &str) -> Result<Vec<Record>, CloudTrailError> {
        let mut stream = RecordStream::spawn(reader(body));
        let mut out = Vec::new();
        while let Some(record) = stream.next().await? {
            out.push(record);
        }
        Ok(out)
    }

    #[tokio::test]
    async fn streams_records_in_file_order() {
        let body = json!({
            "Records": [
                {"eventTime": "2024-03-02T10:00:00Z", "eventName": "A"},
                {"eventTime": "2024-03-02T10:00:01Z", "eventName": "B"},
                {"eventTime": "2024-03-03T00:00:00Z", "eventName": "C"}
            ]
        })
        .to_string();
        let records = collect(&body).await.unwrap();
        let names: Vec<_> = records.iter().map(|r| r["eventName"].clone()).collect();
        assert_eq!(names, vec![json!("A"), json!("B"), json!("C")]);
    }

    #[tokio::test]
    async fn ignores_other_top_level_keys() {
        let records = collect(r#"{"meta":{"x":[1,2]},"Records":[{"a":1}],"tail":null}"#)
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn missing_records_is_empty_bundle() {
        assert!(collect("{}").await.unwrap().is_empty());
        assert!(collect(r#"{"Records":[]}"#).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn truncated_bundle_yields_records_then_error() {
        let mut stream = RecordStream::spawn(reader(r#"{"Records":[{"a":1},{"b":"#));
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first["a"], json!(1));
        assert!(matches!(
            stream.next().await,
            Err(CloudTrailError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn rejects_non_object_bundle() {
        assert!(collect("[1,2,3]").await.is_err());
        assert!(collect(r#"{"Records":{"a":1}}"#).await.is_err());
        assert!(collect(r#"{"Records":[]} trailing"#).await.is_err());
    }

    #[tokio::test]
    async fn dropping_stream_stops_decoder() {
        let records: Vec<Value> = (0..1000)
            .map(|i| json!({"eventTime": "2024-03-02T10:00:00Z", "n": i}))
            .collect();
        let body = json!({ "Records": records }).to_string();
        let mut stream = RecordStream::spawn(reader(&body));
        stream.next().await.unwrap().unwrap();
        let decoder = stream.decoder.take().unwrap();
        drop(stream);
        let result = decoder.await.unwrap();
        assert!(matches!(result, Err(CloudTrailError::Decode(msg)) if msg.contains("consumer stopped")));
    }

    #[test]
    fn event_time_parses_rfc3339() {
        let record: Record = serde_json::from_str(r#"{"eventTime":"2024-03-02T01:30:00+09:00"}"#)
            .unwrap();
        assert_eq!(
            event_time(&record),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 16, 30, 0).unwrap())
        );
    }

    #[test]
    fn event_time_missing_or_invalid() {
        let missing: Record = serde_json::from_str(r#"{"eventName":"x"}"#).unwrap();
        assert_eq!(event_time(&missing), None);
        let invalid: Record = serde_json::from_str(r#"{"eventTime":"yesterday"}"#).unwrap();
        assert_eq!(event_time(&invalid), None);
        let number: Record = serde_json::from_str(r#"{"eventTime":17}"#).unwrap();
        assert_eq!(event_time(&number), None);
    }

    #[test]
    fn enrich_appends_fields_and_keeps_order() {
        let record: Record = serde_json::from_str(
            r#"{"eventVersion":"1.08","eventTime":"2024-03-02T10:00:00Z","zeta":{"nested":[1]},"alpha":true}"#,
        )
        .unwrap();
        let time = event_time(&record).unwrap();
        let bytes = enrich(record, &time, "syslogidx").unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"eventVersion":"1.08","eventTime":"2024-03-02T10:00:00Z","zeta":{"nested":[1]},"alpha":true,"@timestamp":"2024-03-02T10:00:00Z","@version":"1","@app":"syslogidx"}"#
        );
    }

    #[test]
    fn enrich_omits_empty_app_tag() {
        let record: Record = serde_json::from_str(r#"{"eventTime":"2024-03-02T10:00:00Z"}"#)
            .unwrap();
        let time = event_time(&record).unwrap();
        let value: Value = serde_json::from_slice(&enrich(record, &time, "").unwrap()).unwrap();
        assert!(value.get("@app").is_none());
        assert_eq!(value["@version"], "1");
    }
}
