//! Index record and retrieval result types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The persisted form of a chunk inside a vector index: identifier, raw
/// text, and flattened metadata fields. The index embeds the text at upsert
/// time, so records carry no vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Composite identifier of the form `doc{n}#p{position}#c{index}`
    #[serde(rename = "_id")]
    pub id: String,
    /// Chunk text (the embedded content)
    pub text: String,
    /// Metadata fields replicated from the source unit
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ChunkRecord {
    /// Keys computed by the indexer that metadata may not shadow
    pub const RESERVED_KEYS: [&'static str; 2] = ["_id", "text"];

    /// Build a record, stripping any metadata key that collides with a
    /// reserved field.
    pub fn new(id: String, text: String, mut fields: Map<String, Value>) -> Self {
        for key in Self::RESERVED_KEYS {
            fields.remove(key);
        }
        Self { id, text, fields }
    }
}

/// A single hit from one index search. Ephemeral; lives only within one
/// retrieval call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalHit {
    /// Record identifier
    #[serde(rename = "_id")]
    pub id: String,
    /// Similarity score reported by the index
    #[serde(rename = "_score")]
    pub score: f32,
    /// Stored field payload, including the chunk text
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// A chunk payload returned from hybrid retrieval, carrying its fused score.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievedChunk {
    /// Record identifier
    pub id: String,
    /// Fused score (`alpha * dense + (1 - alpha) * sparse`)
    pub score: f32,
    /// Chunk text
    pub text: String,
    /// Remaining metadata fields
    pub fields: Map<String, Value>,
}

impl RetrievedChunk {
    /// Build from a retained hit payload and its fused score. The `text`
    /// field is lifted out of the payload; everything else stays as metadata.
    pub fn from_hit(hit: RetrievalHit, score: f32) -> Self {
        let mut fields = hit.fields;
        let text = match fields.remove("text") {
            Some(Value::String(text)) => text,
            _ => String::new(),
        };
        Self {
            id: hit.id,
            score,
            text,
            fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_serializes_flat() {
        let mut fields = Map::new();
        fields.insert("document_number".to_string(), json!(0));
        fields.insert("file_name".to_string(), json!("notes.txt"));

        let record = ChunkRecord::new("doc0#p0#c0".to_string(), "hello".to_string(), fields);
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["_id"], "doc0#p0#c0");
        assert_eq!(value["text"], "hello");
        assert_eq!(value["file_name"], "notes.txt");
        assert!(value.get("fields").is_none());
    }

    #[test]
    fn test_reserved_keys_not_shadowed() {
        let mut fields = Map::new();
        fields.insert("_id".to_string(), json!("spoofed"));
        fields.insert("text".to_string(), json!("spoofed"));
        fields.insert("file_name".to_string(), json!("notes.txt"));

        let record = ChunkRecord::new("doc1#p0#c0".to_string(), "real".to_string(), fields);
        assert_eq!(record.id, "doc1#p0#c0");
        assert_eq!(record.text, "real");
        assert!(!record.fields.contains_key("_id"));
        assert!(!record.fields.contains_key("text"));
        assert_eq!(record.fields["file_name"], "notes.txt");
    }

    #[test]
    fn test_hit_deserializes_wire_shape() {
        let raw = json!({
            "_id": "doc0#p0#c0",
            "_score": 0.21,
            "fields": {"document_number": 0, "text": "some chunk"}
        });
        let hit: RetrievalHit = serde_json::from_value(raw).unwrap();
        assert_eq!(hit.id, "doc0#p0#c0");
        assert!((hit.score - 0.21).abs() < 1e-6);
        assert_eq!(hit.fields["text"], "some chunk");
    }

    #[test]
    fn test_retrieved_chunk_lifts_text() {
        let mut fields = Map::new();
        fields.insert("text".to_string(), json!("chunk body"));
        fields.insert("page_number".to_string(), json!(2));
        let hit = RetrievalHit {
            id: "doc0#p2#c1".to_string(),
            score: 0.9,
            fields,
        };

        let chunk = RetrievedChunk::from_hit(hit, 0.63);
        assert_eq!(chunk.text, "chunk body");
        assert!((chunk.score - 0.63).abs() < 1e-6);
        assert!(!chunk.fields.contains_key("text"));
        assert_eq!(chunk.fields["page_number"], 2);
    }
}
