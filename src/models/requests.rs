//! Request DTOs for the cache service API
//!
//! Defines the structure of incoming HTTP request bodies.

use std::collections::HashMap;

use serde::Deserialize;

use crate::cache::{EntryOptions, Priority};

/// Maximum accepted key length in bytes.
pub const MAX_KEY_LENGTH: usize = 256;

/// Request body for the SET operation (PUT /set)
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: Arbitrary JSON value to store
/// - `ttl_ms`: Optional TTL in milliseconds (instance default if omitted)
/// - `priority`: Optional eviction priority
/// - `tags`: Optional labels for bulk invalidation
/// - `persist`: Optional write-through override
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The value to store
    pub value: serde_json::Value,
    /// Optional TTL in milliseconds
    #[serde(default)]
    pub ttl_ms: Option<u64>,
    /// Optional eviction priority
    #[serde(default)]
    pub priority: Option<Priority>,
    /// Optional invalidation tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Optional durable write-through override
    #[serde(default)]
    pub persist: Option<bool>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.key.len() > MAX_KEY_LENGTH {
            return Some(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            ));
        }
        None
    }

    /// Converts the request into per-call cache options.
    pub fn entry_options(&self) -> EntryOptions {
        EntryOptions {
            ttl_ms: self.ttl_ms,
            priority: self.priority,
            tags: self.tags.clone(),
            persist: self.persist,
            ..EntryOptions::default()
        }
    }
}

/// Request body for the warmup operation (POST /warmup)
///
/// Supplies the values inline: each key not already cached is stored with
/// high priority.
#[derive(Debug, Clone, Deserialize)]
pub struct WarmupRequest {
    /// Key to value mapping to preload
    pub entries: HashMap<String, serde_json::Value>,
}

impl WarmupRequest {
    /// Validates the request data.
    pub fn validate(&self) -> Option<String> {
        if self.entries.is_empty() {
            return Some("Warmup requires at least one entry".to_string());
        }
        if self.entries.keys().any(|k| k.is_empty()) {
            return Some("Key cannot be empty".to_string());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_request_deserialize() {
        let json = r#"{"key": "test", "value": "hello"}"#;
        let req: SetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.key, "test");
        assert_eq!(req.value, serde_json::json!("hello"));
        assert!(req.ttl_ms.is_none());
        assert!(req.priority.is_none());
        assert!(req.tags.is_empty());
    }

    #[test]
    fn test_set_request_full() {
        let json = r#"{
            "key": "test",
            "value": {"nested": [1, 2, 3]},
            "ttl_ms": 60000,
            "priority": "high",
            "tags": ["x", "y"],
            "persist": true
        }"#;
        let req: SetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.ttl_ms, Some(60_000));
        assert_eq!(req.priority, Some(Priority::High));
        assert_eq!(req.tags, vec!["x".to_string(), "y".to_string()]);
        assert_eq!(req.persist, Some(true));

        let opts = req.entry_options();
        assert_eq!(opts.ttl_ms, Some(60_000));
        assert_eq!(opts.priority, Some(Priority::High));
    }

    #[test]
    fn test_validate_empty_key() {
        let req = SetRequest {
            key: "".to_string(),
            value: serde_json::json!("test"),
            ttl_ms: None,
            priority: None,
            tags: vec![],
            persist: None,
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_oversized_key() {
        let req = SetRequest {
            key: "x".repeat(MAX_KEY_LENGTH + 1),
            value: serde_json::json!("test"),
            ttl_ms: None,
            priority: None,
            tags: vec![],
            persist: None,
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_valid_request() {
        let req = SetRequest {
            key: "valid_key".to_string(),
            value: serde_json::json!(42),
            ttl_ms: Some(60_000),
            priority: None,
            tags: vec![],
            persist: None,
        };
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_warmup_request_validation() {
        let empty = WarmupRequest {
            entries: HashMap::new(),
        };
        assert!(empty.validate().is_some());

        let mut entries = HashMap::new();
        entries.insert("k".to_string(), serde_json::json!(1));
        let valid = WarmupRequest { entries };
        assert!(valid.validate().is_none());
    }
}
