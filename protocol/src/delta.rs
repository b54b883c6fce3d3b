use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

/// Formatting attributes attached to a run of text (`bold`, `link`, ...).
pub type Attributes = Map<String, Value>;

/// Structured representation of formatted editor content.
///
/// A document delta is an ordered list of insert operations; concatenating
/// the text inserts yields the plain-text projection of the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    pub ops: Vec<DeltaOp>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaOp {
    pub insert: DeltaInsert,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
}

/// Payload of a single insert: either a text run or an embedded object such
/// as `{"image": "https://..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeltaInsert {
    Text(String),
    Embed(Map<String, Value>),
}

impl Delta {
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            return Self::default();
        }
        Self {
            ops: vec![DeltaOp::text(text)],
        }
    }

    /// Parse a serialized delta document (`{"ops": [...]}`).
    pub fn from_json(body: &str) -> serde_json::Result<Self> {
        serde_json::from_str(body)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Plain-text projection. Embeds contribute nothing.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for op in &self.ops {
            if let DeltaInsert::Text(text) = &op.insert {
                out.push_str(text);
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.ops.iter().all(|op| match &op.insert {
            DeltaInsert::Text(text) => text.is_empty(),
            DeltaInsert::Embed(_) => false,
        })
    }
}

impl DeltaOp {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            insert: DeltaInsert::Text(text.into()),
            attributes: None,
        }
    }

    pub fn formatted(text: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            insert: DeltaInsert::Text(text.into()),
            attributes: if attributes.is_empty() {
                None
            } else {
                Some(attributes)
            },
        }
    }
}
