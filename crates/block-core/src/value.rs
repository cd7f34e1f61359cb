use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::document::Document;
use crate::error::ValueError;

const DEFAULT_SCHEMA: &str = "gpui-block-editor";
const DEFAULT_VERSION: u32 = 1;

fn default_schema() -> String {
    DEFAULT_SCHEMA.to_string()
}

fn default_version() -> u32 {
    DEFAULT_VERSION
}

/// The JSON envelope a block list is saved in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockValue {
    #[serde(default = "default_schema")]
    pub schema: String,
    #[serde(default = "default_version")]
    pub version: u32,
    pub blocks: Vec<Block>,
}

impl BlockValue {
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self {
            schema: default_schema(),
            version: default_version(),
            blocks,
        }
    }

    pub fn from_document(document: &Document) -> Self {
        Self::from_blocks(document.blocks().to_vec())
    }

    /// Validate the blocks into a document.
    pub fn into_document(self) -> Result<Document, ValueError> {
        Ok(Document::new(self.blocks)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse either the envelope or a bare array of blocks.
    pub fn from_json_str(s: &str) -> Result<Self, ValueError> {
        let value: serde_json::Value = serde_json::from_str(s)?;
        if value.is_array() {
            return Ok(Self::from_blocks(serde_json::from_value(value)?));
        }
        Ok(serde_json::from_value(value)?)
    }
}
