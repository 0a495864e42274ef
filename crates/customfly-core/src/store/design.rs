//! Product design documents: pages of positioned design elements.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::config::{Fields, merge_fields};
use crate::error::{CustomflyError, Result};

/// One element (text, image, shape, ...) placed on a design page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignElement {
    pub id: String,
    /// Element type tag, e.g. `text` or `image`
    #[serde(rename = "type")]
    pub element_type: String,
    /// Remaining element properties (position, size, styling)
    #[serde(flatten)]
    pub properties: Fields,
}

impl DesignElement {
    /// Reads a property by payload name; `type` addresses the element type.
    pub fn field(&self, key: &str) -> Option<Value> {
        match key {
            "type" => Some(Value::String(self.element_type.clone())),
            _ => self.properties.get(key).cloned(),
        }
    }

    /// Applies a partial update. `id` cannot be changed.
    pub fn apply_fields(&mut self, fields: &Fields) -> Result<()> {
        let mut properties = Fields::new();
        for (key, value) in fields {
            match key.as_str() {
                "id" => {
                    return Err(CustomflyError::validation("element id cannot be changed"));
                }
                "type" => {
                    self.element_type = value
                        .as_str()
                        .ok_or_else(|| CustomflyError::validation("element type must be a string"))?
                        .to_string();
                }
                _ => {
                    properties.insert(key.clone(), value.clone());
                }
            }
        }
        merge_fields(&mut self.properties, &properties);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DesignPage {
    pub id: String,
    #[serde(default)]
    pub elements: Vec<DesignElement>,
}

impl DesignPage {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            elements: Vec::new(),
        }
    }
}

/// Store of product design documents.
#[async_trait]
pub trait DesignStore: Send + Sync {
    /// Returns the pages of a product design (empty if none saved yet).
    async fn get_design(&self, shop: &str, product_id: &str) -> Result<Vec<DesignPage>>;

    /// Replaces the pages of a product design.
    async fn update_design(&self, shop: &str, product_id: &str, pages: Vec<DesignPage>)
    -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_element_flattens_properties() {
        let element: DesignElement =
            serde_json::from_value(json!({ "id": "e1", "type": "text", "text": "Hi", "x": 10 }))
                .unwrap();
        assert_eq!(element.element_type, "text");
        assert_eq!(element.field("text"), Some(json!("Hi")));
        assert_eq!(element.field("type"), Some(json!("text")));
    }

    #[test]
    fn test_apply_fields_clears_null_properties() {
        let mut element: DesignElement =
            serde_json::from_value(json!({ "id": "e1", "type": "text", "text": "Hi", "x": 10 }))
                .unwrap();
        let fields = json!({ "x": null, "y": 4 }).as_object().cloned().unwrap();
        element.apply_fields(&fields).unwrap();
        assert_eq!(element.field("x"), None);
        assert_eq!(element.field("y"), Some(json!(4)));
        assert_eq!(element.field("text"), Some(json!("Hi")));
    }
}
