//! Executor for individual elements of a product design.
//!
//! Adding an element also registers its type in the product configuration's
//! `enabledElementTypes` list.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::str::FromStr;
use std::sync::Arc;
use strum::{Display, EnumString};
use uuid::Uuid;

use customfly_core::error::{CustomflyError, Result};
use customfly_core::store::{ConfigStore, DesignElement, DesignPage, DesignStore, Fields};

use crate::executor::{Applied, Executor, payload_fields, snapshot, str_entry, update_fields};

/// Configuration field listing the element types enabled for a product.
pub const ENABLED_ELEMENT_TYPES: &str = "enabledElementTypes";

const DEFAULT_PAGE_ID: &str = "page-1";

/// Snapshot flag: the page holding the element was created by the add.
const DROP_EMPTY_PAGE: &str = "dropEmptyPage";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum DesignOperation {
    Add,
    Update,
    Remove,
}

pub struct ProductDesignExecutor {
    designs: Arc<dyn DesignStore>,
    configs: Arc<dyn ConfigStore>,
    default_op: DesignOperation,
}

/// Location of an element inside a design.
struct ElementPosition {
    page: usize,
    index: usize,
}

fn locate(pages: &[DesignPage], element_id: &str) -> Option<ElementPosition> {
    pages.iter().enumerate().find_map(|(page, p)| {
        p.elements
            .iter()
            .position(|e| e.id == element_id)
            .map(|index| ElementPosition { page, index })
    })
}

fn usize_entry(fields: &Fields, key: &str) -> Result<Option<usize>> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .map(|n| Some(n as usize))
            .ok_or_else(|| CustomflyError::validation(format!("'{}' must be an index", key))),
    }
}

impl ProductDesignExecutor {
    pub fn new(
        designs: Arc<dyn DesignStore>,
        configs: Arc<dyn ConfigStore>,
        default_op: DesignOperation,
    ) -> Self {
        Self {
            designs,
            configs,
            default_op,
        }
    }

    fn operation(&self, fields: &Fields) -> Result<DesignOperation> {
        match str_entry(fields, "op")? {
            Some(op) => DesignOperation::from_str(op)
                .map_err(|_| CustomflyError::validation(format!("unknown design op '{}'", op))),
            None => Ok(self.default_op),
        }
    }

    fn element_id<'a>(fields: &'a Fields) -> Result<&'a str> {
        str_entry(fields, "elementId")?
            .ok_or_else(|| CustomflyError::validation("'elementId' is required"))
    }

    async fn current_enabled_types(&self, shop: &str, product_id: &str) -> Result<Value> {
        Ok(self
            .configs
            .get_config(shop, product_id)
            .await?
            .and_then(|c| c.field(ENABLED_ELEMENT_TYPES).cloned())
            .unwrap_or(Value::Null))
    }

    async fn write_enabled_types(&self, shop: &str, product_id: &str, next: Value) -> Result<()> {
        let mut write = Fields::new();
        write.insert(ENABLED_ELEMENT_TYPES.to_string(), next);
        self.configs.upsert_config(shop, product_id, &write).await?;
        Ok(())
    }

    async fn add(&self, shop: &str, product_id: &str, fields: &Fields) -> Result<Applied> {
        let mut element: DesignElement = match fields.get("element") {
            Some(element) => serde_json::from_value(element.clone())
                .map_err(|e| CustomflyError::validation(format!("invalid element: {}", e)))?,
            None => return Err(CustomflyError::validation("'element' is required")),
        };
        if element.id.trim().is_empty() {
            element.id = Uuid::new_v4().to_string();
        }

        let mut pages = self.designs.get_design(shop, product_id).await?;
        let page_created = pages.is_empty();
        if page_created {
            pages.push(DesignPage::new(DEFAULT_PAGE_ID));
        }
        if locate(&pages, &element.id).is_some() {
            return Err(CustomflyError::validation(format!(
                "element '{}' already exists",
                element.id
            )));
        }
        let page_index = usize_entry(fields, "pageIndex")?.unwrap_or(0);
        let page = pages.get_mut(page_index).ok_or_else(|| {
            CustomflyError::validation(format!("page {} does not exist", page_index))
        })?;
        let position = usize_entry(fields, "position")?
            .unwrap_or(page.elements.len())
            .min(page.elements.len());

        let current_types = self.current_enabled_types(shop, product_id).await?;
        let next_types =
            enabled_types_after(&current_types, fields, Some(&element.element_type));

        page.elements.insert(position, element.clone());
        self.designs.update_design(shop, product_id, pages).await?;

        let mut previous = json!({ "op": "remove", "elementId": element.id });
        if page_created {
            previous[DROP_EMPTY_PAGE] = Value::Bool(true);
        }
        if let Some(next) = next_types {
            self.write_enabled_types(shop, product_id, next).await?;
            previous[ENABLED_ELEMENT_TYPES] = current_types;
        }

        Ok(Applied {
            result: json!({ "pageIndex": page_index, "position": position, "element": element }),
            previous_state: previous,
        })
    }

    async fn update(&self, shop: &str, product_id: &str, fields: &Fields) -> Result<Applied> {
        let element_id = Self::element_id(fields)?;
        let changes = update_fields(fields, &["op", "elementId"])?;

        let mut pages = self.designs.get_design(shop, product_id).await?;
        let at = locate(&pages, element_id)
            .ok_or_else(|| CustomflyError::not_found("design element", element_id))?;
        let element = &mut pages[at.page].elements[at.index];
        let previous = snapshot(&changes, |k| element.field(k));
        element.apply_fields(&changes)?;
        let updated = element.clone();

        self.designs.update_design(shop, product_id, pages).await?;
        Ok(Applied {
            result: json!({ "element": updated }),
            previous_state: json!({ "op": "update", "elementId": element_id, "fields": previous }),
        })
    }

    async fn remove(&self, shop: &str, product_id: &str, fields: &Fields) -> Result<Applied> {
        let element_id = Self::element_id(fields)?;
        let drop_empty_page = fields
            .get(DROP_EMPTY_PAGE)
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let mut pages = self.designs.get_design(shop, product_id).await?;
        let at = locate(&pages, element_id)
            .ok_or_else(|| CustomflyError::not_found("design element", element_id))?;
        let current_types = self.current_enabled_types(shop, product_id).await?;
        let next_types = enabled_types_after(&current_types, fields, None);

        let removed = pages[at.page].elements.remove(at.index);
        if drop_empty_page && pages[at.page].elements.is_empty() {
            pages.remove(at.page);
        }
        self.designs.update_design(shop, product_id, pages).await?;
        if let Some(next) = next_types {
            self.write_enabled_types(shop, product_id, next).await?;
        }

        // The re-add must restore the list as it was, not register the type.
        let previous = json!({
            "op": "add",
            "pageIndex": at.page,
            "position": at.index,
            "element": removed,
            ENABLED_ELEMENT_TYPES: current_types,
        });

        Ok(Applied {
            result: json!({ "removed": element_id }),
            previous_state: previous,
        })
    }
}

/// The `enabledElementTypes` value to write, if it changes.
///
/// An explicit value in the payload wins (this is how snapshots restore the
/// list). Otherwise `added_type` is appended when not already enabled.
fn enabled_types_after(
    current: &Value,
    fields: &Fields,
    added_type: Option<&str>,
) -> Option<Value> {
    match (fields.get(ENABLED_ELEMENT_TYPES), added_type) {
        (Some(explicit), _) => (explicit != current).then(|| explicit.clone()),
        (None, Some(element_type)) => {
            let mut types: Vec<Value> = match current {
                Value::Array(types) => types.clone(),
                _ => Vec::new(),
            };
            if types.iter().any(|t| t.as_str() == Some(element_type)) {
                return None;
            }
            types.push(Value::String(element_type.to_string()));
            Some(Value::Array(types))
        }
        (None, None) => None,
    }
}

#[async_trait]
impl Executor for ProductDesignExecutor {
    async fn apply(&self, shop: &str, product_id: &str, payload: &Value) -> Result<Applied> {
        let fields = payload_fields(payload)?;
        let op = self.operation(fields)?;

        let applied = match op {
            DesignOperation::Add => self.add(shop, product_id, fields).await?,
            DesignOperation::Update => self.update(shop, product_id, fields).await?,
            DesignOperation::Remove => self.remove(shop, product_id, fields).await?,
        };

        tracing::debug!(
            target: "customfly::executor",
            shop,
            product_id,
            op = %op,
            "Applied design change"
        );
        Ok(applied)
    }
}
