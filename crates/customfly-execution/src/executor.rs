//! The executor contract shared by every action kind.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use customfly_core::action::ActionKind;
use customfly_core::error::{CustomflyError, Result};
use customfly_core::store::Fields;

/// Outcome of a successful apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Applied {
    /// The new state as applied
    pub result: Value,
    /// The overwritten state. Reapplying it through the same executor
    /// reverses the change.
    pub previous_state: Value,
}

/// Reads, mutates and snapshots one kind of target.
///
/// # Contract
///
/// - Current state is read before anything is written.
/// - `previous_state` holds only the fields the payload overwrites.
/// - Keys absent from the payload are never written.
/// - Creations return a snapshot that deletes what was created.
/// - Errors raised before the first write (`Validation`, `NotFound`) leave
///   every store untouched.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn apply(&self, shop: &str, target_id: &str, payload: &Value) -> Result<Applied>;

    /// For bulk executors, the kind used for per-target sub-actions.
    fn member_kind(&self) -> Option<ActionKind> {
        None
    }
}

/// Interprets a payload as a field object.
pub(crate) fn payload_fields(payload: &Value) -> Result<&Fields> {
    payload
        .as_object()
        .ok_or_else(|| CustomflyError::validation("payload must be a JSON object"))
}

/// Reads an optional string entry from a payload.
pub(crate) fn str_entry<'a>(fields: &'a Fields, key: &str) -> Result<Option<&'a str>> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(CustomflyError::validation(format!(
            "'{}' must be a string, got {}",
            key, other
        ))),
    }
}

/// Field changes of an update payload.
///
/// Accepts either `{ "fields": { ... } }` or the changed fields inline, in
/// which case the `reserved` control keys are stripped.
pub(crate) fn update_fields(fields: &Fields, reserved: &[&str]) -> Result<Fields> {
    let changes = match fields.get("fields") {
        Some(Value::Object(inner)) => inner.clone(),
        Some(other) => {
            return Err(CustomflyError::validation(format!(
                "'fields' must be an object, got {}",
                other
            )));
        }
        None => fields
            .iter()
            .filter(|(k, _)| !reserved.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    };
    if changes.is_empty() {
        return Err(CustomflyError::validation("update payload has no fields"));
    }
    Ok(changes)
}

/// Captures the current value of every key in `changes`, using `null` for
/// fields that are currently unset.
pub(crate) fn snapshot<F>(changes: &Fields, current: F) -> Fields
where
    F: Fn(&str) -> Option<Value>,
{
    changes
        .keys()
        .map(|k| (k.clone(), current(k).unwrap_or(Value::Null)))
        .collect()
}
