//! Structural validation of the report shape.
//!
//! Checks are purely structural and short-circuit on the first violation,
//! returning a reason that names the offending field. Field semantics are
//! never interpreted here.

use serde_json::{Map, Value};

/// Closed status enumeration for proposed opportunity records.
pub const OPPORTUNITY_STATUSES: [&str; 5] = ["backlog", "active", "blocked", "done", "killed"];

type Section<'a> = &'a Map<String, Value>;

fn section<'a>(root: Section<'a>, name: &str) -> Result<Section<'a>, String> {
    let value = root.get(name).ok_or_else(|| format!("{name} missing"))?;
    value
        .as_object()
        .ok_or_else(|| format!("{name} must be an object"))
}

fn require_string(obj: Section<'_>, section: &str, key: &str) -> Result<(), String> {
    let value = obj
        .get(key)
        .ok_or_else(|| format!("{section} missing {key}"))?;
    if value.is_string() {
        Ok(())
    } else {
        Err(format!("{section}.{key} must be a string"))
    }
}

fn require_list_of_3(obj: Section<'_>, section: &str, key: &str) -> Result<(), String> {
    let value = obj
        .get(key)
        .ok_or_else(|| format!("{section} missing {key}"))?;
    let list = value
        .as_array()
        .ok_or_else(|| format!("{section}.{key} must be list of 3"))?;
    if list.len() != 3 {
        return Err(format!("{section}.{key} must be list of 3"));
    }
    if !list.iter().all(Value::is_string) {
        return Err(format!("{section}.{key} entries must be strings"));
    }
    Ok(())
}

/// Validate a parsed value against the StructuredReport shape.
///
/// Returns the first violation as a human-readable reason, e.g.
/// `"memory.key_insights must be list of 3"` or `"ops missing rollback_rule"`.
pub fn validate_report(root: &Value) -> Result<(), String> {
    let root = root
        .as_object()
        .ok_or_else(|| "root must be an object".to_string())?;

    let post = section(root, "post")?;
    require_string(post, "post", "submolt")?;
    require_string(post, "post", "title")?;
    require_string(post, "post", "body")?;
    require_list_of_3(post, "post", "tags")?;

    let memory = section(root, "memory")?;
    require_string(memory, "memory", "worldview")?;
    require_list_of_3(memory, "memory", "key_insights")?;
    require_list_of_3(memory, "memory", "next_actions")?;

    let ops = section(root, "ops")?;
    let ab = ops
        .get("ab_ratio")
        .ok_or_else(|| "ops missing ab_ratio".to_string())?;
    let ab = ab
        .as_object()
        .ok_or_else(|| "ops.ab_ratio must be an object".to_string())?;
    for key in ["A", "B"] {
        let value = ab
            .get(key)
            .ok_or_else(|| format!("ops.ab_ratio missing {key}"))?;
        if !value.is_number() {
            return Err(format!("ops.ab_ratio.{key} must be a number"));
        }
    }
    require_string(ops, "ops", "why_ratio_changed")?;
    require_list_of_3(ops, "ops", "metrics_to_watch")?;
    require_string(ops, "ops", "rollback_rule")?;
    require_string(ops, "ops", "backup_note")?;

    // Optional pool proposal. Lenient (missing fields default downstream),
    // but ids must be usable and statuses inside the closed enumeration.
    if let Some(value) = root.get("opportunities") {
        let list = value
            .as_array()
            .ok_or_else(|| "opportunities must be a list".to_string())?;
        for (idx, entry) in list.iter().enumerate() {
            let entry = entry
                .as_object()
                .ok_or_else(|| format!("opportunities[{idx}] must be an object"))?;
            let id_ok = entry
                .get("id")
                .and_then(Value::as_str)
                .is_some_and(|s| !s.is_empty());
            if !id_ok {
                return Err(format!("opportunities[{idx}] missing id"));
            }
            if let Some(status) = entry.get("status") {
                let status = status
                    .as_str()
                    .ok_or_else(|| format!("opportunities[{idx}].status must be a string"))?;
                if !OPPORTUNITY_STATUSES.contains(&status) {
                    return Err(format!(
                        "opportunities[{idx}].status must be one of backlog/active/blocked/done/killed"
                    ));
                }
            }
        }
    }

    Ok(())
}
