//! Derives the active status filter from navigation context.

use serde_json::{json, Value};
use shared::domain::OrderStatus;
use tracing::warn;

/// Default filter of the order list screen.
pub const DEFAULT_STATUS: OrderStatus = OrderStatus::Pending;

/// Returns `params.status` from the context when present and recognized,
/// otherwise `default`. Malformed contexts degrade to the default.
pub fn resolve_status(context: Option<&Value>, default: OrderStatus) -> OrderStatus {
    let Some(raw) = context
        .and_then(Value::as_object)
        .and_then(|context| context.get("params"))
        .and_then(Value::as_object)
        .and_then(|params| params.get("status"))
    else {
        return default;
    };

    match raw.as_str().map(str::parse::<OrderStatus>) {
        Some(Ok(status)) => status,
        Some(Err(err)) => {
            warn!(error = %err, default = %default, "unrecognized status in navigation context");
            default
        }
        None => {
            warn!(value = %raw, default = %default, "non-string status in navigation context");
            default
        }
    }
}

/// Navigation context a caller passes to open the list on `status`.
pub fn navigation_context(status: OrderStatus) -> Value {
    json!({ "params": { "status": status.as_str() } })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_status_from_params() {
        let context = json!({ "name": "Orders", "params": { "status": "Inprogress" } });
        assert_eq!(
            resolve_status(Some(&context), DEFAULT_STATUS),
            OrderStatus::Inprogress
        );
    }

    #[test]
    fn round_trips_through_navigation_context() {
        for status in OrderStatus::ALL {
            let context = navigation_context(status);
            assert_eq!(resolve_status(Some(&context), DEFAULT_STATUS), status);
        }
    }

    #[test]
    fn falls_back_to_default_for_missing_or_malformed_context() {
        let cases = [
            None,
            Some(Value::Null),
            Some(json!("Accepted")),
            Some(json!(["params"])),
            Some(json!({})),
            Some(json!({ "params": null })),
            Some(json!({ "params": {} })),
            Some(json!({ "params": { "state": "Accepted" } })),
            Some(json!({ "params": { "status": 3 } })),
            Some(json!({ "params": { "status": null } })),
            Some(json!({ "params": { "status": "accepted" } })),
            Some(json!({ "params": { "status": "ASSIGNED" } })),
        ];

        for context in cases {
            assert_eq!(
                resolve_status(context.as_ref(), DEFAULT_STATUS),
                OrderStatus::Pending,
                "context {context:?}"
            );
        }
    }

    #[test]
    fn honours_caller_supplied_default() {
        assert_eq!(
            resolve_status(None, OrderStatus::Complete),
            OrderStatus::Complete
        );
    }
}
