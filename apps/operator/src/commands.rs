//! Command flows behind the CLI. Each one enters its stage through the
//! controller's filter and returns the text to print.

use std::{fmt::Write as _, sync::Arc};

use anyhow::{anyhow, bail, Result};
use client_core::{
    navigation_context, resolve_status, row_actions, ActiveModal, ControllerError,
    OrderDetails, OrderLifecycleController, PrimaryAction, RefreshOutcome, ScreenSnapshot,
    TransitionOutcome, DEFAULT_STATUS,
};
use shared::domain::{Order, OrderId, OrderStatus};
use tracing::warn;

pub const LOGIN_HINT: &str = "not signed in; run `operator login <user-id>` first";

/// Resolves the list filter the same way a navigation context would.
pub fn screen_status(status: Option<OrderStatus>) -> OrderStatus {
    let context = status.map(navigation_context);
    resolve_status(context.as_ref(), DEFAULT_STATUS)
}

pub fn redirect_error(err: ControllerError) -> anyhow::Error {
    match err {
        ControllerError::Unauthenticated => anyhow!(LOGIN_HINT),
        other => other.into(),
    }
}

async fn open_stage(
    controller: &Arc<OrderLifecycleController>,
    status: OrderStatus,
) -> Result<RefreshOutcome> {
    let outcome = controller.open(status).await.map_err(redirect_error)?;
    if outcome == RefreshOutcome::Failed {
        warn!(status = %status, "showing last known orders after failed fetch");
    }
    Ok(outcome)
}

pub async fn list_orders(
    controller: &Arc<OrderLifecycleController>,
    status: OrderStatus,
) -> Result<String> {
    open_stage(controller, status).await?;
    Ok(render_screen(&controller.snapshot().await))
}

async fn find_order(
    controller: &Arc<OrderLifecycleController>,
    status: OrderStatus,
    order_id: OrderId,
) -> Result<Order> {
    if !matches!(
        open_stage(controller, status).await?,
        RefreshOutcome::Applied { .. }
    ) {
        let snapshot = controller.snapshot().await;
        bail!(
            "could not load {status} orders: {}",
            snapshot.error_message.unwrap_or_default()
        );
    }

    controller
        .orders()
        .await
        .into_iter()
        .find(|order| order.id == order_id)
        .ok_or_else(|| anyhow!("order {order_id} is not in the {status} list"))
}

/// Opens the details modal for one order, renders it, then closes it.
pub async fn show_order(
    controller: &Arc<OrderLifecycleController>,
    status: OrderStatus,
    order_id: OrderId,
) -> Result<String> {
    let order = find_order(controller, status, order_id).await?;
    controller.select_for_details(order).await;

    let snapshot = controller.snapshot().await;
    let rendered = snapshot
        .selection
        .view(ActiveModal::Details)
        .order
        .map(|order| render_details(&OrderDetails::from(order)))
        .unwrap_or_default();

    controller
        .close_all_modals()
        .await
        .map_err(redirect_error)?;
    Ok(rendered)
}

/// Advances `order_id` along the transition `action` carries and renders the
/// stage it left.
pub async fn run_transition(
    controller: &Arc<OrderLifecycleController>,
    action: PrimaryAction,
    order_id: OrderId,
) -> Result<(TransitionOutcome, String)> {
    let Some((from, to)) = action.transition() else {
        bail!("{action:?} does not advance an order");
    };
    let order = find_order(controller, from, order_id).await?;

    let outcome = controller
        .advance_status(&order, from, to)
        .await
        .map_err(redirect_error)?;
    Ok((outcome, render_screen(&controller.snapshot().await)))
}

fn action_label(action: PrimaryAction) -> &'static str {
    match action {
        PrimaryAction::StartProgress => "start",
        PrimaryAction::Complete => "complete",
        PrimaryAction::OpenActionMenu => "actions",
        PrimaryAction::CollectCash { collected: true } => "cash:collected",
        PrimaryAction::CollectCash { collected: false } => "cash:due",
    }
}

pub fn render_screen(snapshot: &ScreenSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Order Status: {}", snapshot.status);
    let _ = writeln!(out, "Total Orders: {}", snapshot.total_orders());
    for message in [&snapshot.success_message, &snapshot.error_message]
        .into_iter()
        .flatten()
    {
        let _ = writeln!(out, "{message}");
    }
    if snapshot.orders.is_empty() {
        let _ = writeln!(out, "No Order");
        return out;
    }

    for order in &snapshot.orders {
        let actions = row_actions(snapshot.status, order);
        let mut labels = vec!["details"];
        if actions.show_comment {
            labels.push("comment");
        }
        if actions.show_whatsapp && order.contact.whatsapp.is_some() {
            labels.push("whatsapp");
        }
        labels.push(action_label(actions.primary));

        let _ = writeln!(
            out,
            "ID: {}  {}  {}  {}  [{}]",
            order.id,
            order.date.as_deref().unwrap_or("-"),
            order.time_slot.as_deref().unwrap_or("-"),
            order.address.single_line(),
            labels.join(", ")
        );
    }
    out
}

pub fn render_details(details: &OrderDetails) -> String {
    let text = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
    let mut out = String::new();
    let _ = writeln!(out, "Order#: {}", details.order_number);
    let _ = writeln!(out, "Total Price: {}", text(&details.total_price));
    let _ = writeln!(out, "Payment to be Collected: {}", text(&details.payment_to_collect));
    let _ = writeln!(out, "Phone: {}", text(&details.phone));
    let _ = writeln!(out, "Whatsapp: {}", text(&details.whatsapp));
    let _ = writeln!(out, "Comments:");
    for comment in &details.comments {
        let _ = writeln!(out, "  {comment}");
    }
    let _ = writeln!(out, "Shipping Address:");
    let _ = writeln!(out, "  {}", text(&details.customer_name));
    let _ = writeln!(out, "  {}", details.address_line);
    if let Some((latitude, longitude)) = details.coordinates {
        let _ = writeln!(out, "  ({latitude}, {longitude})");
    }
    out
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
