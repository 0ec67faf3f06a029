//! Per-row action policy and the details projection used by the details modal.

use shared::domain::{Order, OrderId, OrderStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionTone {
    Orange,
    Green,
    Blue,
}

/// The single status-dependent action a list row offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAction {
    StartProgress,
    Complete,
    OpenActionMenu,
    CollectCash { collected: bool },
}

impl PrimaryAction {
    pub fn icon_name(self) -> &'static str {
        match self {
            PrimaryAction::StartProgress => "md-hourglass",
            PrimaryAction::Complete => "md-checkmark-circle",
            PrimaryAction::OpenActionMenu => "ellipsis-vertical",
            PrimaryAction::CollectCash { .. } => "cash-outline",
        }
    }

    pub fn tone(self) -> ActionTone {
        match self {
            PrimaryAction::StartProgress => ActionTone::Orange,
            PrimaryAction::Complete => ActionTone::Green,
            PrimaryAction::OpenActionMenu => ActionTone::Blue,
            PrimaryAction::CollectCash { collected: true } => ActionTone::Green,
            PrimaryAction::CollectCash { collected: false } => ActionTone::Orange,
        }
    }

    /// `(from, to)` for actions that advance the order.
    pub fn transition(self) -> Option<(OrderStatus, OrderStatus)> {
        match self {
            PrimaryAction::StartProgress => Some((OrderStatus::Accepted, OrderStatus::Inprogress)),
            PrimaryAction::Complete => Some((OrderStatus::Inprogress, OrderStatus::Complete)),
            PrimaryAction::OpenActionMenu | PrimaryAction::CollectCash { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowActions {
    pub show_details: bool,
    pub show_comment: bool,
    pub show_whatsapp: bool,
    pub primary: PrimaryAction,
}

pub fn row_actions(filter: OrderStatus, order: &Order) -> RowActions {
    let primary = match filter {
        OrderStatus::Pending => PrimaryAction::OpenActionMenu,
        OrderStatus::Accepted => PrimaryAction::StartProgress,
        OrderStatus::Inprogress => PrimaryAction::Complete,
        OrderStatus::Complete => PrimaryAction::CollectCash {
            collected: order.cash_collected,
        },
    };

    RowActions {
        show_details: true,
        show_comment: filter != OrderStatus::Complete,
        show_whatsapp: true,
        primary,
    }
}

/// What the details modal shows for one order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDetails {
    pub order_number: OrderId,
    pub total_price: Option<String>,
    pub payment_to_collect: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub comments: Vec<String>,
    pub customer_name: Option<String>,
    pub address_line: String,
    pub coordinates: Option<(f64, f64)>,
}

impl From<&Order> for OrderDetails {
    fn from(order: &Order) -> Self {
        Self {
            order_number: order.id,
            total_price: order.total_amount.clone(),
            payment_to_collect: order.total_amount.clone(),
            phone: order.contact.phone.clone(),
            whatsapp: order.contact.whatsapp.clone(),
            comments: order.comments.clone(),
            customer_name: order.customer_name.clone(),
            address_line: order.address.single_line(),
            coordinates: order.address.coordinates(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(cash_collected: bool) -> Order {
        let mut order = Order::new(OrderId(12));
        order.cash_collected = cash_collected;
        order
    }

    #[test]
    fn each_filter_offers_exactly_its_primary_action() {
        let expected = [
            (OrderStatus::Pending, PrimaryAction::OpenActionMenu, ActionTone::Blue),
            (OrderStatus::Accepted, PrimaryAction::StartProgress, ActionTone::Orange),
            (OrderStatus::Inprogress, PrimaryAction::Complete, ActionTone::Green),
            (
                OrderStatus::Complete,
                PrimaryAction::CollectCash { collected: false },
                ActionTone::Orange,
            ),
        ];
        for (filter, primary, tone) in expected {
            let actions = row_actions(filter, &order(false));
            assert_eq!(actions.primary, primary, "filter {filter}");
            assert_eq!(actions.primary.tone(), tone, "filter {filter}");
        }
    }

    #[test]
    fn comment_is_hidden_only_for_complete() {
        for filter in OrderStatus::ALL {
            let actions = row_actions(filter, &order(false));
            assert_eq!(actions.show_comment, filter != OrderStatus::Complete);
            assert!(actions.show_details);
            assert!(actions.show_whatsapp);
        }
    }

    #[test]
    fn collected_cash_turns_green() {
        let actions = row_actions(OrderStatus::Complete, &order(true));
        assert_eq!(actions.primary, PrimaryAction::CollectCash { collected: true });
        assert_eq!(actions.primary.tone(), ActionTone::Green);
        assert_eq!(actions.primary.icon_name(), "cash-outline");
    }

    #[test]
    fn only_progress_actions_carry_transitions() {
        assert_eq!(
            PrimaryAction::StartProgress.transition(),
            Some((OrderStatus::Accepted, OrderStatus::Inprogress))
        );
        assert_eq!(
            PrimaryAction::Complete.transition(),
            Some((OrderStatus::Inprogress, OrderStatus::Complete))
        );
        assert_eq!(PrimaryAction::OpenActionMenu.transition(), None);
    }

    #[test]
    fn details_collect_payment_equal_to_total() {
        let mut source = order(false);
        source.total_amount = Some("42.00".to_string());
        source.comments = vec!["first".to_string(), "second".to_string()];
        source.address.building = Some("Villa 9".to_string());
        source.address.city = Some("Ajman".to_string());

        let details = OrderDetails::from(&source);
        assert_eq!(details.order_number, OrderId(12));
        assert_eq!(details.payment_to_collect, details.total_price);
        assert_eq!(details.comments, vec!["first", "second"]);
        assert_eq!(details.address_line, "Villa 9 , Ajman");
        assert_eq!(details.coordinates, None);
    }
}
