//! Single selected-order slot shared between the controller and modal surfaces.

use shared::domain::Order;

/// Which modal, if any, is open. One tag instead of independent flags, so two
/// modals can never be open at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActiveModal {
    #[default]
    None,
    Details,
    Comment,
    Action,
    CashCollection,
}

/// What a modal surface receives: visibility and the order it operates on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModalView<'a> {
    pub visible: bool,
    pub order: Option<&'a Order>,
}

/// Invariant: `selected` is `Some` whenever `active` is not `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionSlot {
    selected: Option<Order>,
    active: ActiveModal,
}

impl SelectionSlot {
    pub fn selected(&self) -> Option<&Order> {
        self.selected.as_ref()
    }

    pub fn active(&self) -> ActiveModal {
        self.active
    }

    pub fn is_open(&self, modal: ActiveModal) -> bool {
        modal != ActiveModal::None && self.active == modal
    }

    pub fn view(&self, modal: ActiveModal) -> ModalView<'_> {
        let visible = self.is_open(modal);
        ModalView {
            visible,
            order: if visible { self.selected.as_ref() } else { None },
        }
    }

    pub fn select_for_details(&mut self, order: Order) {
        self.open(order, ActiveModal::Details);
    }

    pub fn select_for_comment(&mut self, order: Order) {
        self.open(order, ActiveModal::Comment);
    }

    pub fn select_for_action(&mut self, order: Order) {
        self.open(order, ActiveModal::Action);
    }

    /// Opens cash collection unless the order's cash is already collected, in
    /// which case the cash modal is forced closed. Returns whether it opened.
    pub fn select_for_cash_collection(&mut self, order: Order) -> bool {
        if order.cash_collected {
            if self.active == ActiveModal::CashCollection {
                self.active = ActiveModal::None;
            }
            return false;
        }
        self.open(order, ActiveModal::CashCollection);
        true
    }

    pub fn close_all(&mut self) {
        self.active = ActiveModal::None;
        self.selected = None;
    }

    fn open(&mut self, order: Order, modal: ActiveModal) {
        self.selected = Some(order);
        self.active = modal;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::OrderId;

    fn order(id: i64, cash_collected: bool) -> Order {
        let mut order = Order::new(OrderId(id));
        order.cash_collected = cash_collected;
        order
    }

    #[test]
    fn selecting_opens_exactly_one_modal() {
        let mut slot = SelectionSlot::default();
        slot.select_for_comment(order(4, false));

        assert_eq!(slot.active(), ActiveModal::Comment);
        assert_eq!(slot.selected().map(|o| o.id), Some(OrderId(4)));
        assert!(slot.view(ActiveModal::Comment).visible);
        assert!(!slot.view(ActiveModal::Details).visible);
        assert_eq!(slot.view(ActiveModal::Details).order, None);
    }

    #[test]
    fn later_selection_replaces_earlier_one() {
        let mut slot = SelectionSlot::default();
        slot.select_for_details(order(1, false));
        slot.select_for_action(order(2, false));

        assert_eq!(slot.active(), ActiveModal::Action);
        assert_eq!(slot.selected().map(|o| o.id), Some(OrderId(2)));
    }

    #[test]
    fn collected_cash_never_opens_the_cash_modal() {
        let mut slot = SelectionSlot::default();
        assert!(!slot.select_for_cash_collection(order(8, true)));
        assert!(!slot.is_open(ActiveModal::CashCollection));

        slot.select_for_cash_collection(order(9, false));
        assert!(slot.is_open(ActiveModal::CashCollection));
        assert!(!slot.select_for_cash_collection(order(8, true)));
        assert!(!slot.is_open(ActiveModal::CashCollection));
    }

    #[test]
    fn collected_cash_leaves_other_modals_alone() {
        let mut slot = SelectionSlot::default();
        slot.select_for_details(order(1, false));
        slot.select_for_cash_collection(order(2, true));

        assert_eq!(slot.active(), ActiveModal::Details);
        assert_eq!(slot.selected().map(|o| o.id), Some(OrderId(1)));
    }

    #[test]
    fn closing_resets_modal_and_selection() {
        let mut slot = SelectionSlot::default();
        slot.select_for_cash_collection(order(3, false));
        slot.close_all();

        assert_eq!(slot, SelectionSlot::default());
        assert!(!slot.view(ActiveModal::None).visible);
    }
}
