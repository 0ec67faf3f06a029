//! Client core for the order list screen: the remote order repository, the
//! lifecycle controller that owns list state, and the pure pieces it is built
//! from (status filter resolution, selection slot, banners, row policy).

pub mod banner;
pub mod controller;
pub mod error;
pub mod presentation;
pub mod repository;
pub mod selection;
pub mod status_filter;

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

pub use banner::{Banner, BannerKind, BANNER_TTL};
pub use controller::{
    ControllerEvent, OrderLifecycleController, RefreshOutcome, ScreenInputs, ScreenSnapshot,
    TransitionOutcome,
};
pub use error::{ControllerError, FetchError, UpdateError};
pub use presentation::{row_actions, ActionTone, OrderDetails, PrimaryAction, RowActions};
pub use repository::{HttpOrderRepository, OrderRepository, RepositoryEndpoints};
pub use selection::{ActiveModal, ModalView, SelectionSlot};
pub use status_filter::{navigation_context, resolve_status, DEFAULT_STATUS};
