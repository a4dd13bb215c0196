mod connect;
mod home;
mod review;
mod state;

pub use connect::ConnectView;
pub use home::HomeView;
pub use review::ReviewView;
pub use state::{ViewError, ViewState, view_state_from_resource};
