pub mod auth;
pub mod health;
pub mod payment;
pub mod scan;
pub mod user;

pub use auth::{login, register};
pub use health::health_check;
pub use payment::{payment_webhook, verify_payment};
pub use scan::scan_link;
pub use user::{
    cancel_subscription, change_password, delete_account, get_profile, get_subscription,
    payment_history, update_profile,
};
