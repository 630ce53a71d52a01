pub mod database;
pub mod metrics;
pub mod telegram;

pub use database::{MockStore, MongoStore, SubmissionStore};
pub use self::metrics::{
    get_metrics, init_metrics, record_contact_submission, record_status_check,
};
pub use telegram::{format_contact_message, DispatchReport, TelegramNotifier};
