mod notification;

pub use notification::{FileInfo, NotificationOutcome, NotificationSummary};
