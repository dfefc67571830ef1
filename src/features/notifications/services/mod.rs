mod notification_dispatcher;

pub use notification_dispatcher::NotificationDispatcher;
