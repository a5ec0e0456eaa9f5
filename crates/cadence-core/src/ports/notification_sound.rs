pub trait NotificationSound: Send + Sync {
    fn play_notification(&self);
}
