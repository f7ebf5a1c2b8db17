use shareit_core::{BookingService, Database, ItemService, RequestService, UserService};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub items: ItemService,
    pub bookings: BookingService,
    pub requests: RequestService,
    pub default_page_size: i64,
}

impl AppState {
    /// All services share one backing store.
    pub fn new(db: Arc<dyn Database>, default_page_size: i64) -> Self {
        Self {
            users: UserService::new(db.clone()),
            items: ItemService::new(db.clone()),
            bookings: BookingService::new(db.clone()),
            requests: RequestService::new(db),
            default_page_size,
        }
    }
}
