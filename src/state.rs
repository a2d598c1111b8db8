use crate::client::DataClient;
use crate::controller::Controller;
use crate::view::PageView;
use std::{sync::Arc, time::Duration};

pub type PageController = Controller<Arc<dyn DataClient>, PageView>;

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<PageController>,
}

impl AppState {
    pub fn new(client: Arc<dyn DataClient>, banner_hide_after: Duration) -> Self {
        Self {
            controller: Arc::new(Controller::new(client, PageView::new(), banner_hide_after)),
        }
    }
}
