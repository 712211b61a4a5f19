use std::{ops::Deref, sync::Arc};

use derive_new::new;

use crate::config::Config;
use crate::service::database::Backend;
use crate::service::progress_manager::ProgressManager;

#[derive(Debug, Clone, new)]
pub struct App {
    pub manager: Arc<ProgressManager<Backend>>,
}

impl Deref for App {
    type Target = ProgressManager<Backend>;

    fn deref(&self) -> &Self::Target {
        &self.manager
    }
}

pub fn create_app(config: &Config, backend: Backend) -> App {
    let manager = ProgressManager::new(backend, config.position_policy, config.retry);

    App {
        manager: Arc::new(manager),
    }
}
