use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::ai::completion::CompletionClient;
use crate::services::dispatcher::Dispatcher;
use crate::services::messaging::MessagingProvider;

pub struct AppState {
    pub config: AppConfig,
    pub completion: CompletionClient,
    pub dispatcher: Dispatcher,
    pub messaging: Option<Arc<dyn MessagingProvider>>,
}
