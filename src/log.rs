use tracing_subscriber::{reload, EnvFilter, Registry};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub struct Logger {
    handle: reload::Handle<EnvFilter, Registry>,
}

impl Logger {
    pub fn new(default_level: &str) -> Self {
        let filter = EnvFilter::try_new(default_level).unwrap_or_else(|_| EnvFilter::new("info"));
        let (filter, handle) = reload::Layer::new(filter);
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
        Self { handle }
    }

    pub fn set_log_level(&self, level: &str) {
        if let Ok(filter) = EnvFilter::try_new(level) {
            let _ = self.handle.reload(filter);
        }
    }
}

pub fn init_logging(default_level: &str) -> Logger {
    Logger::new(default_level)
}
