use std::sync::Arc;

use super::{config::Config, database::Store};

pub struct State {
    pub config: Config,
    pub store: Store,
}

impl State {
    pub fn new() -> Arc<Self> {
        Self::with_config(Config::load())
    }

    pub fn with_config(config: Config) -> Arc<Self> {
        let store = Store::new(&config);

        Arc::new(Self { config, store })
    }
}
