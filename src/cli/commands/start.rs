use clap::Args;

use crate::config::{AppConfig, StoreKind};

#[derive(Args, Debug)]
pub struct StartArgs {
    #[arg(long, help = "Host address for the server")]
    pub host: Option<String>,

    #[arg(short, long, help = "Port number for the server")]
    pub port: Option<u16>,

    #[arg(long, value_enum, help = "Storage backend")]
    pub store: Option<StoreKind>,

    #[arg(long, help = "Skip loading the demo engineer profiles")]
    pub no_seed: bool,
}

impl StartArgs {
    /// Command-line flags win over environment configuration
    pub fn apply(self, config: &mut AppConfig) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(store) = self.store {
            config.server.store = store;
        }
        if self.no_seed {
            config.database.seed = false;
        }
    }
}

pub async fn handle(args: StartArgs) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env()?;
    args.apply(&mut config);
    tracing::debug!("Resolved configuration: {:?}", config);

    crate::server::run(config).await
}
