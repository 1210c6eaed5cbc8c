use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;

use crate::{
    cli::EptrArgs,
    dashboard::{AppState, serve},
    prelude::*,
};

#[derive(Parser)]
pub struct ServeArgs {
    #[clap(long, env = "PTF_BIND", default_value = "127.0.0.1:8501")]
    pub bind: SocketAddr,

    /// TOML file with the `[eptr_credentials]` section.
    #[clap(long = "secrets", env = "PTF_SECRETS", default_value = ".streamlit/secrets.toml")]
    pub secrets_path: PathBuf,

    #[clap(flatten)]
    pub eptr: EptrArgs,
}

impl ServeArgs {
    pub async fn run(self) -> Result {
        let state = AppState::builder()
            .endpoints(self.eptr.endpoints())
            .secrets_path(self.secrets_path)
            .build();
        serve(self.bind, state).await
    }
}
