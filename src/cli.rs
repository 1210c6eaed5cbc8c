mod fetch;
mod serve;

use clap::{Parser, Subcommand};
use reqwest::Url;

pub use self::{fetch::FetchArgs, serve::ServeArgs};
use crate::api::eptr::{self, Endpoints};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch the prices of one day, print a preview, and save them into a CSV file.
    #[clap(name = "fetch")]
    Fetch(Box<FetchArgs>),

    /// Run the web dashboard.
    #[clap(name = "serve")]
    Serve(Box<ServeArgs>),
}

#[derive(Parser)]
pub struct EptrArgs {
    /// CAS endpoint which issues ticket-granting tickets.
    #[clap(long = "eptr-login-url", env = "EPTR_LOGIN_URL", default_value = eptr::LOGIN_URL)]
    pub login_url: Url,

    /// Electricity service base URL.
    #[clap(long = "eptr-base-url", env = "EPTR_BASE_URL", default_value = eptr::BASE_URL)]
    pub base_url: Url,
}

impl EptrArgs {
    pub fn endpoints(&self) -> Endpoints {
        Endpoints { login_url: self.login_url.clone(), base_url: self.base_url.clone() }
    }
}
