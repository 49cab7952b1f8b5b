use anyhow::Context;
use initium::kernel::config::load_config;
use initium_server::{Server, init_logger};

#[initium_runtime::main(server)]
async fn main() -> anyhow::Result<()> {
    let path = std::env::args().nth(1);
    let cfg: initium::domain::config::ApiConfig = load_config(path.as_deref()).context("Critical: Configuration is malformed")?;

    let _log = init_logger(env!("CARGO_PKG_NAME"), &cfg.logging)?;

    Server::builder().config(cfg).build().await?.run().await
}
