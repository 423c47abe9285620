use anyhow::Result;

mod app;
mod logging;

fn main() -> Result<()> {
    let args = launch_sync::cli::parse();
    app::run(args)
}
