mod cli;
mod config;
mod layout;
mod logging;
mod materialize;
mod runner;
mod templates;
mod util;

fn main() -> anyhow::Result<()> {
    let app = cli::parse();
    logging::init(app.verbose);
    runner::run(app)
}
