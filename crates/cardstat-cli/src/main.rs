mod command;
mod config;
mod logging;
mod util;

fn main() -> anyhow::Result<()> {
    command::run()
}
