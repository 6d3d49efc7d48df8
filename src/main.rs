// src/main.rs
mod app;
mod assets;
mod config;
mod input;
mod model;
mod render;
mod sim;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    let args = config::Args::parse();
    app::run(args)
}
