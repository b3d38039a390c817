mod app;
mod catalog;
mod config;
mod library;
mod mpris;
mod preview;
mod runtime;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
