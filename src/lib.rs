pub mod cli;
pub mod export;
pub mod formats;
pub mod geometry;
pub mod model;
pub mod project;
pub mod runtime;
pub mod stacks;
pub mod viewer;

pub fn run_cli() -> Result<(), String> {
    cli::run_cli()
}
