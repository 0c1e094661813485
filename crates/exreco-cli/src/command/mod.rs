use clap::{Parser, Subcommand};

use self::{recommend::RecommendArg, sample::SampleArg};

mod recommend;
mod sample;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Recommend exercises for a learner using a genetic algorithm
    Recommend(#[clap(flatten)] RecommendArg),
    /// Write an example request file
    Sample(#[clap(flatten)] SampleArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Recommend(arg) => recommend::run(&arg)?,
        Mode::Sample(arg) => sample::run(&arg)?,
    }
    Ok(())
}
