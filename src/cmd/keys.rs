use crate::reports;
use chordforge::core_types::Mode;
use clap::Args;
use strum::IntoEnumIterator;

#[derive(Args, Debug, Clone)]
pub struct KeysArgs {
    /// Only show keys of this mode.
    #[arg(long)]
    pub mode: Option<Mode>,
}

pub fn run(args: &KeysArgs) {
    match args.mode {
        Some(mode) => reports::print_key_table(mode),
        None => Mode::iter().for_each(reports::print_key_table),
    }
}
