//! `stashbox completions <shell>`.

use std::io::{self, Write};

use clap::CommandFactory as _;
use clap_complete::Shell;

use crate::cli::Cli;

/// Print the completion script for `shell` to stdout.
pub fn generate_completions(shell: Shell) {
    let mut stdout = io::stdout().lock();
    write_completions(shell, &mut stdout);
    stdout.flush().ok();
}

fn write_completions(shell: Shell, out: &mut impl Write) {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_owned();
    clap_complete::generate(shell, &mut cmd, bin_name, out);
}
