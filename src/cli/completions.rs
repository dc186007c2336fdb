//! Completions command implementation

use crate::cli::{Cli, CompletionsArgs};
use clap::CommandFactory;
use clap_complete::generate;
use std::io;

/// Write completions for `shell` to `out`.
pub fn write_completions(shell: clap_complete::Shell, out: &mut dyn io::Write) {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, out);
}

/// Handle `gluetun-webui completions` command
pub fn handle_completions(args: &CompletionsArgs) {
    write_completions(args.shell, &mut io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap_complete::Shell;

    #[test]
    fn test_completions_bash_mention_subcommands() {
        let mut out = Vec::new();
        write_completions(Shell::Bash, &mut out);
        let script = String::from_utf8(out).unwrap();
        assert!(script.contains("gluetun-webui"));
        assert!(script.contains("watch"));
    }

    #[test]
    fn test_completions_zsh() {
        let mut out = Vec::new();
        write_completions(Shell::Zsh, &mut out);
        assert!(!out.is_empty());
    }
}
