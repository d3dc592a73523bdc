//! Shell completions generation.

use clap::CommandFactory;
use clap_complete::Shell;

use crate::cli::args::Cli;
use crate::error::SiteTimeError;

const BIN_NAME: &str = "sitetime";

/// Generate the completion script for `shell`.
///
/// # Errors
///
/// Returns an error if the generated script is not valid UTF-8.
pub fn generate_completions(shell: Shell) -> Result<String, SiteTimeError> {
    let mut cmd = Cli::command();
    let mut buf = Vec::new();
    clap_complete::generate(shell, &mut cmd, BIN_NAME, &mut buf);
    String::from_utf8(buf).map_err(|e| SiteTimeError::Parse(format!("UTF-8 error: {e}")))
}

/// Installation instructions for shell completions.
#[must_use]
pub fn completion_install_instructions(shell: Shell) -> String {
    match shell {
        Shell::Bash => r"# Add to ~/.bashrc:
source <(sitetime completions bash)
"
        .to_string(),

        Shell::Zsh => r"# Save to your fpath:
sitetime completions zsh > ~/.zsh/completions/_sitetime
# Then add to ~/.zshrc (before compinit):
fpath=(~/.zsh/completions $fpath)
"
        .to_string(),

        Shell::Fish => r"# Save to fish completions directory:
sitetime completions fish > ~/.config/fish/completions/sitetime.fish
"
        .to_string(),

        Shell::PowerShell => r"# Add to your PowerShell profile ($PROFILE):
sitetime completions powershell | Out-String | Invoke-Expression
"
        .to_string(),

        other => format!("# Save the output of `sitetime completions {other}` where your shell loads completions\n"),
    }
}

/// Execute completions command
///
/// # Errors
///
/// Returns an error if script generation fails.
pub fn completions(shell: Shell, install: bool) -> Result<String, SiteTimeError> {
    if install {
        Ok(completion_install_instructions(shell))
    } else {
        generate_completions(shell)
    }
}
