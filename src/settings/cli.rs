use super::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "latchkey", about = "Issue and verify signed access/refresh tokens")]
pub struct Cli {
    #[arg(long, global = true)]
    pub settings: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Issue an access/refresh pair and persist the refresh token
    Issue {
        #[arg(long)]
        subject: String,
    },
    /// Verify a token against its signature and the token store
    ///
    /// With `store.backend = "memory"` the store starts empty on every run,
    /// so tokens issued by an earlier `latchkey issue` are never found.
    /// Use the mysql or redis backend to verify across runs.
    Verify {
        #[arg(long)]
        token: String,
        #[arg(long = "type", default_value = "refresh")]
        token_type: String,
    },
    /// Check signature and expiry only, and print the payload
    Decode {
        #[arg(long)]
        token: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_help_warns_about_memory_backend() {
        let mut cmd = Cli::command();
        let verify = cmd
            .find_subcommand_mut("verify")
            .expect("verify subcommand");
        let help = verify.render_long_help().to_string();
        assert!(help.contains("memory"));
        assert!(help.contains("never found"));
    }

    #[test]
    fn verify_defaults_to_refresh_type() {
        let cli = Cli::try_parse_from(["latchkey", "verify", "--token", "abc"]).unwrap();
        match cli.command {
            Command::Verify { token, token_type } => {
                assert_eq!(token, "abc");
                assert_eq!(token_type, "refresh");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
