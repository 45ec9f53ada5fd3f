//! ElanCart CLI

use std::process;

use clap::Parser;

mod cli;

#[tokio::main]
pub async fn main() {
    let _env = dotenvy::dotenv();

    let cli = cli::Cli::parse();

    if let Err(error) = cli.run().await {
        #[expect(
            clippy::print_stderr,
            reason = "command errors are reported on stderr"
        )]
        {
            eprintln!("{error}");
        }

        #[expect(clippy::exit, reason = "non-zero status on command failure")]
        process::exit(1);
    }
}
