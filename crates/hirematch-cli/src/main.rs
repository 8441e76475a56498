//! `hirematch` binary.
//!
//! ```bash
//! hirematch search-candidates --keywords nurse --top-m 5
//! hirematch search-jobs --resume-file cv.txt
//! hirematch health
//! ```

use clap::Parser;
use hirematch_cli::{CliArgs, HirematchCli, exit_code};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    let result = match HirematchCli::from_args(&args) {
        Ok(cli) => cli.run(args).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(exit_code(&e));
    }
}
