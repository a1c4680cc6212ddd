//! Command-line entry point: discovers the standard archives under
//! `JAVA_HOME` and drives the machine.

use std::{env, error::Error, path::PathBuf, process::ExitCode};

use clap::Parser;
use cortado::jvm::vm::{DEFAULT_MAIN_CLASS, Options, VirtualMachine};

#[derive(Debug, Parser)]
#[command(version, about = "An embryonic Java Virtual Machine")]
struct Cli {
    /// Binary internal name of the main class (e.g. `java/lang/Object`).
    main_class: Option<String>,
    /// Emit a trace line per executed opcode.
    #[arg(long)]
    trace: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let java_home = env::var("JAVA_HOME").map_err(|_| "JAVA_HOME is not set")?;
    let lib = PathBuf::from(java_home).join("jre").join("lib");
    let archives = ["rt.jar", "jce.jar", "jsse.jar"]
        .into_iter()
        .map(|jar| lib.join(jar))
        .collect();
    let options = Options {
        archives,
        main_class: Some(
            cli.main_class
                .unwrap_or_else(|| DEFAULT_MAIN_CLASS.to_owned()),
        ),
        trace: cli.trace,
    };
    let mut vm = VirtualMachine::new(options)?;
    vm.run_main()?;
    Ok(())
}
