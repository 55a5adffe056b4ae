use dpop_cli::CliError;

fn main() {
    if let Err(e) = dpop_cli::run() {
        eprintln!("Error: {e:#}");
        if let Some(cli_error) = e.downcast_ref::<CliError>() {
            for hint in cli_error.suggestions() {
                eprintln!("  hint: {hint}");
            }
        }
        std::process::exit(1);
    }
}
