use std::process::ExitCode;

fn main() -> ExitCode {
    match formcheck::cli::main() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}
