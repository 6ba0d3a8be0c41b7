use hearth::{cli::run_cli, init};

fn main() {
    init();

    if let Err(err) = run_cli() {
        eprintln!("{}", hearth::cli::output::error(err.code(), &err));
        std::process::exit(1);
    }
}
