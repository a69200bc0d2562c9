use subc_drv::Cli;

fn main() {
    let result = Cli::parse_or_usage_error().and_then(subc_drv::run);
    if let Err(err) = result {
        eprintln!("subc: {}", err);
        std::process::exit(err.exit_code());
    }
}
