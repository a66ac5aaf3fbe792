fn main() {
    if let Err(e) = exprscope_cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
