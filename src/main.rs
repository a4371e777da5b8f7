fn main() {
    if let Err(err) = tgconsole::cli::main() {
        eprintln!("❌ {err}");
        std::process::exit(1);
    }
}
