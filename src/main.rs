fn main() {
    if let Err(err) = sbd::run() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}
