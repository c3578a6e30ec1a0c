fn main() {
    if let Err(err) = layoffs_cleaner::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
