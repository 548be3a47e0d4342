fn main() {
    if let Err(error) = roi_annotate::run_cli() {
        eprintln!("{error}");
        std::process::exit(1);
    }
}
