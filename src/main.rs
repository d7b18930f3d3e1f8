fn main() -> std::process::ExitCode {
    text_extractor_lib::run()
}
