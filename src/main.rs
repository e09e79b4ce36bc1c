use BioTransKin::Examples::biodiesel_examples::bio_examples;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

pub fn main() {
    TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .unwrap_or_else(|e| eprintln!("logger init failed: {}", e));
    //
    let task: usize = 0;
    bio_examples(task);
}
