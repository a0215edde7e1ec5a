/// Initialises `env_logger`: trace output when `verbose`, silent otherwise.
pub fn init_logger(verbose: bool) {
    env_logger::Builder::new()
        .filter_level(if verbose {
            log::LevelFilter::Trace
        } else {
            log::LevelFilter::Off
        })
        .init();
}
