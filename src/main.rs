//! templeton's main application entry point and orchestration logic.

use log::debug;
use templeton::{
    assets::copy_tree,
    cli::{get_args, Args, Settings},
    config::{asset_dir, load_config},
    error::{default_error_handler, Result},
    extract::collect_config_keys,
    logger::init_logger,
    processor::Processor,
    prompt::{collect_variables, DialoguerPrompter},
    template::Engine,
};

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

/// Main application logic execution.
///
/// # Flow
/// 1. Resolves the configuration path and any supplied answers
/// 2. Copies the static asset directory into the output root
/// 3. Loads the configuration
/// 4. Discovers and collects variables unless values were supplied
/// 5. Renders every descriptor
fn run(args: Args) -> Result<()> {
    let settings = Settings::from_args(args)?;
    let engine = Engine::new();

    copy_tree(asset_dir(&settings.config_path), &settings.root)?;
    let config = load_config(&settings.config_path)?;

    let data = match settings.data {
        Some(data) => {
            debug!("Using {} supplied value(s), skipping prompts", data.len());
            data
        }
        None => {
            let keys: Vec<String> = collect_config_keys(&config.templates)?.into_iter().collect();
            collect_variables(&DialoguerPrompter::new(), &keys, &config.variables)?
        }
    };

    let processor = Processor::new(&engine, &settings.root, &data);
    processor.generate(&config.templates)?;
    Ok(())
}
