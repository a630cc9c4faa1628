use azure_vm_topology::config::{Settings, DEFAULT_LOG_CONFIG};
use azure_vm_topology::load_topology;
use azure_vm_topology::output::print_topology;
use colored::Colorize;
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    log4rs::init_file(DEFAULT_LOG_CONFIG, Default::default())?;
    dotenv::dotenv().ok();
    //
    log::info!("#Start main()");

    let settings = Settings::from_env()?;
    let (subscription, failures) = load_topology(&settings).await?;

    print_topology(&subscription);
    for failure in &failures {
        println!("{} {failure}", "PARTIAL".on_yellow());
    }

    Ok(())
}
