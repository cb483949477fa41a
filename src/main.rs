use color_eyre::Result;

mod app;
mod cli;
mod errors;
mod logging;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse_args();

    if let Some(ref data_dir) = args.data_dir {
        // SAFETY: This is called at program startup before any other threads exist
        unsafe {
            std::env::set_var("ETH_TRANSFERS_DATA", data_dir);
        }
    }

    errors::install_hooks(&args.network)?;
    logging::init(&args.network)?;

    let app = app::App::new(&args)?;

    app.run(args.command).await?;

    Ok(())
}
