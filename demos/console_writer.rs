use dragon_options::writer::{add_console_writer, add_console_writer_from_config, ConsoleWriter};
use dragon_options::{AppContext, Config};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), dragon_options::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // DEMO__CONSOLEWRITER__MESSAGE overrides the file value.
    let config = Config::builder()
        .with_file("demos/config.toml", true)
        .with_env("DEMO", "__")
        .load()?;

    let manual = std::env::args().any(|arg| arg == "--manual");

    let ctx = AppContext::builder()
        .with_options(|options| {
            if manual {
                add_console_writer(options, |o| o.message = "Hello world!".into());
            } else {
                add_console_writer_from_config(options, &config);
            }
        })
        .with_config(config)
        .build();

    let writer: ConsoleWriter = ctx.get()?;
    writer.write(&mut std::io::stdout().lock())?;

    Ok(())
}
