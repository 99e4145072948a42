use dirk_di::InjectionTarget;
use dirk_sample::{app, splash};
use tracing_subscriber::EnvFilter;

fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,dirk_di=debug"))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing()?;

    let component = app::build_component(app::default_configs()?)?;
    let injector = component.injector();

    let (screen, text) = splash::launch(injector)?;
    println!("{}", text.formatted_name);
    println!("{}", text.view_model_name);

    injector.end_session(screen.session());
    tracing::info!(
        "Main screen closed, {} child scopes alive",
        component.container().scopes().live_scopes().len()
    );
    Ok(())
}
