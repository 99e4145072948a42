use dirk_di::DispatchingInjector;

use crate::{
    errors::SampleError,
    main_screen::{MainScreen, MainScreenText},
};

pub const LOADING_TEXT: &str = "Loading...";

/// Shows the loading text, then opens the main screen in a fresh session
pub fn launch(injector: &DispatchingInjector) -> Result<(MainScreen, MainScreenText), SampleError> {
    tracing::info!("{LOADING_TEXT}");

    let mut screen = MainScreen::new(injector.open_session());
    let text = screen.create(injector)?;
    Ok((screen, text))
}
