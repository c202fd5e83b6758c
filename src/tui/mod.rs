// Interactive terminal for a single serial session

pub mod app;
pub mod event;
pub mod input;
pub mod state;
pub mod ui;
pub mod widgets;

use crate::core::{session::SessionController, transcript::HexDumpOptions};
use crate::domain::error::TermResult;

/// Run the full-screen terminal until the user quits
pub async fn run(controller: SessionController, hex_options: HexDumpOptions) -> TermResult<()> {
    let mut app = app::App::new(controller, hex_options)?;
    app.run().await
}
