pub mod app;
pub mod components;
pub mod state;
pub mod surface;

pub use app::MurmurApp;
pub use state::UiState;
pub use surface::RepaintSurface;

use crate::integration::MurmurConfig;
use eframe::egui;

/// Open the main window and block until it closes
pub fn run(config: MurmurConfig) -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([720.0, 560.0])
            .with_min_inner_size([420.0, 320.0])
            .with_title("Murmur"),
        ..Default::default()
    };

    eframe::run_native(
        "Murmur",
        options,
        Box::new(move |cc| Ok(Box::new(MurmurApp::new(cc, &config)?))),
    )
}
