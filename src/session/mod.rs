/// Request lifecycle, render loop tick and export gate.
pub mod controller;
/// Card geometry, text placement and fonts, loadable from JSON.
pub mod layout;
