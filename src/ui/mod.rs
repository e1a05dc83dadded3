/// User interface building blocks
///
/// - Card grid of the main window (grid.rs)
/// - Popup forms and dialogs (forms.rs)
/// - Modal overlay used to show popups (modal.rs)

pub mod forms;
pub mod grid;
pub mod modal;
