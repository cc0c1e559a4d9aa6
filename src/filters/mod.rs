//! Filter widgets state

pub mod filter_popup;

pub use filter_popup::{
    ButtonView, FilterControl, FilterPopup, FilterPopupOptions, FilterPopupView, PopupState,
    SaveOutcome,
};
