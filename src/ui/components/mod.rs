mod action_menu;
mod city_picker;
mod command_overlay;
mod confirm;
mod footer;
mod input;
mod key_result;
mod search_input;
mod status_filter_bar;
mod status_picker;
mod toast;

pub use action_menu::{ActionMenu, ActionMenuEvent, RowAction};
pub use city_picker::{CityPicker, CityPickerEvent};
pub use command_overlay::draw_command_overlay;
pub use confirm::{ConfirmDialog, ConfirmEvent};
pub use footer::draw_footer;
pub use input::{InputResult, TextInput};
pub use key_result::KeyResult;
pub use search_input::{SearchEvent, SearchInput};
pub use status_filter_bar::{FilterBarEvent, StatusFilterBar};
pub use status_picker::{StatusPicker, StatusPickerEvent};
pub use toast::{ToastKind, Toasts};
