pub mod punch_buttons;
