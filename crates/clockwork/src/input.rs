use strum::{Display as StrumDisplay, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, StrumDisplay)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum MouseButton {
    #[strum(to_string = "left", serialize = "l", serialize = "1")]
    Left,
    #[strum(to_string = "right", serialize = "r", serialize = "3")]
    Right,
}
