pub mod input_bar;
pub mod message_list;
pub mod voice_controls;

pub use input_bar::InputBar;
pub use message_list::MessageList;
pub use voice_controls::VoiceControls;
