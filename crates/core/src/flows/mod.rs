pub mod engine;
pub mod states;

pub use engine::DialogueEngine;
pub use states::{
    ChoiceData, ChoiceKind, ChoiceOption, Command, Completion, DialogueStep, Keyboard, Reply,
    TurnOutcome, UserAction, CONFIRM_CANCEL, CONFIRM_GENERATE, MENU_BUTTON,
};
