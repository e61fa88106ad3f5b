//! Dialog runtime
//!
//! A stack-based, resumable dialog execution engine for conversational
//! applications. It provides:
//! - Composable dialogs: leaf prompts, waterfalls, and container dialogs
//!   that nest whole child trees behind one id
//! - A persisted dialog stack that records exactly where a conversation
//!   paused between turns and resumes deterministically on the next message
//! - A per-turn driver with session expiry and recursive registration of
//!   nested dialog trees
//! - A choice recognizer that resolves free-text replies against a closed
//!   set of choices by value, synonym, or positional reference
//!
//! The engine performs no I/O of its own: the host supplies a turn context
//! (inbound message, outbound queue, per-turn scratch state) and a
//! conversation store (load/save of the persisted stack).

pub mod choices;
pub mod component;
pub mod dialog;
pub mod dialog_context;
pub mod dialog_set;
pub mod error;
pub mod manager;
pub mod prompts;
pub mod state;
pub mod storage;
pub mod turn;
pub mod waterfall;

// Re-export main types
pub use choices::{
    find_choices, find_values, recognize_choices, Choice, ChoiceAction, FindChoicesOptions,
    FindValuesOptions, FoundChoice, FoundValue, ModelResult, RecognizeChoicesOptions, SortedValue,
};

pub use component::ComponentDialog;

pub use dialog::{
    dialog_events, Dialog, DialogEvent, DialogReason, DialogTurnResult, DialogTurnStatus,
};

pub use dialog_context::{DialogContext, MAX_STACK_DEPTH};
pub use dialog_set::DialogSet;
pub use error::{DialogError, DialogResult};
pub use manager::{DialogManager, DialogManagerResult, MAX_REGISTRATION_DEPTH};
pub use prompts::{ChoicePrompt, PromptOptions, TextPrompt};
pub use state::{DialogInstance, PersistedConversation};
pub use storage::{ConversationStore, MemoryConversationStore, StoredConversation};
pub use turn::{Activity, TurnContext};
pub use waterfall::{
    StepFuture, StepResult, WaterfallDialog, WaterfallStep, WaterfallStepContext,
};
