//! Editor model behind the message composer: the text buffer, `@mention`
//! detection and suggestions, and the submit flow. Nothing here knows how it
//! is drawn; the terminal front end lives in `huddle-tui`.

#![deny(clippy::print_stdout, clippy::print_stderr)]

mod composer;
pub mod error;
pub mod event;
pub mod mention_detector;
pub mod mention_editor;
mod orchestrator;
pub mod suggestion_overlay;
pub mod text_buffer;

pub use composer::Composer;
pub use error::ComposerErr;
pub use event::ComposerEvent;
pub use event::ComposerEventSender;
pub use event::Notice;
pub use event::NoticeLevel;
pub use mention_detector::MentionCandidate;
pub use mention_detector::detect;
pub use mention_editor::insert_mention;
pub use orchestrator::ComposerOrchestrator;
pub use orchestrator::Draft;
pub use orchestrator::SentMessage;
pub use orchestrator::SubmitOutcome;
pub use orchestrator::shared_files_placeholder;
pub use suggestion_overlay::Anchor;
pub use suggestion_overlay::CaretLocator;
pub use suggestion_overlay::KeyOutcome;
pub use suggestion_overlay::OverlayKey;
pub use suggestion_overlay::Selection;
pub use suggestion_overlay::SuggestionOverlay;
pub use suggestion_overlay::SuggestionState;
pub use text_buffer::TextBuffer;
