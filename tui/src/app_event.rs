use huddle_composer::ComposerEvent;
use huddle_composer::SubmitOutcome;
use huddle_core::PendingFile;

#[allow(clippy::large_enum_variant)]
#[derive(Debug)]
pub(crate) enum AppEvent {
    /// Progress snapshot or notice raised while a submit runs.
    Composer(ComposerEvent),

    /// A submit task finished. The error is already user-facing text.
    SubmitFinished(Result<SubmitOutcome, String>),

    /// A file requested with `/attach` or `--file` has been read.
    FileLoaded(Result<PendingFile, String>),

    /// Request to exit the application gracefully.
    ExitRequest,
}
