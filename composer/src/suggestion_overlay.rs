//! Open/closed lifecycle of the mention suggestion list.
//!
//! [`SuggestionOverlay`] is a plain state machine: feed it every text change
//! and every navigation key, then render whatever [`SuggestionOverlay::state`]
//! returns. It never touches the buffer itself; a confirmed choice comes back
//! as a [`Selection`] for the caller to splice in.

use huddle_protocol::ActiveUser;

use crate::mention_detector::MentionCandidate;
use crate::mention_detector::detect;

/// On-screen position of the overlay, taken from the trigger character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Anchor {
    pub top: u16,
    pub left: u16,
}

/// Maps a char offset of the buffer to where that character is drawn.
pub trait CaretLocator {
    fn locate(&self, text: &str, char_index: usize) -> Option<Anchor>;
}

/// Visible state of an open overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionState {
    pub trigger_start: usize,
    pub search_term: String,
    /// User names matching `search_term`, in the order they were supplied.
    pub matches: Vec<String>,
    pub highlighted: usize,
    pub anchor: Anchor,
}

impl SuggestionState {
    pub fn highlighted_name(&self) -> Option<&str> {
        self.matches.get(self.highlighted).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKey {
    Up,
    Down,
    Enter,
    Escape,
}

/// A name the user picked, to be spliced over `trigger_start..cursor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub trigger_start: usize,
    pub user_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The overlay is closed; the key belongs to the editor.
    Ignored,
    /// The key moved the highlight; the editor must not act on it.
    Consumed,
    Selected(Selection),
    Dismissed,
}

#[derive(Debug, Default)]
pub struct SuggestionOverlay {
    state: Option<SuggestionState>,
    /// Candidate the user escaped from. The overlay stays closed while the
    /// same candidate is detected.
    dismissed: Option<MentionCandidate>,
}

/// Case-insensitive substring match of `search_term` against user names.
fn filter_users(users: &[ActiveUser], search_term: &str) -> Vec<String> {
    let needle = search_term.to_lowercase();
    users
        .iter()
        .filter(|u| u.user_name.to_lowercase().contains(&needle))
        .map(|u| u.user_name.clone())
        .collect()
}

impl SuggestionOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Option<&SuggestionState> {
        self.state.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.state.is_some()
    }

    /// Re-evaluate after any buffer change or cursor move.
    pub fn on_text_change(
        &mut self,
        text: &str,
        cursor: usize,
        users: &[ActiveUser],
        locator: &dyn CaretLocator,
    ) {
        let Some(candidate) = detect(text, cursor) else {
            self.dismissed = None;
            self.close();
            return;
        };
        if self.dismissed.as_ref() == Some(&candidate) {
            return;
        }
        self.dismissed = None;

        let matches = filter_users(users, &candidate.search_term);
        if matches.is_empty() {
            self.close();
            return;
        }

        match &mut self.state {
            Some(state) if state.trigger_start == candidate.trigger_start => {
                state.highlighted = state.highlighted.min(matches.len() - 1);
                state.search_term = candidate.search_term;
                state.matches = matches;
            }
            _ => {
                let anchor = locator
                    .locate(text, candidate.trigger_start)
                    .unwrap_or_default();
                self.state = Some(SuggestionState {
                    trigger_start: candidate.trigger_start,
                    search_term: candidate.search_term,
                    matches,
                    highlighted: 0,
                    anchor,
                });
            }
        }
    }

    pub fn handle_key(&mut self, key: OverlayKey) -> KeyOutcome {
        let Some(state) = &mut self.state else {
            return KeyOutcome::Ignored;
        };
        let n = state.matches.len();
        match key {
            OverlayKey::Up => {
                state.highlighted = (state.highlighted + n - 1) % n;
                KeyOutcome::Consumed
            }
            OverlayKey::Down => {
                state.highlighted = (state.highlighted + 1) % n;
                KeyOutcome::Consumed
            }
            OverlayKey::Enter => {
                let index = state.highlighted;
                match self.select(index) {
                    Some(selection) => KeyOutcome::Selected(selection),
                    None => KeyOutcome::Ignored,
                }
            }
            OverlayKey::Escape => {
                self.dismissed = self.state.take().map(|s| MentionCandidate {
                    trigger_start: s.trigger_start,
                    search_term: s.search_term,
                });
                KeyOutcome::Dismissed
            }
        }
    }

    /// Pick row `index` directly (mouse click). Same effect as highlighting
    /// it and pressing Enter.
    pub fn select(&mut self, index: usize) -> Option<Selection> {
        let state = self.state.as_ref()?;
        let user_name = state.matches.get(index)?.clone();
        let selection = Selection {
            trigger_start: state.trigger_start,
            user_name,
        };
        self.close();
        Some(selection)
    }

    pub fn close(&mut self) {
        self.state = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Single-line layout where every char is one cell wide.
    struct Column;

    impl CaretLocator for Column {
        fn locate(&self, _text: &str, char_index: usize) -> Option<Anchor> {
            Some(Anchor {
                top: 0,
                left: char_index as u16,
            })
        }
    }

    fn users(names: &[&str]) -> Vec<ActiveUser> {
        names.iter().map(|n| ActiveUser::new(*n)).collect()
    }

    fn open_at(overlay: &mut SuggestionOverlay, text: &str) {
        overlay.on_text_change(
            text,
            text.chars().count(),
            &users(&["alice", "Alan", "bob"]),
            &Column,
        );
    }

    #[test]
    fn opens_on_trigger_with_filtered_matches() {
        let mut overlay = SuggestionOverlay::new();
        open_at(&mut overlay, "hello @al");
        assert_eq!(
            overlay.state(),
            Some(&SuggestionState {
                trigger_start: 6,
                search_term: "al".to_string(),
                matches: vec!["alice".to_string(), "Alan".to_string()],
                highlighted: 0,
                anchor: Anchor { top: 0, left: 6 },
            })
        );
    }

    #[test]
    fn bare_trigger_lists_everyone() {
        let mut overlay = SuggestionOverlay::new();
        open_at(&mut overlay, "@");
        assert_eq!(overlay.state().map(|s| s.matches.len()), Some(3));
    }

    #[test]
    fn stays_closed_when_nothing_matches() {
        let mut overlay = SuggestionOverlay::new();
        open_at(&mut overlay, "@zed");
        assert!(!overlay.is_open());
    }

    #[test]
    fn arrows_wrap_around() {
        let mut overlay = SuggestionOverlay::new();
        open_at(&mut overlay, "@a");
        // alice, Alan
        assert_eq!(overlay.handle_key(OverlayKey::Up), KeyOutcome::Consumed);
        assert_eq!(overlay.state().map(|s| s.highlighted), Some(1));
        assert_eq!(overlay.handle_key(OverlayKey::Down), KeyOutcome::Consumed);
        assert_eq!(overlay.state().map(|s| s.highlighted), Some(0));
        assert_eq!(overlay.handle_key(OverlayKey::Down), KeyOutcome::Consumed);
        assert_eq!(
            overlay.state().and_then(SuggestionState::highlighted_name),
            Some("Alan")
        );
    }

    #[test]
    fn narrowing_clamps_the_highlight_and_empty_list_closes() {
        let mut overlay = SuggestionOverlay::new();
        open_at(&mut overlay, "@a");
        overlay.handle_key(OverlayKey::Down);
        assert_eq!(overlay.state().map(|s| s.highlighted), Some(1));

        open_at(&mut overlay, "@ali");
        let state = overlay.state().cloned();
        assert_eq!(state.as_ref().map(|s| s.highlighted), Some(0));
        assert_eq!(state.map(|s| s.search_term), Some("ali".to_string()));

        open_at(&mut overlay, "@alix");
        assert!(!overlay.is_open());
    }

    #[test]
    fn typing_a_space_closes() {
        let mut overlay = SuggestionOverlay::new();
        open_at(&mut overlay, "@al");
        assert!(overlay.is_open());
        open_at(&mut overlay, "@al ");
        assert!(!overlay.is_open());
    }

    #[test]
    fn enter_selects_the_highlighted_name_and_closes() {
        let mut overlay = SuggestionOverlay::new();
        open_at(&mut overlay, "hi @b");
        assert_eq!(
            overlay.handle_key(OverlayKey::Enter),
            KeyOutcome::Selected(Selection {
                trigger_start: 3,
                user_name: "bob".to_string(),
            })
        );
        assert!(!overlay.is_open());
        assert_eq!(overlay.handle_key(OverlayKey::Enter), KeyOutcome::Ignored);
    }

    #[test]
    fn click_selects_a_row() {
        let mut overlay = SuggestionOverlay::new();
        open_at(&mut overlay, "@a");
        assert_eq!(overlay.select(5), None);
        assert!(overlay.is_open());
        assert_eq!(
            overlay.select(1).map(|s| s.user_name),
            Some("Alan".to_string())
        );
        assert!(!overlay.is_open());
    }

    #[test]
    fn escape_is_remembered_until_the_token_changes() {
        let mut overlay = SuggestionOverlay::new();
        open_at(&mut overlay, "@al");
        assert_eq!(overlay.handle_key(OverlayKey::Escape), KeyOutcome::Dismissed);
        assert!(!overlay.is_open());

        // The same token reported again, with no edit in between, stays closed.
        open_at(&mut overlay, "@al");
        assert!(!overlay.is_open());

        open_at(&mut overlay, "@ali");
        assert!(overlay.is_open());
    }

    #[test]
    fn keys_are_ignored_while_closed() {
        let mut overlay = SuggestionOverlay::new();
        assert_eq!(overlay.handle_key(OverlayKey::Down), KeyOutcome::Ignored);
        assert_eq!(overlay.handle_key(OverlayKey::Escape), KeyOutcome::Ignored);
    }
}
