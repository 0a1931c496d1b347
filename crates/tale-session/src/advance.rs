//! Driving a story through its continue/choice cycle.

use tale_core::{ChoiceView, Story, StoryResult};

use crate::error::{SessionError, SessionResult};
use crate::transcript::Transcript;

/// How newly emitted text is merged into the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceMode {
    /// Replace the transcript (fresh start or reload).
    Replace,
    /// Append to the transcript (in-session progression).
    Append,
}

/// Continue the story until it stops at a choice point or ends.
///
/// Blank lines are dropped. The transcript is only touched once every step
/// succeeded. Returns the story's choices, in its own order.
pub fn advance<S: Story>(
    story: &mut S,
    transcript: &mut Transcript,
    mode: AdvanceMode,
) -> StoryResult<Vec<ChoiceView>> {
    let mut lines = Vec::new();
    while story.can_continue() {
        let text = story.continue_step()?;
        let text = text.trim();
        if !text.is_empty() {
            lines.push(text.to_string());
        }
    }

    let added = lines.len();
    match mode {
        AdvanceMode::Replace => transcript.replace(lines),
        AdvanceMode::Append => transcript.extend(lines),
    }

    let choices = story.current_choices();
    tracing::debug!(?mode, added, choices = choices.len(), "Advanced story");
    Ok(choices)
}

/// Take a choice from `available` and advance in append mode.
///
/// An index that is not on offer is rejected without reaching the story.
pub fn choose<S: Story>(
    story: &mut S,
    transcript: &mut Transcript,
    available: &[ChoiceView],
    index: usize,
) -> SessionResult<Vec<ChoiceView>> {
    if !available.iter().any(|c| c.index == index) {
        return Err(SessionError::InvalidChoice(index));
    }
    story.choose(index)?;
    Ok(advance(story, transcript, AdvanceMode::Append)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tale_core::{StoryError, VarValue};

    /// A scripted stand-in that replays fixed pages of output.
    struct Pages {
        pages: Vec<(Vec<&'static str>, Vec<&'static str>)>,
        page: usize,
        line: usize,
        chosen: Vec<usize>,
    }

    impl Pages {
        fn new(pages: Vec<(Vec<&'static str>, Vec<&'static str>)>) -> Self {
            Self {
                pages,
                page: 0,
                line: 0,
                chosen: Vec::new(),
            }
        }
    }

    impl Story for Pages {
        type Script = ();

        fn from_script(_: &()) -> StoryResult<Self> {
            Ok(Self::new(Vec::new()))
        }
        fn variable(&self, _: &str) -> Option<VarValue> {
            None
        }
        fn set_variable(&mut self, name: &str, _: VarValue) -> StoryResult<()> {
            Err(StoryError::UnknownVariable(name.to_string()))
        }
        fn can_continue(&self) -> bool {
            self.pages
                .get(self.page)
                .is_some_and(|(lines, _)| self.line < lines.len())
        }
        fn continue_step(&mut self) -> StoryResult<String> {
            let text = self.pages[self.page].0[self.line];
            self.line += 1;
            Ok(text.to_string())
        }
        fn current_choices(&self) -> Vec<ChoiceView> {
            if self.can_continue() {
                return Vec::new();
            }
            self.pages
                .get(self.page)
                .map(|(_, choices)| {
                    choices
                        .iter()
                        .enumerate()
                        .map(|(i, t)| ChoiceView::new(i, *t))
                        .collect()
                })
                .unwrap_or_default()
        }
        fn choose(&mut self, index: usize) -> StoryResult<()> {
            self.chosen.push(index);
            self.page += 1;
            self.line = 0;
            Ok(())
        }
        fn save_state(&self) -> StoryResult<String> {
            Ok(format!("{}:{}", self.page, self.line))
        }
        fn load_state(&mut self, _: &str) -> StoryResult<()> {
            Err(StoryError::MalformedState("unsupported".to_string()))
        }
    }

    fn two_pages() -> Pages {
        Pages::new(vec![
            (vec!["  Hello.  ", "", "   ", "World."], vec!["Left", "Right"]),
            (vec!["You went somewhere."], vec![]),
        ])
    }

    #[test]
    fn drops_blank_lines_and_trims() {
        let mut story = two_pages();
        let mut transcript = Transcript::new();
        let choices = advance(&mut story, &mut transcript, AdvanceMode::Replace).unwrap();

        assert_eq!(transcript.lines(), ["Hello.", "World."]);
        assert_eq!(
            choices,
            vec![ChoiceView::new(0, "Left"), ChoiceView::new(1, "Right")]
        );
    }

    #[test]
    fn replace_discards_previous_text() {
        let mut story = two_pages();
        let mut transcript = Transcript::new();
        transcript.extend(vec!["stale".to_string()]);
        advance(&mut story, &mut transcript, AdvanceMode::Replace).unwrap();
        assert_eq!(transcript.len(), 2);
    }

    #[test]
    fn choose_appends() {
        let mut story = two_pages();
        let mut transcript = Transcript::new();
        let choices = advance(&mut story, &mut transcript, AdvanceMode::Replace).unwrap();

        let next = choose(&mut story, &mut transcript, &choices, 1).unwrap();
        assert_eq!(
            transcript.lines(),
            ["Hello.", "World.", "You went somewhere."]
        );
        assert!(next.is_empty());
        assert_eq!(story.chosen, vec![1]);
    }

    #[test]
    fn stale_index_never_reaches_story() {
        let mut story = two_pages();
        let mut transcript = Transcript::new();
        let choices = advance(&mut story, &mut transcript, AdvanceMode::Replace).unwrap();

        let err = choose(&mut story, &mut transcript, &choices, 5).unwrap_err();
        assert!(matches!(err, SessionError::InvalidChoice(5)));
        assert!(story.chosen.is_empty());
        assert_eq!(transcript.len(), 2);
    }
}
