//! The interpreter: a [`Story`] implementation over a [`CompiledScript`].

use tale_core::{ChoiceView, Story, StoryError, StoryResult, VarValue};

use crate::condition::numeric;
use crate::script::{CompiledScript, Step};
use crate::state::{Cursor, PendingChoice, StoryState};

/// Upper bound on steps run by one continuation, guarding against divert
/// cycles that never emit text.
const STEP_LIMIT: usize = 10_000;

/// A running story instance.
#[derive(Debug, Clone)]
pub struct ScriptStory {
    script: CompiledScript,
    state: StoryState,
}

impl ScriptStory {
    /// Create a fresh instance at the start knot.
    pub fn new(script: CompiledScript) -> Self {
        let state = StoryState::fresh(&script);
        Self { script, state }
    }

    /// The script this instance runs.
    pub fn script(&self) -> &CompiledScript {
        &self.script
    }

    /// The current interpreter state.
    pub fn state(&self) -> &StoryState {
        &self.state
    }

    /// Whether the story has reached a terminal point.
    pub fn has_ended(&self) -> bool {
        self.state.cursor.is_none() && self.state.choices.is_empty()
    }

    fn step_at(&self, cursor: &Cursor) -> Option<Step> {
        cursor
            .steps(&self.script)
            .and_then(|steps| steps.get(cursor.step))
            .cloned()
    }

    /// Stop at the end of a step list: offer the knot's choices, or end the
    /// story when a choice branch ran out without diverting.
    fn reach_choice_point(&mut self, cursor: Cursor) {
        self.state.cursor = None;
        self.state.choices.clear();

        if cursor.branch.is_some() {
            return;
        }
        let Some(knot) = self.script.knot(&cursor.knot) else {
            return;
        };

        let vars = &self.state.variables;
        self.state.choices = knot
            .choices
            .iter()
            .enumerate()
            .filter(|(_, c)| c.when.as_ref().is_none_or(|cond| cond.evaluate(vars)))
            .map(|(source, c)| PendingChoice {
                knot: cursor.knot.clone(),
                source,
                text: self.interpolate(&c.text),
            })
            .collect();
    }

    fn interpolate(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) => {
                    let name = &after[..close];
                    match self.state.variables.get(name) {
                        Some(value) => out.push_str(&value.to_string()),
                        None => {
                            out.push('{');
                            out.push_str(name);
                            out.push('}');
                        }
                    }
                    rest = &after[close + 1..];
                }
                None => {
                    out.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}

impl Story for ScriptStory {
    type Script = CompiledScript;

    fn from_script(script: &CompiledScript) -> StoryResult<Self> {
        Ok(Self::new(script.clone()))
    }

    fn variable(&self, name: &str) -> Option<VarValue> {
        self.state.variables.get(name).cloned()
    }

    fn set_variable(&mut self, name: &str, value: VarValue) -> StoryResult<()> {
        match self.state.variables.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(StoryError::UnknownVariable(name.to_string())),
        }
    }

    fn can_continue(&self) -> bool {
        self.state.cursor.is_some()
    }

    fn continue_step(&mut self) -> StoryResult<String> {
        let mut cursor = self
            .state
            .cursor
            .clone()
            .ok_or(StoryError::CannotContinue)?;
        let mut line: Option<String> = None;

        for _ in 0..STEP_LIMIT {
            let Some(step) = self.step_at(&cursor) else {
                self.reach_choice_point(cursor);
                return Ok(line.unwrap_or_default());
            };

            let shows = match &step {
                Step::Text { when, .. } => when
                    .as_ref()
                    .is_none_or(|cond| cond.evaluate(&self.state.variables)),
                _ => false,
            };
            // Stop in front of the next visible line so it starts the next step.
            if shows && line.is_some() {
                self.state.cursor = Some(cursor);
                return Ok(line.unwrap_or_default());
            }

            cursor.step += 1;
            match step {
                Step::Text { text, .. } => {
                    if shows {
                        line = Some(self.interpolate(&text).trim().to_string());
                    }
                }
                Step::Set { var, value } => {
                    self.state.variables.insert(var, value);
                }
                Step::Add { var, amount } => {
                    let current = self.state.variables.get(&var).map(numeric).unwrap_or(0);
                    self.state
                        .variables
                        .insert(var, VarValue::Int(current.saturating_add(amount)));
                }
                Step::Divert { to } => {
                    cursor = Cursor::knot_start(to);
                }
                Step::End => {
                    self.state.cursor = None;
                    self.state.choices.clear();
                    return Ok(line.unwrap_or_default());
                }
            }
        }

        Err(StoryError::InvalidScript(format!(
            "no text within {STEP_LIMIT} steps from knot {}",
            cursor.knot
        )))
    }

    fn current_choices(&self) -> Vec<ChoiceView> {
        self.state
            .choices
            .iter()
            .enumerate()
            .map(|(index, c)| ChoiceView::new(index, c.text.clone()))
            .collect()
    }

    fn choose(&mut self, index: usize) -> StoryResult<()> {
        let available = self.state.choices.len();
        let pending = self
            .state
            .choices
            .get(index)
            .cloned()
            .ok_or(StoryError::ChoiceOutOfRange { index, available })?;

        self.state.choices.clear();
        self.state.cursor = Some(Cursor {
            knot: pending.knot,
            branch: Some(pending.source),
            step: 0,
        });
        self.state.turns += 1;
        Ok(())
    }

    fn save_state(&self) -> StoryResult<String> {
        serde_json::to_string(&self.state).map_err(|e| StoryError::MalformedState(e.to_string()))
    }

    fn load_state(&mut self, state: &str) -> StoryResult<()> {
        let mut restored: StoryState =
            serde_json::from_str(state).map_err(|e| StoryError::MalformedState(e.to_string()))?;
        restored
            .reconcile(&self.script)
            .map_err(StoryError::MalformedState)?;
        self.state = restored;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEMO_SCRIPT;
    use insta::assert_snapshot;

    fn demo() -> ScriptStory {
        ScriptStory::new(CompiledScript::from_json(DEMO_SCRIPT).unwrap())
    }

    fn seeded(str_: i64, cha: i64, wit: i64) -> ScriptStory {
        let mut story = demo();
        story.set_variable("STR", VarValue::Int(str_)).unwrap();
        story.set_variable("CHA", VarValue::Int(cha)).unwrap();
        story.set_variable("WIT", VarValue::Int(wit)).unwrap();
        story
    }

    fn drain(story: &mut ScriptStory) -> Vec<String> {
        let mut lines = Vec::new();
        while story.can_continue() {
            let line = story.continue_step().unwrap();
            if !line.is_empty() {
                lines.push(line);
            }
        }
        lines
    }

    fn texts(story: &ScriptStory) -> Vec<String> {
        story.current_choices().into_iter().map(|c| c.text).collect()
    }

    #[test]
    fn opening_lines_branch_on_seeded_strength() {
        let mut story = seeded(7, 4, 4);
        assert_snapshot!(drain(&mut story).join("\n"), @r"
        You wake on the cold floor of a cellar.
        Your arms feel strong enough to bend iron bars.
        A draft whispers from somewhere above.
        ");

        let mut weak = seeded(2, 8, 5);
        assert_eq!(drain(&mut weak).len(), 2);
    }

    #[test]
    fn one_line_per_step() {
        let mut story = seeded(7, 4, 4);
        assert_eq!(
            story.continue_step().unwrap(),
            "You wake on the cold floor of a cellar."
        );
        assert!(story.can_continue());
        assert!(story.current_choices().is_empty());
    }

    #[test]
    fn choices_follow_conditions() {
        let mut story = seeded(7, 4, 4);
        drain(&mut story);
        assert_eq!(
            texts(&story),
            vec![
                "Search the shelves",
                "Pry the rusty sword from the wall",
                "Climb toward the draft",
            ]
        );

        let mut weak = seeded(2, 8, 5);
        drain(&mut weak);
        assert_eq!(texts(&weak), vec!["Search the shelves", "Climb toward the draft"]);
    }

    #[test]
    fn choosing_runs_branch_and_diverts() {
        let mut story = seeded(7, 4, 4);
        drain(&mut story);
        story.choose(0).unwrap();
        let lines = drain(&mut story);

        assert_eq!(
            lines[0],
            "Behind the jars you find an old sack with 3 coins inside."
        );
        assert_eq!(story.variable("coins"), Some(VarValue::Int(3)));
        assert_eq!(story.variable("inv_old_sack"), Some(VarValue::Bool(true)));
        assert_eq!(texts(&story), vec!["Pick the lock", "Go back down"]);
    }

    #[test]
    fn story_ends() {
        let mut story = seeded(7, 6, 4);
        drain(&mut story);
        story.choose(1).unwrap(); // pry the sword
        drain(&mut story);
        assert!(texts(&story).contains(&"Break the door".to_string()));

        let talk = story
            .current_choices()
            .into_iter()
            .find(|c| c.text == "Talk your way past the guard")
            .unwrap();
        story.choose(talk.index).unwrap();
        let lines = drain(&mut story);

        assert_eq!(lines.last().unwrap(), "You carry 0 coins.");
        assert!(story.has_ended());
        assert!(story.current_choices().is_empty());
    }

    #[test]
    fn choose_out_of_range() {
        let mut story = seeded(5, 5, 5);
        drain(&mut story);
        let err = story.choose(9).unwrap_err();
        assert_eq!(
            err,
            StoryError::ChoiceOutOfRange {
                index: 9,
                available: 2
            }
        );
    }

    #[test]
    fn seeding_undeclared_variable_fails() {
        let mut story = demo();
        assert_eq!(
            story.set_variable("LUCK", VarValue::Int(3)),
            Err(StoryError::UnknownVariable("LUCK".to_string()))
        );
    }

    #[test]
    fn continue_after_choice_point_fails() {
        let mut story = seeded(5, 5, 5);
        drain(&mut story);
        assert_eq!(story.continue_step(), Err(StoryError::CannotContinue));
    }

    #[test]
    fn save_and_restore_matches() {
        let mut story = seeded(7, 4, 4);
        drain(&mut story);
        story.choose(0).unwrap();
        // Restore mid-content: one line consumed, more pending.
        story.continue_step().unwrap();
        let blob = story.save_state().unwrap();

        let mut restored = demo();
        restored.load_state(&blob).unwrap();
        assert_eq!(restored.state(), story.state());
        assert_eq!(drain(&mut restored), drain(&mut story));
        assert_eq!(restored.current_choices(), story.current_choices());
    }

    #[test]
    fn restore_rejects_garbage() {
        let mut story = seeded(7, 4, 4);
        drain(&mut story);
        let before = story.state().clone();

        assert!(matches!(
            story.load_state("{not json"),
            Err(StoryError::MalformedState(_))
        ));
        assert!(matches!(
            story.load_state(r#"{"version":1,"cursor":{"knot":"attic","step":0},"variables":{},"choices":[],"turns":0}"#),
            Err(StoryError::MalformedState(_))
        ));
        assert!(matches!(
            story.load_state(r#"{"version":99,"cursor":null,"variables":{},"choices":[],"turns":0}"#),
            Err(StoryError::MalformedState(_))
        ));
        assert_eq!(story.state(), &before);
    }

    #[test]
    fn restore_fills_missing_variables() {
        let mut story = demo();
        story
            .load_state(r#"{"version":1,"cursor":{"knot":"cellar","step":0},"variables":{"coins":4},"choices":[],"turns":0}"#)
            .unwrap();
        assert_eq!(story.variable("coins"), Some(VarValue::Int(4)));
        assert_eq!(story.variable("inv_old_sack"), Some(VarValue::Bool(false)));
    }

    #[test]
    fn interpolation_leaves_unknown_names() {
        let story = demo();
        assert_eq!(
            story.interpolate("{coins} coins, {nobody} here, {open"),
            "0 coins, {nobody} here, {open"
        );
    }

    #[test]
    fn divert_cycle_is_reported() {
        let json = r#"{
            "start": "a",
            "knots": {
                "a": { "content": [ { "op": "divert", "to": "b" } ] },
                "b": { "content": [ { "op": "divert", "to": "a" } ] }
            }
        }"#;
        let mut story = ScriptStory::new(CompiledScript::from_json(json).unwrap());
        assert!(matches!(
            story.continue_step(),
            Err(StoryError::InvalidScript(_))
        ));
    }
}
