use crate::model::Scene;
use crossterm::event::KeyCode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    Quit,
    /// Title -> Instructions, fired by any key.
    Advance,
    Start,
    Jump,
    Restart,
}

/// Discrete key press -> scene-dependent action. The flow is strictly
/// linear; nothing maps back to Title.
pub(crate) fn map_key(scene: Scene, code: KeyCode) -> Option<Action> {
    // q / Esc always quits; a toy must hand the terminal back
    if matches!(code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc) {
        return Some(Action::Quit);
    }
    match scene {
        Scene::Title => Some(Action::Advance),
        Scene::Instructions => matches!(code, KeyCode::Char(' ')).then_some(Action::Start),
        Scene::Playing => matches!(code, KeyCode::Char(' ')).then_some(Action::Jump),
        Scene::Over { .. } => matches!(code, KeyCode::Char(' ')).then_some(Action::Restart),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_key_leaves_title() {
        assert_eq!(map_key(Scene::Title, KeyCode::Char('z')), Some(Action::Advance));
        assert_eq!(map_key(Scene::Title, KeyCode::Enter), Some(Action::Advance));
    }

    #[test]
    fn only_space_advances_past_instructions() {
        assert_eq!(map_key(Scene::Instructions, KeyCode::Char('z')), None);
        assert_eq!(
            map_key(Scene::Instructions, KeyCode::Char(' ')),
            Some(Action::Start)
        );
    }

    #[test]
    fn space_while_playing_is_a_jump_not_a_transition() {
        assert_eq!(
            map_key(Scene::Playing, KeyCode::Char(' ')),
            Some(Action::Jump)
        );
        assert_eq!(map_key(Scene::Playing, KeyCode::Char('x')), None);
    }

    #[test]
    fn space_restarts_from_over() {
        let over = Scene::Over { elapsed: 4.2 };
        assert_eq!(map_key(over, KeyCode::Char(' ')), Some(Action::Restart));
        assert_eq!(map_key(over, KeyCode::Char('x')), None);
    }

    #[test]
    fn quit_works_everywhere() {
        for scene in [
            Scene::Title,
            Scene::Instructions,
            Scene::Playing,
            Scene::Over { elapsed: 0.0 },
        ] {
            assert_eq!(map_key(scene, KeyCode::Char('q')), Some(Action::Quit));
            assert_eq!(map_key(scene, KeyCode::Esc), Some(Action::Quit));
        }
    }
}
