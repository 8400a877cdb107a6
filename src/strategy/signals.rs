use crate::models::{Action, Position};

/// Map a recommended holding state against the caller's current position.
///
/// | recommended | current | action |
/// |-------------|---------|--------|
/// | In          | Out     | Buy    |
/// | Out         | In      | Sell   |
/// | In          | In      | Wait   |
/// | Out         | Out     | Wait   |
pub fn decide_action(recommended: Position, current: Position) -> Action {
    match (recommended, current) {
        (Position::In, Position::Out) => Action::Buy,
        (Position::Out, Position::In) => Action::Sell,
        _ => Action::Wait,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_table_is_exhaustive() {
        let cases = [
            (Position::In, Position::Out, Action::Buy),
            (Position::Out, Position::In, Action::Sell),
            (Position::In, Position::In, Action::Wait),
            (Position::Out, Position::Out, Action::Wait),
        ];

        for (recommended, current, expected) in cases {
            assert_eq!(
                decide_action(recommended, current),
                expected,
                "({:?}, {:?})",
                recommended,
                current
            );
        }
    }
}
