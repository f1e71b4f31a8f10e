use checkin_model::Question;

/// Fixed ordered sequence of check-in questions with a rotation cursor.
///
/// The cursor is process-local and volatile: it resets to 0 on restart.
/// Only the broadcaster mutates it, so the catalog needs no internal
/// synchronization.
#[derive(Debug, Clone)]
pub struct QuestionCatalog {
    questions: Vec<String>,
    cursor: usize,
}

impl QuestionCatalog {
    /// Builds a catalog from at least one question. Callers validate their
    /// input (the server rejects an empty question list at startup).
    pub fn new(questions: Vec<String>) -> Self {
        assert!(
            !questions.is_empty(),
            "question catalog requires at least one question"
        );
        Self {
            questions,
            cursor: 0,
        }
    }

    /// The question the next broadcast will send.
    pub fn current(&self) -> Question {
        Question {
            text: self.questions[self.cursor].clone(),
            position: self.cursor,
        }
    }

    /// Moves the cursor to the next question, wrapping at the end.
    ///
    /// Not idempotent: calling twice advances twice. Tick discipline is
    /// the broadcaster's responsibility.
    pub fn advance(&mut self) {
        self.cursor = (self.cursor + 1) % self.questions.len();
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_wraps_modulo_length() {
        let mut catalog =
            QuestionCatalog::new(vec!["a".into(), "b".into(), "c".into()]);
        let mut seen = Vec::new();
        for _ in 0..7 {
            seen.push(catalog.current().text);
            catalog.advance();
        }
        assert_eq!(seen, ["a", "b", "c", "a", "b", "c", "a"]);
    }

    #[test]
    fn current_reports_position() {
        let mut catalog = QuestionCatalog::new(vec!["a".into(), "b".into()]);
        assert_eq!(catalog.current().position, 0);
        catalog.advance();
        assert_eq!(catalog.current().position, 1);
        catalog.advance();
        assert_eq!(catalog.current().position, 0);
    }

    #[test]
    fn single_question_catalog_repeats() {
        let mut catalog = QuestionCatalog::new(vec!["only".into()]);
        catalog.advance();
        catalog.advance();
        assert_eq!(catalog.current().text, "only");
        assert_eq!(catalog.current().position, 0);
    }
}
