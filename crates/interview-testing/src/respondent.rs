//! Scripted respondent personas for `interview-cli simulate` and
//! integration tests: a deterministic stand-in for a real respondent.

/// A deterministic, persona-keyed line generator. Real responses don't
/// exist yet when a turn starts; `respond` is handed the question the
/// interviewer just asked so a persona can at least vary tone with it.
pub struct SyntheticRespondent {
    persona: Persona,
    turn: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persona {
    /// Long, detailed answers that reliably produce `deep`/`moderate`
    /// response-depth signals and fresh concepts most turns.
    Engaged,
    /// Short, non-committal answers (`surface` depth) that drive
    /// `consecutive_low_info` toward saturation quickly.
    Terse,
    /// Answers laced with uncertainty/hedging language.
    Skeptical,
}

impl Persona {
    pub fn parse(id: &str) -> Option<Self> {
        match id {
            "engaged" => Some(Persona::Engaged),
            "terse" => Some(Persona::Terse),
            "skeptical" => Some(Persona::Skeptical),
            _ => None,
        }
    }
}

const ENGAGED_LINES: &[&str] = &[
    "I really like the creamy texture because it makes me feel satisfied, \
     it reminds me of whole milk but without the heaviness afterward.",
    "The oat flavor comes through more than I expected, and honestly it \
     pairs better with coffee than the almond milk I used to buy.",
    "Sustainability matters a lot to me, knowing oats use less water than \
     almonds makes me feel good about choosing this over dairy.",
    "When I think about it more, it's really about feeling like I'm taking \
     care of my health and the planet at the same time, which matters to \
     who I want to be.",
];

const TERSE_LINES: &[&str] = &["ok", "sure", "I guess", "not really", "fine I suppose", "maybe"];

const SKEPTICAL_LINES: &[&str] = &[
    "I'm not sure, maybe the texture is fine but I think it's kind of bland.",
    "I guess it's probably okay, I'm not totally convinced it's better than regular milk.",
    "Somewhat skeptical about the sustainability claims, not sure I buy it honestly.",
];

impl SyntheticRespondent {
    pub fn new(persona: Persona) -> Self {
        Self { persona, turn: 0 }
    }

    /// Produces this persona's next line, cycling through its script if the
    /// interview runs longer than the script is deep.
    pub fn respond(&mut self, _question: &str) -> String {
        let lines = match self.persona {
            Persona::Engaged => ENGAGED_LINES,
            Persona::Terse => TERSE_LINES,
            Persona::Skeptical => SKEPTICAL_LINES,
        };
        let line = lines[self.turn as usize % lines.len()].to_string();
        self.turn += 1;
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engaged_persona_produces_non_surface_responses() {
        let mut respondent = SyntheticRespondent::new(Persona::Engaged);
        let line = respondent.respond("What do you like about oat milk?");
        assert!(line.split_whitespace().count() >= 10);
    }

    #[test]
    fn terse_persona_produces_short_responses() {
        let mut respondent = SyntheticRespondent::new(Persona::Terse);
        let line = respondent.respond("What do you like about oat milk?");
        assert!(line.split_whitespace().count() < 5);
    }

    #[test]
    fn unknown_persona_id_does_not_parse() {
        assert!(Persona::parse("nonexistent").is_none());
    }
}
