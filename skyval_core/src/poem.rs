use crate::catalog::{resolve_ids, Flower};

const DEFAULT_CLOSING: &str = "I hold you gently, staying close.";
const PLACEHOLDER: &str = "A gentle message will bloom here…";

// First match wins.
const CLOSINGS: [(Flower, &str); 4] = [
    (Flower::Babysbreath, "I want this softness to stay, almost forever."),
    (Flower::Lavender, "Everything feels calm and safe with you."),
    (Flower::Sunflower, "You stay warm beside me, like quiet sunlight."),
    (Flower::Tulip, "I keep choosing you, softly and surely."),
];

/// Poem for the selected ids; unknown ids are ignored. Empty selection gives "".
pub fn poem_for_ids<S: AsRef<str>>(ids: &[S]) -> String {
    poem(&resolve_ids(ids))
}

/// Text for the poem panel, with a placeholder while nothing is picked.
pub fn poem_or_placeholder(flowers: &[Flower]) -> String {
    let text = poem(flowers);
    if text.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        text
    }
}

pub fn poem(flowers: &[Flower]) -> String {
    match flowers.len() {
        0 => String::new(),
        1 | 2 => flowers
            .iter()
            .enumerate()
            .map(|(idx, f)| f.poetic_lines()[idx % 2])
            .collect::<Vec<_>>()
            .join("\n"),
        n => {
            let target = (n - 1).clamp(2, 4);
            let mut body: Vec<&str> = flowers
                .iter()
                .enumerate()
                .flat_map(|(idx, f)| {
                    let [first, second] = f.poetic_lines();
                    std::iter::once(first).chain((idx % 2 == 0).then_some(second))
                })
                .take(target)
                .collect();
            while body.len() < target {
                body.push(flowers[body.len() % n].poetic_lines()[1]);
            }
            format!("{}\n\n{}", body.join("\n"), closing_line(flowers))
        }
    }
}

pub fn closing_line(flowers: &[Flower]) -> &'static str {
    CLOSINGS
        .iter()
        .find(|(f, _)| flowers.contains(f))
        .map(|(_, line)| *line)
        .unwrap_or(DEFAULT_CLOSING)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_unknown() {
        assert_eq!(poem_for_ids::<&str>(&[]), "");
        assert_eq!(poem_for_ids(&["orchid"]), "");
        assert_eq!(poem_or_placeholder(&[]), PLACEHOLDER);
    }

    #[test]
    fn short_selection_alternates_lines() {
        assert_eq!(poem_for_ids(&["rose"]), "I look at you and soften.");
        assert_eq!(
            poem_for_ids(&["rose", "tulip"]),
            "I look at you and soften.\nAgain and again."
        );
    }

    #[test]
    fn three_flowers_get_body_and_closing() {
        let text = poem_for_ids(&["rose", "lily", "tulip"]);
        assert_eq!(
            text,
            "I look at you and soften.\nYou make love feel safe.\n\nI keep choosing you, softly and surely."
        );
    }

    #[test]
    fn body_caps_at_four_lines() {
        let text = poem_for_ids(&["daisy", "peony", "camellia", "sakura", "lily", "rose"]);
        let (body, closing) = text.split_once("\n\n").unwrap();
        assert_eq!(body.lines().count(), 4);
        assert_eq!(closing, DEFAULT_CLOSING);
    }

    #[test]
    fn closing_priority() {
        assert_eq!(
            closing_line(&[Flower::Tulip, Flower::Lavender, Flower::Babysbreath]),
            "I want this softness to stay, almost forever."
        );
        assert_eq!(
            closing_line(&[Flower::Tulip, Flower::Sunflower]),
            "You stay warm beside me, like quiet sunlight."
        );
    }
}
