//! Category colors for donation markers.

use foundation::color::Rgb;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Education,
    Health,
    Environment,
    Water,
    Disaster,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Education,
        Category::Health,
        Category::Environment,
        Category::Water,
        Category::Disaster,
        Category::Other,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Education => "education",
            Category::Health => "health",
            Category::Environment => "environment",
            Category::Water => "water",
            Category::Disaster => "disaster",
            Category::Other => "other",
        }
    }

    pub fn color(self) -> Rgb {
        match self {
            Category::Education => Rgb::from_hex(0x4285f4),
            Category::Health => Rgb::from_hex(0xea4335),
            Category::Environment => Rgb::from_hex(0x34a853),
            Category::Water => Rgb::from_hex(0x00bcd4),
            Category::Disaster => Rgb::from_hex(0xff9800),
            Category::Other => Rgb::from_hex(0xfbbc05),
        }
    }

    /// Resolves free-form category text. The first word naming a known category wins,
    /// case-insensitively; anything else is `Other`.
    pub fn classify(text: &str) -> Category {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .find_map(|word| {
                Category::ALL
                    .iter()
                    .copied()
                    .find(|c| *c != Category::Other && word.eq_ignore_ascii_case(c.name()))
            })
            .unwrap_or(Category::Other)
    }
}

pub fn category_color(text: &str) -> Rgb {
    Category::classify(text).color()
}

#[cfg(test)]
mod tests {
    use super::{Category, category_color};
    use foundation::color::Rgb;

    #[test]
    fn exact_names_resolve() {
        assert_eq!(Category::classify("education"), Category::Education);
        assert_eq!(category_color("health"), Rgb::from_hex(0xea4335));
    }

    #[test]
    fn matching_ignores_case_and_surrounding_words() {
        assert_eq!(Category::classify("Clean Water LA"), Category::Water);
        assert_eq!(Category::classify("DISASTER-relief"), Category::Disaster);
        assert_eq!(Category::classify("Global Health"), Category::Health);
    }

    #[test]
    fn unknown_category_uses_fallback() {
        assert_eq!(category_color("arts"), Rgb::from_hex(0xfbbc05));
        assert_eq!(category_color(""), Category::Other.color());
        assert_eq!(Category::classify("watery"), Category::Other);
    }

    #[test]
    fn exact_lowercased_keys_keep_their_color() {
        for category in Category::ALL {
            let upper = category.name().to_ascii_uppercase();
            assert_eq!(Category::classify(category.name()), category);
            assert_eq!(category_color(&upper), category.color());
        }
        assert_eq!(category_color("unknown"), Category::Other.color());
        assert_eq!(category_color(""), Category::Other.color());
    }
}
