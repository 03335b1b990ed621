pub const LOOKUP_SYSTEM: &str = include_str!("../data/prompts/lookup_system.txt");
pub const LOOKUP_USER: &str = include_str!("../data/prompts/lookup_user.txt");
pub const MEME_SYSTEM: &str = include_str!("../data/prompts/meme_system.txt");
pub const MEME_TOPIC: &str = include_str!("../data/prompts/meme_topic.txt");
pub const MEME_RANDOM: &str = include_str!("../data/prompts/meme_random.txt");
pub const COMIC_SYSTEM: &str = include_str!("../data/prompts/comic_system.txt");
pub const COMIC_USER: &str = include_str!("../data/prompts/comic_user.txt");
pub const VISUAL_STYLE: &str = include_str!("../data/prompts/visual_style.txt");

/// Style suffix the meme screen appends to the concept's visual prompt.
pub const MEME_STYLE_SUFFIX: &str = ", funny, meme style, cartoon, expressive";
/// Style suffix the comic screen appends to each panel's visual prompt.
pub const COMIC_STYLE_SUFFIX: &str = ", comic book style, outlines, pastel colors, morandi palette";

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_single_var() {
        assert_eq!(
            render("Hello {{name}}!", &[("name", "world")]),
            "Hello world!"
        );
    }

    #[test]
    fn test_render_repeated_var() {
        assert_eq!(
            render("{{n}} panels, 1 to {{n}}", &[("n", "4")]),
            "4 panels, 1 to 4"
        );
    }

    #[test]
    fn test_prompts_are_non_empty() {
        for prompt in [
            LOOKUP_SYSTEM,
            LOOKUP_USER,
            MEME_SYSTEM,
            MEME_TOPIC,
            MEME_RANDOM,
            COMIC_SYSTEM,
            COMIC_USER,
            VISUAL_STYLE,
        ] {
            assert!(!prompt.trim().is_empty());
        }
    }

    #[test]
    fn test_templates_have_placeholders() {
        assert!(MEME_TOPIC.contains("{{topic}}"));
        assert!(COMIC_USER.contains("{{theme}}"));
        assert!(COMIC_USER.contains("{{panels}}"));
        assert!(VISUAL_STYLE.starts_with("{{prompt}}"));
    }

    #[test]
    fn test_lookup_system_requires_first_person() {
        assert!(LOOKUP_SYSTEM.contains("first person"));
    }
}
