//! Prompt composition.
//!
//! Pure, deterministic functions: no I/O, no side effects. The thumbnail
//! prompt always carries the no-text rule and a style-specific direction;
//! both prompts always embed the literal user prompt and analysis text so a
//! generation can be traced back to its inputs.

use tcraft_models::ThumbnailStyle;

/// Hard instruction forbidding rendered text in generated thumbnails.
/// Embedded verbatim in every thumbnail prompt.
pub const NO_TEXT_RULE: &str = "DO NOT include any text, logos, watermarks, \
or letters on the image. The image must be clean and purely visual.";

/// Style-specific visual direction, keyed by style tag.
fn style_direction(style: ThumbnailStyle) -> &'static str {
    match style {
        ThumbnailStyle::Minimalist => {
            "Clean, simple, flat design with a limited color palette. \
             Use negative space effectively. Focus on a single, iconic subject."
        }
        ThumbnailStyle::Cartoonish => {
            "Vibrant colors, bold outlines, exaggerated features. \
             Fun, engaging, and friendly, like an animated movie still."
        }
        ThumbnailStyle::Retro => {
            "80s or 90s aesthetic. Use neon glows, synthwave color palettes \
             (pinks, purples, blues), and subtle film grain or VHS effects."
        }
        ThumbnailStyle::Cinematic => {
            "Photorealistic, cinematic, high-contrast lighting, dramatic. \
             Use the rule of thirds. Masterpiece, 4K, high detail."
        }
    }
}

/// Build the image-generation prompt for one thumbnail set.
pub fn compose_thumbnail_prompt(
    style: ThumbnailStyle,
    user_prompt: &str,
    analysis: &str,
) -> String {
    format!(
        "Create a set of visually stunning YouTube thumbnails.\n\
         **Style:** {direction}\n\
         **Core Subject:** A video about \"{user_prompt}\".\n\
         **Visual Analysis:** The video content is about: \"{analysis}\".\n\
         **Strict Rule:** {NO_TEXT_RULE}",
        direction = style_direction(style),
    )
}

/// Build the text-generation prompt for titles/description/hashtags/CTR.
pub fn compose_text_prompt(style: ThumbnailStyle, user_prompt: &str, analysis: &str) -> String {
    format!(
        "Style: {style}\n\
         Video topic: {user_prompt}\n\n\
         Key moments/visuals from video: {analysis}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_text_rule_present_for_all_styles() {
        for &style in ThumbnailStyle::ALL {
            let prompt = compose_thumbnail_prompt(style, "topic", "analysis");
            assert!(
                prompt.contains(NO_TEXT_RULE),
                "style {style} lost the no-text rule"
            );
        }
    }

    #[test]
    fn test_prompts_embed_user_prompt_and_analysis() {
        for &style in ThumbnailStyle::ALL {
            let thumb = compose_thumbnail_prompt(style, "my topic", "the analysis");
            assert!(thumb.contains("my topic"));
            assert!(thumb.contains("the analysis"));

            let text = compose_text_prompt(style, "my topic", "the analysis");
            assert!(text.contains("my topic"));
            assert!(text.contains("the analysis"));
        }
    }

    #[test]
    fn test_styles_produce_distinct_directions() {
        let prompts: Vec<String> = ThumbnailStyle::ALL
            .iter()
            .map(|&s| compose_thumbnail_prompt(s, "t", "a"))
            .collect();
        for (i, a) in prompts.iter().enumerate() {
            for b in prompts.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_retro_cooking_tutorial_keywords() {
        let prompt =
            compose_thumbnail_prompt(ThumbnailStyle::Retro, "cooking tutorial", "a kitchen scene");
        assert!(prompt.contains("cooking tutorial"));
        assert!(prompt.contains("neon"));
        assert!(prompt.contains("VHS"));
    }

    #[test]
    fn test_unrecognized_style_falls_back_to_cinematic() {
        let style = ThumbnailStyle::parse_lossy("definitely-not-a-style");
        let prompt = compose_thumbnail_prompt(style, "t", "a");
        assert!(prompt.contains("Photorealistic"));
    }

    #[test]
    fn test_composition_is_deterministic() {
        let a = compose_thumbnail_prompt(ThumbnailStyle::Minimalist, "t", "a");
        let b = compose_thumbnail_prompt(ThumbnailStyle::Minimalist, "t", "a");
        assert_eq!(a, b);
    }
}
